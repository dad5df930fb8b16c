/// An audio session surfaced by an endpoint.
///
/// The registry forwards sessions to its delegate without interpreting
/// them; the payload is opaque beyond its id.
pub trait AudioSession: Send + Sync {
    fn id(&self) -> &str;
}
