//! Port traits — the boundary between protocol logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ SyncEngine (domain)
//! ```
//!
//! Driven adapters (the MQTT session, event sinks) implement these traits.
//! The [`SyncEngine`](super::service::SyncEngine) consumes them via
//! generics, so the protocol core never touches wire details directly.

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → broker session)
// ───────────────────────────────────────────────────────────────

/// Publish/subscribe transport as the engine sees it.
///
/// Both `publish` and `subscribe` return `false` on failure; the engine
/// treats every send as fire-and-forget and never retries beyond the
/// registration resend timer. Inbound delivery is host-driven: the
/// transport pump calls
/// [`SyncEngine::handle_message`](super::service::SyncEngine::handle_message)
/// synchronously for each message.
pub trait TransportPort {
    /// Whether the broker session is currently up.
    fn connected(&self) -> bool;

    /// Publish `payload` to `topic`. Best effort.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> bool;

    /// Subscribe to `topic`. Best effort.
    fn subscribe(&mut self, topic: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → host application)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (serial link to the
/// executor, process logger, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
