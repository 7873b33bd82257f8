//! Diagnostic events emitted by the [`Engine`](crate::Engine).
//!
//! Every event is written to the `log` facade at debug level. Callers that
//! want the trace as data inject an [`Observer`]; [`EventLog`] records events
//! in the order they happened.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Unauthenticated request sent to obtain a challenge.
    Probe,
    /// A 401 carrying a Digest challenge arrived.
    Challenge,
    /// A fresh nonce session was created.
    Establish,
    /// An existing nonce session was reused with the next nonce count.
    Advance,
    /// The server flagged the nonce stale; the session is being rebuilt.
    Stale,
    /// A request carrying an Authorization header was sent.
    Authorize,
    /// A response is handed back to the caller unchanged.
    Complete,
    /// The handshake failed; the error is returned to the caller.
    Failed,
}

impl Stage {
    fn to_str(self) -> &'static str {
        match self {
            Stage::Probe => "probe",
            Stage::Challenge => "challenge",
            Stage::Establish => "establish",
            Stage::Advance => "advance",
            Stage::Stale => "stale",
            Stage::Authorize => "authorize",
            Stage::Complete => "complete",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    pub stage: Stage,
    pub detail: String,
}

impl fmt::Display for AuthEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.detail)
    }
}

pub trait Observer: Send + Sync {
    fn on_event(&self, event: &AuthEvent);
}

/// Observer that keeps every event.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<AuthEvent>>,
}

impl EventLog {
    pub fn new() -> Arc<Self> {
        Arc::new(EventLog::default())
    }

    pub fn events(&self) -> Vec<AuthEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.events().into_iter().map(|e| e.stage).collect()
    }
}

impl Observer for EventLog {
    fn on_event(&self, event: &AuthEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}

/// Log `stage`/`detail` and forward it to `observer`, if any.
pub(crate) fn emit(observer: Option<&Arc<dyn Observer>>, stage: Stage, detail: String) {
    let event = AuthEvent { stage, detail };
    log::debug!("digest {}", event);
    if let Some(observer) = observer {
        observer.on_event(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_keeps_order() {
        let log = EventLog::new();
        let observer: Arc<dyn Observer> = log.clone();
        emit(Some(&observer), Stage::Probe, "GET /".to_owned());
        emit(Some(&observer), Stage::Complete, "200 OK".to_owned());
        emit(None, Stage::Failed, "dropped".to_owned());

        assert_eq!(log.stages(), vec![Stage::Probe, Stage::Complete]);
        assert_eq!(log.events()[0].to_string(), "probe: GET /");
    }
}
