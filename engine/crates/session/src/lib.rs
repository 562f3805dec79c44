use std::fmt;
use std::sync::OnceLock;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of one connection.
///
/// `Connected -> Authenticating -> Playing -> Disconnecting -> Closed`.
/// Any live state may jump straight to `Disconnecting` (peer close, read
/// error, or an explicit request).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Authenticating,
    Playing,
    Disconnecting,
    Closed,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Connected, Authenticating)
                | (Authenticating, Authenticating)
                | (Authenticating, Playing)
                | (Connected | Authenticating | Playing, Disconnecting)
                | (Disconnecting, Closed)
        )
    }

    pub fn is_live(self) -> bool {
        matches!(
            self,
            SessionState::Connected | SessionState::Authenticating | SessionState::Playing
        )
    }
}

/// Tracks a session's state, refusing illegal transitions.
#[derive(Debug)]
pub struct SessionLifecycle {
    id: SessionId,
    state: SessionState,
}

impl SessionLifecycle {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: SessionState::Connected,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Move to `next` if legal. Returns whether the state changed.
    pub fn advance(&mut self, next: SessionState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::debug!(session_id = %self.id, from = ?self.state, to = ?next, "ignored state transition");
            return false;
        }
        self.state = next;
        true
    }
}

/// One-shot, race-safe "disconnect requested" flag shared between the read
/// path and the command path of a session.
///
/// The first caller of [`DisconnectSignal::request`] wins and records the
/// reason; every later call is a no-op returning `false`.
#[derive(Debug)]
pub struct DisconnectSignal {
    reason: OnceLock<String>,
    notify: watch::Sender<bool>,
}

impl DisconnectSignal {
    pub fn new() -> Self {
        let (notify, _) = watch::channel(false);
        Self {
            reason: OnceLock::new(),
            notify,
        }
    }

    /// Request disconnect. Returns `true` only for the caller that flipped the flag.
    pub fn request(&self, reason: &str) -> bool {
        if self.reason.set(reason.to_string()).is_err() {
            return false;
        }
        self.notify.send_replace(true);
        true
    }

    pub fn is_requested(&self) -> bool {
        self.reason.get().is_some()
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.get().map(String::as_str)
    }

    /// Resolve once a disconnect has been requested (immediately if it already was).
    pub async fn wait(&self) {
        let mut rx = self.notify.subscribe();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for DisconnectSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn lifecycle_happy_path() {
        let mut lc = SessionLifecycle::new(SessionId(1));
        assert_eq!(lc.state(), SessionState::Connected);
        assert!(lc.advance(SessionState::Authenticating));
        assert!(lc.advance(SessionState::Playing));
        assert!(lc.advance(SessionState::Disconnecting));
        assert!(lc.advance(SessionState::Closed));
        assert!(!lc.state().is_live());
    }

    #[test]
    fn lifecycle_rejects_illegal_transition() {
        let mut lc = SessionLifecycle::new(SessionId(2));
        assert!(!lc.advance(SessionState::Playing));
        assert_eq!(lc.state(), SessionState::Connected);

        lc.advance(SessionState::Disconnecting);
        assert!(!lc.advance(SessionState::Playing));
        assert_eq!(lc.state(), SessionState::Disconnecting);
    }

    #[test]
    fn authenticating_can_repeat() {
        let mut lc = SessionLifecycle::new(SessionId(3));
        lc.advance(SessionState::Authenticating);
        assert!(lc.advance(SessionState::Authenticating));
    }

    #[test]
    fn disconnect_request_is_one_shot() {
        let signal = DisconnectSignal::new();
        assert!(!signal.is_requested());
        assert!(signal.request("quit"));
        assert!(!signal.request("read error"));
        assert!(signal.is_requested());
        assert_eq!(signal.reason(), Some("quit"));
    }

    #[test]
    fn concurrent_requests_have_single_winner() {
        let signal = Arc::new(DisconnectSignal::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let signal = signal.clone();
                std::thread::spawn(move || signal.request(&format!("caller {}", i)))
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn wait_resolves_after_request() {
        let signal = Arc::new(DisconnectSignal::new());
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        signal.request("closed");
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn wait_returns_immediately_when_already_requested() {
        let signal = DisconnectSignal::new();
        signal.request("closed");
        tokio::time::timeout(std::time::Duration::from_millis(100), signal.wait())
            .await
            .unwrap();
    }
}
