use std::sync::{Arc, Mutex, PoisonError};

/// Shared session context. Holds the bearer token for the backend and
/// is handed explicitly to whoever needs it; a 401 clears it, which is
/// the forced-logout signal for the embedding program.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Arc<Mutex<Option<String>>>,
}

impl Session {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    pub fn clear(&self) {
        self.lock().take();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_signs_the_session_out_everywhere() {
        let session = Session::with_token("abc");
        let shared = session.clone();

        assert_eq!(session.token().as_deref(), Some("abc"));
        assert!(shared.is_authenticated());

        shared.clear();

        assert_eq!(session.token(), None);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn default_session_is_unauthenticated() {
        assert!(!Session::default().is_authenticated());
    }
}
