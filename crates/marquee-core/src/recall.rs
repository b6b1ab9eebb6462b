//! "Remember me" sign-in.
//!
//! When the user opts in at sign-in, the email and the session's refresh
//! token are stored under [`REMEMBER_KEY`]. On the next load the flow
//! resumes that session silently. The password is never persisted.
//!
//! Storage failures never surface to the user: the flow logs them and
//! behaves as if nothing was remembered.

use std::fmt;

use marquee_types::Session;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ServiceResult;
use crate::services::Authenticator;
use crate::store::KeyValueStore;

/// Storage key of the remembered login.
pub const REMEMBER_KEY: &str = "remember_login";

/// The persisted record. Its presence is the "remember me" flag.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberedLogin {
    pub email: String,
    pub refresh_token: String,
}

impl RememberedLogin {
    fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.refresh_token.is_empty()
    }
}

impl fmt::Debug for RememberedLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RememberedLogin")
            .field("email", &self.email)
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Progress of one silent sign-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecallState {
    Idle,
    CheckingStoredCredential,
    AutoSigningIn,
    Authenticated,
    AutoSignInFailed,
    NoStoredCredential,
}

/// Terminal result of [`CredentialRecall::recall`].
#[derive(Debug, Clone)]
pub enum RecallOutcome {
    Authenticated(Session),
    NoStoredCredential,
    /// The stored login was rejected and has been forgotten. The UI treats
    /// this exactly like `NoStoredCredential`.
    AutoSignInFailed,
}

impl RecallOutcome {
    pub fn into_session(self) -> Option<Session> {
        match self {
            RecallOutcome::Authenticated(session) => Some(session),
            RecallOutcome::NoStoredCredential | RecallOutcome::AutoSignInFailed => None,
        }
    }

    pub fn state(&self) -> RecallState {
        match self {
            RecallOutcome::Authenticated(_) => RecallState::Authenticated,
            RecallOutcome::NoStoredCredential => RecallState::NoStoredCredential,
            RecallOutcome::AutoSignInFailed => RecallState::AutoSignInFailed,
        }
    }
}

/// Sign-in front end that owns the remembered-login record.
#[derive(Debug)]
pub struct CredentialRecall<A, S> {
    auth: A,
    store: S,
}

impl<A: Authenticator, S: KeyValueStore> CredentialRecall<A, S> {
    pub fn new(auth: A, store: S) -> Self {
        Self { auth, store }
    }

    pub fn auth(&self) -> &A {
        &self.auth
    }

    /// Reads the remembered login. Malformed records are deleted and read
    /// as absent.
    pub fn load(&self) -> Option<RememberedLogin> {
        let raw = match self.store.get(REMEMBER_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("remembered login unavailable: {err:#}");
                return None;
            }
        };

        match serde_json::from_str::<RememberedLogin>(&raw) {
            Ok(login) if login.is_complete() => Some(login),
            _ => {
                debug!("discarding malformed remembered login");
                self.forget();
                None
            }
        }
    }

    /// Attempts the silent sign-in.
    pub async fn recall(&self) -> RecallOutcome {
        self.recall_observed(|_| {}).await
    }

    /// Like [`recall`](Self::recall), reporting each state as it is entered.
    pub async fn recall_observed(&self, mut observe: impl FnMut(RecallState) + Send) -> RecallOutcome {
        observe(RecallState::CheckingStoredCredential);
        let Some(login) = self.load() else {
            observe(RecallState::NoStoredCredential);
            return RecallOutcome::NoStoredCredential;
        };

        observe(RecallState::AutoSigningIn);
        debug!(email = %login.email, "resuming remembered login");
        let outcome = match self.auth.resume(&login.refresh_token).await {
            Ok(session) => {
                // Refresh tokens rotate on use.
                self.remember(&login.email, &session);
                info!("remembered login resumed");
                RecallOutcome::Authenticated(session)
            }
            Err(err) => {
                debug!("remembered login rejected: {err}");
                self.forget();
                RecallOutcome::AutoSignInFailed
            }
        };
        observe(outcome.state());
        outcome
    }

    /// Manual sign-in. The record is written only after success and only
    /// with `remember`; any failure, or success without `remember`, leaves
    /// no record behind.
    ///
    /// # Errors
    /// Returns the auth service's error unchanged.
    pub async fn sign_in(&self, email: &str, password: &str, remember: bool) -> ServiceResult<Session> {
        match self.auth.sign_in(email, password).await {
            Ok(session) => {
                if remember {
                    self.remember(email, &session);
                } else {
                    self.forget();
                }
                Ok(session)
            }
            Err(err) => {
                self.forget();
                Err(err)
            }
        }
    }

    /// Forgets the remembered login, then ends the server session if there
    /// is one.
    ///
    /// # Errors
    /// Returns the auth service's error; the local record is gone either
    /// way.
    pub async fn sign_out(&self, session: Option<&Session>) -> ServiceResult<()> {
        self.forget();
        match session {
            Some(session) => self.auth.sign_out(&session.access_token).await,
            None => Ok(()),
        }
    }

    /// Deletes the remembered login.
    pub fn forget(&self) {
        if let Err(err) = self.store.remove(REMEMBER_KEY) {
            warn!("failed to clear remembered login: {err:#}");
        }
    }

    fn remember(&self, email: &str, session: &Session) {
        let login = RememberedLogin {
            email: email.to_string(),
            refresh_token: session.refresh_token.clone(),
        };
        let result = serde_json::to_string(&login)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(REMEMBER_KEY, &json));
        if let Err(err) = result {
            warn!("failed to store remembered login: {err:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use marquee_types::{User, UserMetadata};

    use super::*;
    use crate::error::{ServiceError, ServiceErrorKind};
    use crate::store::{FileStore, MemoryStore};

    struct StubAuth {
        password: Option<&'static str>,
        accept_refresh: bool,
        resumes: AtomicUsize,
    }

    impl StubAuth {
        fn accepting() -> Self {
            Self {
                password: Some("secret1"),
                accept_refresh: true,
                resumes: AtomicUsize::new(0),
            }
        }

        fn rejecting() -> Self {
            Self {
                password: None,
                accept_refresh: false,
                resumes: AtomicUsize::new(0),
            }
        }
    }

    fn session(email: &str, refresh: &str) -> Session {
        Session {
            access_token: "at".to_string(),
            refresh_token: refresh.to_string(),
            expires_at: None,
            user: User {
                id: "u-1".to_string(),
                email: Some(email.to_string()),
                user_metadata: UserMetadata::default(),
            },
        }
    }

    fn rejected() -> ServiceError {
        ServiceError::new(ServiceErrorKind::Auth, "Invalid login credentials")
    }

    impl Authenticator for StubAuth {
        async fn sign_in(&self, email: &str, password: &str) -> ServiceResult<Session> {
            if self.password == Some(password) {
                Ok(session(email, "rt-signin"))
            } else {
                Err(rejected())
            }
        }

        async fn resume(&self, _refresh_token: &str) -> ServiceResult<Session> {
            self.resumes.fetch_add(1, Ordering::SeqCst);
            if self.accept_refresh {
                Ok(session("a@b.com", "rt-rotated"))
            } else {
                Err(rejected())
            }
        }

        async fn sign_out(&self, _access_token: &str) -> ServiceResult<()> {
            Ok(())
        }
    }

    fn stored(email: &str, token: &str) -> Arc<MemoryStore> {
        let json = serde_json::to_string(&RememberedLogin {
            email: email.to_string(),
            refresh_token: token.to_string(),
        })
        .unwrap();
        Arc::new(MemoryStore::with(REMEMBER_KEY, &json))
    }

    #[tokio::test]
    async fn test_recall_with_accepted_record_authenticates() {
        let store = stored("a@b.com", "rt-old");
        let recall = CredentialRecall::new(StubAuth::accepting(), Arc::clone(&store));

        let mut states = Vec::new();
        let outcome = recall.recall_observed(|s| states.push(s)).await;

        let session = outcome.into_session().expect("authenticated");
        assert_eq!(session.user.email.as_deref(), Some("a@b.com"));
        assert_eq!(
            states,
            vec![
                RecallState::CheckingStoredCredential,
                RecallState::AutoSigningIn,
                RecallState::Authenticated,
            ]
        );
        // Rotated token replaces the stored one.
        assert_eq!(recall.load().unwrap().refresh_token, "rt-rotated");
    }

    #[tokio::test]
    async fn test_recall_rejected_record_is_deleted() {
        let store = stored("a@b.com", "rt-old");
        let recall = CredentialRecall::new(StubAuth::rejecting(), Arc::clone(&store));

        let outcome = recall.recall().await;

        assert!(matches!(outcome, RecallOutcome::AutoSignInFailed));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_recall_without_record_skips_auth() {
        let recall = CredentialRecall::new(StubAuth::accepting(), Arc::new(MemoryStore::new()));

        let outcome = recall.recall().await;

        assert!(matches!(outcome, RecallOutcome::NoStoredCredential));
        assert_eq!(recall.auth().resumes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_record_counts_as_absent() {
        for raw in ["not json", r#"{"email":"","refresh_token":"rt"}"#, r#"{"email":"a@b.com"}"#] {
            let store = Arc::new(MemoryStore::with(REMEMBER_KEY, raw));
            let recall = CredentialRecall::new(StubAuth::accepting(), Arc::clone(&store));

            assert!(matches!(recall.recall().await, RecallOutcome::NoStoredCredential));
            assert!(store.is_empty(), "{raw} should be deleted");
            assert_eq!(recall.auth().resumes.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_sign_in_with_remember_stores_email_and_token() {
        let recall = CredentialRecall::new(StubAuth::accepting(), Arc::new(MemoryStore::new()));

        recall.sign_in("a@b.com", "secret1", true).await.unwrap();

        assert_eq!(
            recall.load(),
            Some(RememberedLogin {
                email: "a@b.com".to_string(),
                refresh_token: "rt-signin".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_sign_in_without_remember_clears_prior_record() {
        let store = stored("old@b.com", "rt-old");
        let recall = CredentialRecall::new(StubAuth::accepting(), Arc::clone(&store));

        recall.sign_in("a@b.com", "secret1", false).await.unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_failed_sign_in_clears_record_and_writes_nothing() {
        let store = stored("old@b.com", "rt-old");
        let recall = CredentialRecall::new(StubAuth::accepting(), Arc::clone(&store));

        let err = recall.sign_in("a@b.com", "wrong", true).await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid login credentials");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_forgets_login() {
        let store = stored("a@b.com", "rt-old");
        let recall = CredentialRecall::new(StubAuth::accepting(), Arc::clone(&store));

        recall
            .sign_out(Some(&session("a@b.com", "rt-old")))
            .await
            .unwrap();

        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_remember_recovers_from_corrupt_storage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{trunc").unwrap();
        let recall = CredentialRecall::new(StubAuth::accepting(), FileStore::new(&path));

        recall.sign_in("a@b.com", "secret1", true).await.unwrap();

        let login = recall.load().expect("remembered login");
        assert_eq!(login.email, "a@b.com");
        assert_eq!(login.refresh_token, "rt-signin");
    }

    #[test]
    fn test_debug_redacts_token() {
        let login = RememberedLogin {
            email: "a@b.com".to_string(),
            refresh_token: "very-secret".to_string(),
        };
        assert!(!format!("{login:?}").contains("very-secret"));
    }
}
