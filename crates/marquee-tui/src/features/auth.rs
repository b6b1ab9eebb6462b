//! Auth feature reducer.
//!
//! Applies sign-in, sign-up, recall, and sign-out results to the session,
//! the login/sign-up overlays, and the watchlist.

use marquee_core::recall::RecallOutcome;
use marquee_core::services::SignUpOutcome;
use marquee_core::toast::ToastOptions;
use marquee_core::types::Session;
use tracing::debug;

use super::watchlist;
use crate::effects::UiEffect;
use crate::events::AuthUiEvent;
use crate::overlays::{LoginState, Overlay};
use crate::state::{TuiState, View};

/// Enters the signed-in state: the form closes and the watchlist loads.
fn on_session(tui: &mut TuiState, overlay: &mut Option<Overlay>, session: Session) -> Vec<UiEffect> {
    if matches!(overlay, Some(Overlay::Login(_) | Overlay::SignUp(_))) {
        *overlay = None;
    }
    tui.session = Some(session);
    tui.view = View::Watchlist;
    tui.watchlist.clear();
    watchlist::reload(tui)
}

fn greeting(session: &Session) -> String {
    session.user.display_name().to_string()
}

/// Effect signing the current user out.
pub fn sign_out(tui: &TuiState) -> UiEffect {
    UiEffect::SignOut {
        task: None,
        session: tui.session.clone(),
    }
}

pub fn handle_event(
    tui: &mut TuiState,
    overlay: &mut Option<Overlay>,
    event: AuthUiEvent,
) -> Vec<UiEffect> {
    match event {
        AuthUiEvent::Recalled(outcome) => {
            debug!(state = ?outcome.state(), "recall settled");
            match outcome {
                RecallOutcome::Authenticated(session) => {
                    let message = format!("Welcome back, {}", greeting(&session));
                    let mut effects = on_session(tui, overlay, session);
                    effects.push(UiEffect::toast(message, ToastOptions::info()));
                    effects
                }
                // Background convenience: nothing to report, the form stays up.
                RecallOutcome::NoStoredCredential | RecallOutcome::AutoSignInFailed => vec![],
            }
        }
        AuthUiEvent::SignedIn(Ok(session)) => {
            let message = format!("Signed in as {}", greeting(&session));
            let mut effects = on_session(tui, overlay, session);
            effects.push(UiEffect::toast(message, ToastOptions::success()));
            effects
        }
        AuthUiEvent::SignedIn(Err(err)) => {
            match overlay {
                Some(Overlay::Login(login)) => login.on_failed(err.message),
                // The form was closed while the request ran.
                _ => {
                    return vec![UiEffect::toast(
                        format!("Sign in failed: {err}"),
                        ToastOptions::error(),
                    )];
                }
            }
            vec![]
        }
        AuthUiEvent::SignedUp { email, result } => match result {
            Ok(SignUpOutcome::SignedIn(session)) => {
                let mut effects = on_session(tui, overlay, session);
                effects.push(UiEffect::toast(
                    "Account created. Welcome to Marquee!",
                    ToastOptions::success(),
                ));
                effects
            }
            Ok(SignUpOutcome::ConfirmationRequired { .. }) => {
                *overlay = Some(Overlay::Login(LoginState::open(Some(email.clone()))));
                vec![UiEffect::toast(
                    format!("Check {email} to confirm your account, then sign in"),
                    ToastOptions::info().sticky(),
                )]
            }
            Err(err) => match overlay {
                Some(Overlay::SignUp(signup)) => {
                    signup.on_failed(err.message);
                    vec![]
                }
                _ => vec![UiEffect::toast(
                    format!("Sign up failed: {err}"),
                    ToastOptions::error(),
                )],
            },
        },
        AuthUiEvent::SignedOut(result) => {
            // The local session ends whether or not the server call worked.
            tui.session = None;
            tui.detail = None;
            tui.watchlist.clear();
            *overlay = Some(Overlay::Login(LoginState::open(None)));
            match result {
                Ok(()) => vec![UiEffect::toast("Signed out", ToastOptions::info())],
                Err(err) => vec![UiEffect::toast(
                    format!("Signed out locally ({err})"),
                    ToastOptions::info(),
                )],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::error::{ServiceError, ServiceErrorKind};
    use marquee_core::types::{User, UserMetadata};

    use super::*;

    fn session() -> Session {
        Session {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_at: None,
            user: User {
                id: "u-1".to_string(),
                email: Some("a@b.com".to_string()),
                user_metadata: UserMetadata::default(),
            },
        }
    }

    #[test]
    fn test_recalled_session_closes_login_and_loads_watchlist() {
        let mut tui = TuiState::new(6);
        tui.view = View::Movies;
        let mut overlay = Some(Overlay::Login(LoginState::open(None)));

        let effects = handle_event(
            &mut tui,
            &mut overlay,
            AuthUiEvent::Recalled(RecallOutcome::Authenticated(session())),
        );

        assert!(overlay.is_none());
        assert!(tui.is_signed_in());
        assert_eq!(tui.view, View::Watchlist);
        assert!(matches!(effects[0], UiEffect::LoadWatchlist { .. }));
    }

    #[test]
    fn test_failed_recall_is_silent() {
        let mut tui = TuiState::new(6);
        let mut overlay = Some(Overlay::Login(LoginState::open(None)));

        let effects = handle_event(
            &mut tui,
            &mut overlay,
            AuthUiEvent::Recalled(RecallOutcome::AutoSignInFailed),
        );

        assert!(effects.is_empty());
        assert!(matches!(overlay, Some(Overlay::Login(_))));
        assert!(!tui.is_signed_in());
    }

    #[test]
    fn test_rejected_sign_in_shows_inline_error() {
        let mut tui = TuiState::new(6);
        let mut login = LoginState::open(Some("a@b.com".to_string()));
        login.submitting = true;
        let mut overlay = Some(Overlay::Login(login));

        let effects = handle_event(
            &mut tui,
            &mut overlay,
            AuthUiEvent::SignedIn(Err(ServiceError::new(
                ServiceErrorKind::Auth,
                "Invalid login credentials",
            ))),
        );

        assert!(effects.is_empty());
        match overlay {
            Some(Overlay::Login(login)) => {
                assert!(!login.submitting);
                assert_eq!(login.error.as_deref(), Some("Invalid login credentials"));
            }
            other => panic!("unexpected overlay: {other:?}"),
        }
    }

    #[test]
    fn test_confirmation_required_prefills_login() {
        let mut tui = TuiState::new(6);
        let mut overlay = None;

        let effects = handle_event(
            &mut tui,
            &mut overlay,
            AuthUiEvent::SignedUp {
                email: "new@b.com".to_string(),
                result: Ok(SignUpOutcome::ConfirmationRequired {
                    email: "new@b.com".to_string(),
                }),
            },
        );

        assert!(matches!(
            &overlay,
            Some(Overlay::Login(login)) if login.email.value() == "new@b.com"
        ));
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_sign_out_clears_session_even_on_error() {
        let mut tui = TuiState::new(6);
        tui.session = Some(session());
        let mut overlay = None;

        handle_event(
            &mut tui,
            &mut overlay,
            AuthUiEvent::SignedOut(Err(ServiceError::new(
                ServiceErrorKind::Network,
                "Network error: refused",
            ))),
        );

        assert!(!tui.is_signed_in());
        assert!(matches!(overlay, Some(Overlay::Login(_))));
    }
}
