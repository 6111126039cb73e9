//! Signed-in user context and its lifecycle

use std::sync::Arc;
use token_backend::repositories::ProfileRepository;
use token_backend::{AuthBackend, Backend};
use token_core::types::{AuthUser, SignUpMetadata, UserProfile};
use token_core::{Result, TokenError};
use tracing::{info, warn};

const MIN_PASSWORD_LEN: usize = 6;

/// An authenticated user and the bearer token for their requests
#[derive(Clone)]
pub struct Session {
    user: AuthUser,
    profile: Option<UserProfile>,
    access_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("profile", &self.profile)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl Session {
    pub fn new(user: AuthUser, access_token: String, profile: Option<UserProfile>) -> Self {
        Self {
            user,
            profile,
            access_token,
        }
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Address the user holds tokens under: the wallet when set, else the user id
    pub fn address(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.wallet_address.as_deref())
            .filter(|w| !w.is_empty())
            .unwrap_or(&self.user.id)
    }

    pub fn display_name(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.full_name.as_deref())
            .filter(|n| !n.is_empty())
            .or(self.user.email.as_deref())
            .unwrap_or("User")
    }
}

/// Fields of the registration form
#[derive(Debug, Clone, Default)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: String,
    pub wallet_address: String,
}

impl SignUpRequest {
    fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(TokenError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }
        if self.password != self.confirm_password {
            return Err(TokenError::Validation("Passwords do not match".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(TokenError::Validation(
                "Password must be at least 6 characters long".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    SignedIn(Session),
    /// Account created; the auth service wants the email confirmed first
    ConfirmationPending(AuthUser),
}

/// Creates and ends sessions against an auth-capable backend
pub struct Authenticator<B: ?Sized> {
    backend: Arc<B>,
}

impl<B: ?Sized> Clone for Authenticator<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: AuthBackend + Backend + ?Sized> Authenticator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(TokenError::Validation("Please fill in all fields".to_string()));
        }

        let grant = self.backend.sign_in(email.trim(), password).await?;
        let token = grant.access_token.ok_or(TokenError::Unauthenticated)?;
        let profile = self.load_profile(&grant.user.id, &token).await;

        info!(user_id = %grant.user.id, "Signed in");
        Ok(Session::new(grant.user, token, profile))
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome> {
        request.validate()?;

        let metadata = SignUpMetadata {
            full_name: request.full_name.trim().to_string(),
            wallet_address: request.wallet_address.trim().to_string(),
        };
        let grant = self
            .backend
            .sign_up(request.email.trim(), &request.password, &metadata)
            .await?;

        match grant.access_token {
            Some(token) => {
                let profile = self.load_profile(&grant.user.id, &token).await;
                info!(user_id = %grant.user.id, "Signed up");
                Ok(SignUpOutcome::SignedIn(Session::new(grant.user, token, profile)))
            }
            None => {
                info!(user_id = %grant.user.id, "Signed up, awaiting email confirmation");
                Ok(SignUpOutcome::ConfirmationPending(grant.user))
            }
        }
    }

    /// Invalidate the session's token; the session is consumed either way
    pub async fn sign_out(&self, session: Session) -> Result<()> {
        self.backend.sign_out(session.access_token()).await?;
        info!(user_id = %session.user_id(), "Signed out");
        Ok(())
    }

    async fn load_profile(&self, user_id: &str, token: &str) -> Option<UserProfile> {
        match ProfileRepository::get_by_id(&*self.backend, user_id, Some(token)).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id, error = %e, "Failed to load user profile");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use token_backend::{BackendError, MemoryBackend};

    fn authenticator() -> (Arc<MemoryBackend>, Authenticator<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        backend.add_user("ana@piso.dev", "secret1", "Ana Reyes", "0xa11ce");
        (backend.clone(), Authenticator::new(backend))
    }

    fn request(password: &str, confirm: &str) -> SignUpRequest {
        SignUpRequest {
            email: "ben@piso.dev".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            full_name: "  Ben Santos ".to_string(),
            wallet_address: " 0xb0b ".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_loads_profile() {
        let (_, auth) = authenticator();
        let session = auth.sign_in(" ana@piso.dev ", "secret1").await.unwrap();

        assert_eq!(session.display_name(), "Ana Reyes");
        assert_eq!(session.address(), "0xa11ce");
        assert!(!format!("{session:?}").contains(session.access_token()));
    }

    #[tokio::test]
    async fn test_sign_in_validation_and_rejection() {
        let (_, auth) = authenticator();
        assert_eq!(
            auth.sign_in("", "secret1").await.unwrap_err().message(),
            "Please fill in all fields"
        );
        assert_eq!(
            auth.sign_in("ana@piso.dev", "wrong!").await.unwrap_err().message(),
            "Invalid login credentials"
        );
    }

    #[tokio::test]
    async fn test_sign_in_keeps_session_when_profile_fails() {
        let (backend, auth) = authenticator();
        // sign-in succeeds, the profile select that follows fails
        let session = {
            let grant = backend.sign_in("ana@piso.dev", "secret1").await.unwrap();
            backend.fail_next(BackendError::Connection("offline".to_string()));
            let token = grant.access_token.unwrap();
            let profile = auth.load_profile(&grant.user.id, &token).await;
            Session::new(grant.user, token, profile)
        };
        assert!(session.profile().is_none());
        assert_eq!(session.display_name(), "ana@piso.dev");
        assert_eq!(session.address(), session.user_id());
    }

    #[tokio::test]
    async fn test_sign_up_validation_order() {
        let (_, auth) = authenticator();
        let cases = [
            (request("", ""), "Please fill in all required fields"),
            (request("secret1", "secret2"), "Passwords do not match"),
            (request("abc", "abc"), "Password must be at least 6 characters long"),
        ];
        for (req, expected) in cases {
            assert_eq!(auth.sign_up(&req).await.unwrap_err().message(), expected);
        }
    }

    #[tokio::test]
    async fn test_sign_up_trims_metadata_and_signs_in() {
        let (_, auth) = authenticator();
        let outcome = auth.sign_up(&request("secret1", "secret1")).await.unwrap();

        let SignUpOutcome::SignedIn(session) = outcome else {
            panic!("expected a session");
        };
        assert_eq!(session.display_name(), "Ben Santos");
        assert_eq!(session.address(), "0xb0b");
    }

    #[tokio::test]
    async fn test_sign_out_invalidates_token() {
        let (backend, auth) = authenticator();
        let session = auth.sign_in("ana@piso.dev", "secret1").await.unwrap();
        let token = session.access_token().to_string();
        auth.sign_out(session).await.unwrap();

        let contract = backend.add_contract("PISO Token", "PISO", 0, Default::default());
        let err = token_backend::repositories::TokenRpc::approve(
            &*backend,
            &contract,
            "0xa11ce",
            Default::default(),
            Some(&token),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Not authenticated");
    }
}
