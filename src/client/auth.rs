//! Account endpoints of the backend, and the session transitions they drive.

use tracing::{info, instrument, warn};

use super::api_client::AuthenticatedClient;
use super::error::ApiError;
use super::types::{
    ApiMessage, AuthResponse, ChangePasswordParams, ForgotPasswordParams, LoginParams,
    RegisterParams, ResetPasswordParams, User,
};
use crate::session::Credential;

impl AuthenticatedClient {
    /// POST /login, then stores the issued credential
    #[instrument(skip(self, params), fields(email = %params.email))]
    pub async fn login(&self, params: &LoginParams) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.post_json("/login", params).await?;
        self.adopt_credential(&response)?;
        info!(user_id = response.user.id, "Logged in");
        Ok(response)
    }

    /// POST /register, then stores the issued credential
    #[instrument(skip(self, params), fields(email = %params.email))]
    pub async fn register(&self, params: &RegisterParams) -> Result<AuthResponse, ApiError> {
        let response: AuthResponse = self.post_json("/register", params).await?;
        self.adopt_credential(&response)?;
        info!(user_id = response.user.id, "Registered");
        Ok(response)
    }

    /// POST /logout. The local session ends even when the backend call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.post_empty("/logout").await;
        if let Err(ref e) = result {
            warn!(error = %e, "Backend logout failed, clearing local session anyway");
        }
        self.end_session();
        result
    }

    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.get_json("/user").await
    }

    pub async fn change_password(&self, params: &ChangePasswordParams) -> Result<ApiMessage, ApiError> {
        self.post_json("/user/change-password", params).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<ApiMessage, ApiError> {
        let params = ForgotPasswordParams {
            email: email.to_string(),
        };
        self.post_json("/forgot-password", &params).await
    }

    pub async fn reset_password(&self, params: &ResetPasswordParams) -> Result<ApiMessage, ApiError> {
        self.post_json("/reset-password", params).await
    }

    fn adopt_credential(&self, response: &AuthResponse) -> Result<(), ApiError> {
        let credential = Credential::new(response.access_token.clone()).ok_or_else(|| {
            ApiError::InvalidResponse("backend issued an unusable access token".to_string())
        })?;
        self.begin_session(credential);
        Ok(())
    }
}
