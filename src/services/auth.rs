//! Authentication service: register, login and logout

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, RegistrationForm,
        TokenInfo, User,
    },
    services::{http::ApiClient, session::SessionStore},
};

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    session: SessionStore,
}

impl AuthService {
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        Self { api, session }
    }

    /// Create an account. The local session is left untouched.
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<RegisterResponse> {
        request.validate()?;

        let response: RegisterResponse = self
            .api
            .post("/auth/register", request)
            .await
            .map_err(|e| AppError::Auth(e.into_message("Error registering user")))?;

        tracing::info!("Registered user {}", response.user.username);
        Ok(response)
    }

    /// Sign-up flow: check the form, register, then log in with the new
    /// credentials
    pub async fn register_and_login(&self, form: RegistrationForm) -> AppResult<LoginResponse> {
        let request = form.into_request()?;
        self.register(&request).await?;

        self.login(&LoginRequest {
            login: request.username,
            password: request.password,
        })
        .await
    }

    /// Authenticate and store token and user in the session
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        request.validate()?;

        let response: LoginResponse = self
            .api
            .post("/auth/login", request)
            .await
            .map_err(|e| AppError::Auth(e.into_message("Error logging in")))?;

        if response.access_token.is_empty() {
            tracing::warn!("Login response for {} carried no token", response.user.username);
            return Err(AppError::Auth("Error logging in".to_string()));
        }
        self.session.store(&response.access_token, &response.user)?;

        tracing::info!("Logged in as {}", response.user.username);
        Ok(response)
    }

    /// Drop the local session. No network call; safe to repeat.
    pub fn logout(&self) {
        self.session.clear();
        tracing::info!("Logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    pub fn token_info(&self) -> Option<TokenInfo> {
        self.session.token_info()
    }
}
