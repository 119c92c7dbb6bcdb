// Authentication service - business logic layer

use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{CreateUserRequest, LoginRequest, LoginResponse, Role, UpdateUserRequest, UserResponse},
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};

/// Authentication service coordinating login and staff account management
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    token_service: std::sync::Arc<TokenService>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(user_repo: UserRepository, token_service: TokenService) -> Self {
        Self {
            user_repo,
            token_service: std::sync::Arc::new(token_service),
        }
    }

    /// Log in a staff member and issue an access token
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        let user = self
            .user_repo
            .find_by_username(&request.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token =
            self.token_service
                .generate_access_token(user.id, &user.username, user.role)?;

        tracing::info!("User {} logged in", user.username);

        Ok(LoginResponse {
            access_token,
            user: user.into(),
        })
    }

    /// Get current user information from a validated token subject
    pub async fn get_current_user(&self, user_id: i32) -> Result<UserResponse, AuthError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    /// Create a staff account; role defaults to staff when omitted
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        let password_hash = PasswordService::hash_password(&request.password)?;
        let role = request.role.unwrap_or(Role::Staff);

        let user = self
            .user_repo
            .create_user(&request.username, &password_hash, &request.name, role)
            .await?;

        tracing::info!("Created user {} with role {}", user.username, user.role);

        Ok(user.into())
    }

    /// List staff accounts with an optional search term
    pub async fn list_users(&self, search: Option<&str>) -> Result<Vec<UserResponse>, AuthError> {
        let users = self.user_repo.find_all(search).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Get a staff account by ID
    pub async fn get_user(&self, id: i32) -> Result<UserResponse, AuthError> {
        let user = self
            .user_repo
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.into())
    }

    /// Update a staff account; a supplied password is re-hashed first
    pub async fn update_user(
        &self,
        id: i32,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, AuthError> {
        request
            .validate()
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;

        let password_hash = match &request.password {
            Some(password) => Some(PasswordService::hash_password(password)?),
            None => None,
        };

        let user = self
            .user_repo
            .update_user(
                id,
                request.username.as_deref(),
                password_hash.as_deref(),
                request.name.as_deref(),
                request.role,
            )
            .await?;

        Ok(user.into())
    }

    /// Delete a staff account
    pub async fn delete_user(&self, id: i32) -> Result<(), AuthError> {
        self.user_repo.delete_user(id).await?;
        tracing::info!("Deleted user {}", id);
        Ok(())
    }
}
