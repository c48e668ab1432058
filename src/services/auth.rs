//! Authentication service: registration, login, token issuing

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginResponse, RegisterUser, User, UserClaims, UserShort},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user
    pub async fn register(&self, payload: RegisterUser) -> AppResult<User> {
        payload
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.users.username_exists(&payload.username).await? {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                payload.username
            )));
        }
        if self.repository.users.email_exists(&payload.email).await? {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                payload.email
            )));
        }

        let password_hash = hash_password(&payload.password)?;

        let user = self
            .repository
            .users
            .create(
                &payload.username,
                &payload.email,
                &password_hash,
                payload.phone.as_deref(),
                payload.location.as_deref(),
            )
            .await?;

        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Verify credentials and issue a JWT token
    pub async fn login(&self, username: &str, password: &str) -> AppResult<LoginResponse> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        verify_password(password, &user.password_hash)
            .map_err(|_| AppError::Authentication("Invalid username or password".to_string()))?;

        let now = Utc::now();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.jwt_expiration_hours as i64)).timestamp(),
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            user: UserShort {
                id: user.id,
                username: user.username,
                location: user.location,
            },
        })
    }

    /// Current user from claims
    pub async fn current_user(&self, claims: &UserClaims) -> AppResult<User> {
        self.repository.users.get_by_id(claims.user_id).await
    }

    /// Public profile lookup
    pub async fn get_profile(&self, user_id: i32) -> AppResult<UserShort> {
        self.repository.users.get_short_by_id(user_id).await
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<(), argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Argon2::default().verify_password(password.as_bytes(), &parsed)
}
