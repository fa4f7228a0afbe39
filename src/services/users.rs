//! Registration, token exchange and own-profile management

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;
use validator::Validate;

use crate::{
    error::{AppError, AppResult, FieldErrors, NON_FIELD_ERRORS},
    models::user::{
        normalize_email, CreateUser, TokenRequest, TokenResponse, UpdateProfile, User, UserProfile,
    },
    repository::Repository,
};

const BAD_CREDENTIALS: &str = "Unable to authenticate with provided credentials";
const EMAIL_TAKEN: &str = "user with this email already exists.";

/// New random token key: 20 random bytes, hex encoded
pub fn generate_token_key() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new account and return its public profile
    pub async fn register(&self, mut data: CreateUser) -> AppResult<UserProfile> {
        data.email = normalize_email(&data.email);
        data.name = data.name.trim().to_string();
        data.validate()?;

        if self.repository.users_email_exists(&data.email, None).await? {
            return Err(AppError::field("email", EMAIL_TAKEN));
        }

        let password_hash = hash_password(&data.password)?;
        let last_name = data.last_name.as_deref().map(str::trim).unwrap_or_default();
        let user = self
            .repository
            .users_create(&data.email, &data.name, last_name, &password_hash)
            .await?;

        tracing::info!("Registered user id={}", user.id);

        Ok(user.into())
    }

    /// Exchange email and password for the user's token, creating it on first use
    pub async fn obtain_token(&self, request: TokenRequest) -> AppResult<TokenResponse> {
        let email = normalize_email(&request.email);

        let mut errors = FieldErrors::new();
        if email.is_empty() {
            errors.insert("email".to_string(), vec!["This field may not be blank.".to_string()]);
        }
        if request.password.is_empty() {
            errors.insert("password".to_string(), vec!["This field may not be blank.".to_string()]);
        }
        if !errors.is_empty() {
            return Err(AppError::Fields(errors));
        }

        let user = match self.repository.users_get_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => return Err(AppError::field(NON_FIELD_ERRORS, BAD_CREDENTIALS)),
        };

        if !verify_password(&user.password, &request.password)? {
            tracing::debug!("Rejected credentials for user id={}", user.id);
            return Err(AppError::field(NON_FIELD_ERRORS, BAD_CREDENTIALS));
        }

        let token = self
            .repository
            .users_get_or_create_token(user.id, &generate_token_key())
            .await?;

        Ok(TokenResponse { token })
    }

    /// Resolve a presented token key to an active user
    pub async fn authenticate_token(&self, key: &str) -> AppResult<User> {
        let user = self
            .repository
            .users_get_by_token(key)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid token.".to_string()))?;

        if !user.is_active {
            return Err(AppError::Authentication("User inactive or deleted.".to_string()));
        }

        Ok(user)
    }

    pub async fn get_profile(&self, user_id: i32) -> AppResult<UserProfile> {
        Ok(self.repository.users_get_by_id(user_id).await?.into())
    }

    /// Update name, email and/or password of the calling user
    pub async fn update_profile(&self, user_id: i32, mut data: UpdateProfile) -> AppResult<UserProfile> {
        data.name = data.name.map(|name| name.trim().to_string());
        data.email = data.email.map(|email| normalize_email(&email));
        data.validate()?;

        if let Some(ref email) = data.email {
            if self.repository.users_email_exists(email, Some(user_id)).await? {
                return Err(AppError::field("email", EMAIL_TAKEN));
            }
        }

        let password_hash = data.password.as_deref().map(hash_password).transpose()?;

        let user = self
            .repository
            .users_update_profile(
                user_id,
                data.name.as_deref(),
                data.email.as_deref(),
                password_hash.as_deref(),
            )
            .await?;

        Ok(user.into())
    }
}
