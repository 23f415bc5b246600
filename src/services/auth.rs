// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{AuthResponse, Claims, User, UserRole},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, token_ttl: Duration) -> Self {
        Self {
            user_repo,
            jwt_secret,
            token_ttl,
        }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AppError::Forbidden("This account is inactive.".to_string()));
        }

        let token = encode_token(&self.jwt_secret, user.id, user.role, self.token_ttl)?;

        Ok(AuthResponse {
            token,
            role: user.role,
        })
    }

    /// Resolves a bearer token to the stored user it names.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        self.user_repo
            .find_by_id(self.user_repo.pool(), claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if !verify_password(current_password, &user.password_hash).await? {
            return Err(AppError::Forbidden("The current password is incorrect.".to_string()));
        }

        let new_hash = hash_password(new_password).await?;
        self.user_repo.update_password(user.id, &new_hash).await?;

        tracing::info!(user_id = user.id, "Password changed");
        Ok(())
    }

    pub async fn set_two_factor(&self, user_id: i64, enabled: bool) -> Result<(), AppError> {
        self.user_repo.set_two_factor(user_id, enabled).await
    }
}

// bcrypt is CPU-bound; keep it off the async workers

pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;

    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

    Ok(valid)
}

pub fn encode_token(secret: &str, user_id: i64, role: UserRole, ttl: Duration) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + ttl;

    let claims = Claims {
        sub: user_id,
        role,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}
