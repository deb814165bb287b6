use thiserror::Error;

use crate::store::{Store, StoreError, User};

pub mod google;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username is already taken")]
    DuplicateUsername,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Store(StoreError),
}

/// Resolves logins and registrations to canonical users. Credential material
/// never leaves this module; handlers only see the resolved `User`.
#[derive(Clone)]
pub struct AuthService {
    store: Store,
}

impl AuthService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a local account. The username must be unused; the conflict is
    /// propagated so the caller can send the client back to the
    /// registration view.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = User::local(username, hash_password(password)?);
        match self.store.insert_user(&user).await {
            Ok(()) => Ok(user),
            Err(StoreError::DuplicateKey(_)) => Err(AuthError::DuplicateUsername),
            Err(e) => Err(AuthError::Store(e)),
        }
    }

    /// Verify a local login. Unknown usernames and wrong passwords are
    /// indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .find_by_username(username.trim())
            .await
            .map_err(AuthError::Store)?;

        match user {
            Some(user) => {
                let hash = user
                    .password_hash
                    .as_deref()
                    .ok_or(AuthError::InvalidCredentials)?;
                if verify_password(password, hash)? {
                    Ok(user)
                } else {
                    Err(AuthError::InvalidCredentials)
                }
            }
            None => Err(AuthError::InvalidCredentials),
        }
    }

    /// Resolve a federated identity, creating the user on first sign-in.
    /// Idempotent per federated id.
    pub async fn find_or_create(&self, google_id: &str) -> Result<User, AuthError> {
        self.store
            .find_or_create_google(google_id)
            .await
            .map_err(AuthError::Store)
    }
}

fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, hash)
}
