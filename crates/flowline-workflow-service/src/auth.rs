//! Email/password authentication over credential stores
//!
//! The first login with an unknown email registers it. The logged-in user is
//! written to the persistent store when "remember me" is set and to the
//! session store otherwise.

use serde::{Deserialize, Serialize};

use crate::credentials::CredentialStore;
use crate::error::AuthError;

const USERS_KEY: &str = "users";
const CURRENT_USER_KEY: &str = "currentUser";

/// The logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub email: String,
}

impl CurrentUser {
    /// Name shown as "last edited by": the local part of the email
    pub fn display_name(&self) -> String {
        display_name(&self.email)
    }
}

/// Local part of an email, or "Unknown User" when there is none
pub fn display_name(email: &str) -> String {
    match email.split('@').next() {
        Some(local) if !local.is_empty() => local.to_string(),
        _ => "Unknown User".to_string(),
    }
}

/// Source of the current user
pub trait UserProvider {
    fn current_user(&self) -> Option<CurrentUser>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    email: String,
    password_hash: String,
}

/// Authentication service
pub struct AuthService<P, S> {
    persistent: P,
    session: S,
}

impl<P: CredentialStore, S: CredentialStore> AuthService<P, S> {
    pub fn new(persistent: P, session: S) -> Self {
        Self {
            persistent,
            session,
        }
    }

    /// Log in, registering the email if it is new
    pub fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<CurrentUser, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials(
                "email and password are required".to_string(),
            ));
        }

        let mut users = self.users()?;
        let hash = hash_password(email, password);
        let password_matches = users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.password_hash == hash);
        match password_matches {
            Some(false) => {
                log::info!("Rejected login for '{}': incorrect password", email);
                return Err(AuthError::IncorrectPassword);
            }
            Some(true) => {}
            None => {
                users.push(StoredUser {
                    email: email.to_string(),
                    password_hash: hash,
                });
                let json = serde_json::to_string(&users).map_err(storage_error)?;
                self.persistent.set(USERS_KEY, json)?;
                log::info!("Registered new user '{}'", email);
            }
        }

        let user = CurrentUser {
            email: email.to_string(),
        };
        let json = serde_json::to_string(&user).map_err(storage_error)?;
        if remember_me {
            self.persistent.set(CURRENT_USER_KEY, json)?;
        } else {
            self.session.set(CURRENT_USER_KEY, json)?;
        }
        log::info!("User '{}' logged in (remember: {})", email, remember_me);
        Ok(user)
    }

    /// Forget the current user in both stores
    pub fn logout(&self) -> Result<(), AuthError> {
        self.persistent.remove(CURRENT_USER_KEY)?;
        self.session.remove(CURRENT_USER_KEY)?;
        Ok(())
    }

    /// The logged-in user, persistent store first
    pub fn read_current_user(&self) -> Result<Option<CurrentUser>, AuthError> {
        let stored = match self.persistent.get(CURRENT_USER_KEY)? {
            Some(json) => Some(json),
            None => self.session.get(CURRENT_USER_KEY)?,
        };
        stored
            .map(|json| serde_json::from_str(&json).map_err(storage_error))
            .transpose()
    }

    fn users(&self) -> Result<Vec<StoredUser>, AuthError> {
        match self.persistent.get(USERS_KEY)? {
            Some(json) => serde_json::from_str(&json).map_err(storage_error),
            None => Ok(Vec::new()),
        }
    }
}

impl<P: CredentialStore, S: CredentialStore> UserProvider for AuthService<P, S> {
    fn current_user(&self) -> Option<CurrentUser> {
        match self.read_current_user() {
            Ok(user) => user,
            Err(e) => {
                log::warn!("Failed to read current user: {}", e);
                None
            }
        }
    }
}

fn hash_password(email: &str, password: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(email.as_bytes());
    hasher.update(&[0]);
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}

fn storage_error(e: serde_json::Error) -> AuthError {
    AuthError::Storage(e.to_string())
}
