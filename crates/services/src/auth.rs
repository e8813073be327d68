//! # Accounts
//!
//! Registration and login, orchestrated over the password and session-token
//! ports. The adapters own the cryptography; this service owns the rules.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use domains::{AppError, Passwords, Result, SessionTokens, User, UserRepo};

const MIN_USERNAME: usize = 3;
const MAX_USERNAME: usize = 32;
const MIN_PASSWORD: usize = 8;

pub struct AuthService {
    users: Arc<dyn UserRepo>,
    passwords: Arc<dyn Passwords>,
    tokens: Arc<dyn SessionTokens>,
}

fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if !(MIN_USERNAME..=MAX_USERNAME).contains(&len) {
        return Err(AppError::validation(format!(
            "username must be {MIN_USERNAME}-{MAX_USERNAME} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::validation(
            "username may contain letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        passwords: Arc<dyn Passwords>,
        tokens: Arc<dyn SessionTokens>,
    ) -> Self {
        Self {
            users,
            passwords,
            tokens,
        }
    }

    /// Creates an account. `Conflict` when the username is taken.
    pub async fn register(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        validate_username(username)?;
        if password.chars().count() < MIN_PASSWORD {
            return Err(AppError::validation(format!(
                "password must be at least {MIN_PASSWORD} characters"
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: self.passwords.hash(password)?,
            is_admin: false,
            avatar_url: None,
            created_at: Utc::now(),
        };
        self.users.create(&user).await?;
        Ok(user)
    }

    /// Verifies credentials and issues a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .users
            .by_username(username.trim())
            .await?
            .filter(|user| self.passwords.verify(password, &user.password_hash))
            .ok_or_else(|| AppError::Unauthenticated("invalid credentials".into()))?;
        let token = self.tokens.issue(&user)?;
        Ok((user, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockPasswords, MockSessionTokens, MockUserRepo};

    #[tokio::test]
    async fn register_rejects_bad_usernames() {
        let svc = AuthService::new(
            Arc::new(MockUserRepo::new()),
            Arc::new(MockPasswords::new()),
            Arc::new(MockSessionTokens::new()),
        );
        for bad in ["ab", "has space", "way-too-long-for-a-username-really-it-is"] {
            let err = svc.register(bad, "longenough").await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{bad}");
        }
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_without_leaking_which() {
        let mut users = MockUserRepo::new();
        users.expect_by_username().returning(|_| Ok(None));
        let mut passwords = MockPasswords::new();
        passwords.expect_verify().times(0);

        let svc = AuthService::new(
            Arc::new(users),
            Arc::new(passwords),
            Arc::new(MockSessionTokens::new()),
        );
        let err = svc.login("ghost", "whatever").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated(_)));
    }
}
