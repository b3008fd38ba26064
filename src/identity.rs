//! Account registration, lookup and credential checks.
//!
//! The payroll service does not own user credentials. It talks to an
//! [`IdentityProvider`] that creates accounts, resolves them by email and
//! verifies passwords; [`InMemoryIdentityProvider`] applies the same
//! acceptance rules as the hosted provider it stands in for.

use std::collections::HashMap;
use std::sync::RwLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult};

/// Shortest password the provider accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Opaque account identifier issued by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account identifier.
    pub id: AccountId,
    /// The email the account was registered with.
    pub email: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Creates and resolves accounts.
pub trait IdentityProvider: Send + Sync {
    /// Registers a new account.
    fn create_account(&self, email: &str, password: &str) -> PayrollResult<Account>;

    /// Resolves the account registered under `email`.
    fn lookup_by_email(&self, email: &str) -> PayrollResult<Account>;

    /// Resolves the account registered under `email` if `password` matches.
    ///
    /// Fails with [`PayrollError::AccountNotFound`] for an unknown email and
    /// [`PayrollError::InvalidCredentials`] for a wrong password.
    fn verify_credentials(&self, email: &str, password: &str) -> PayrollResult<Account>;
}

#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    password_hash: String,
}

/// An identity provider that keeps accounts in memory.
///
/// Emails are matched case-insensitively. Passwords are kept only as
/// Argon2 PHC strings.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, StoredAccount>>,
}

impl InMemoryIdentityProvider {
    /// Creates a provider with no accounts.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> PayrollError {
    PayrollError::IdentityFailure {
        message: "account registry lock poisoned".to_string(),
    }
}

fn hash_password(password: &str) -> PayrollResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PayrollError::IdentityFailure {
            message: format!("failed to hash password: {}", e),
        })
}

fn password_matches(password: &str, hashed: &str) -> PayrollResult<bool> {
    let parsed = PasswordHash::new(hashed).map_err(|e| PayrollError::IdentityFailure {
        message: format!("stored password hash is unreadable: {}", e),
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn validate_email(email: &str) -> PayrollResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(PayrollError::invalid_field(
            "email",
            format!("'{}' is not a valid email address", email),
        ))
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn create_account(&self, email: &str, password: &str) -> PayrollResult<Account> {
        let email = email.trim();
        validate_email(email)?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PayrollError::invalid_field(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }

        let password_hash = hash_password(password)?;

        let key = email.to_lowercase();
        let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
        if accounts.contains_key(&key) {
            return Err(PayrollError::AccountExists {
                email: email.to_string(),
            });
        }

        let account = Account {
            id: AccountId(Uuid::new_v4()),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        accounts.insert(
            key,
            StoredAccount {
                account: account.clone(),
                password_hash,
            },
        );
        Ok(account)
    }

    fn lookup_by_email(&self, email: &str) -> PayrollResult<Account> {
        self.stored(email).map(|stored| stored.account)
    }

    fn verify_credentials(&self, email: &str, password: &str) -> PayrollResult<Account> {
        let stored = self.stored(email)?;
        if password_matches(password, &stored.password_hash)? {
            Ok(stored.account)
        } else {
            Err(PayrollError::InvalidCredentials)
        }
    }
}

impl InMemoryIdentityProvider {
    fn stored(&self, email: &str) -> PayrollResult<StoredAccount> {
        let email = email.trim();
        let accounts = self.accounts.read().map_err(|_| poisoned())?;
        accounts
            .get(&email.to_lowercase())
            .cloned()
            .ok_or_else(|| PayrollError::AccountNotFound {
                email: email.to_string(),
            })
    }
}
