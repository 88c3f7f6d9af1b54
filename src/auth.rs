// 🔐 Authentication Store - mock users, lockout and audit trail
//
// Everything lives in memory and is seeded at startup. Time is passed in by
// the caller (`now`) so lockout windows are testable without a clock.
//
// Every change is an event: registrations, logins, lockouts and deletions
// are appended to `auth_log`.

use crate::validation::{self, FieldError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use thiserror::Error;

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    pub company: String,

    /// Lower-cased, trimmed
    pub email: String,

    /// SHA-256 of `salt + password`, hex
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    fn verify_password(&self, password: &str) -> bool {
        hash_password(&self.salt, password) == self.password_hash
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedAccount {
    pub email: String,
    pub deleted_at: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationAttempt {
    pub email: String,
    pub at: DateTime<Utc>,
    pub blocked: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEventKind {
    Registered,
    RegistrationBlocked,
    LoginSucceeded,
    LoginFailed,
    LockedOut,
    LoggedOut,
    AccountDeleted,
}

/// Audit entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthLogEntry {
    pub event_id: String,
    pub at: DateTime<Utc>,
    pub email: String,
    pub kind: AuthEventKind,
    pub detail: Option<String>,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("invalid input: {}", join_field_errors(.0))]
    Validation(Vec<FieldError>),

    #[error("this email belongs to a deleted account: {email}")]
    AccountDeleted { email: String },

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("invalid email or password ({attempts_remaining} attempts remaining)")]
    InvalidCredentials { attempts_remaining: u32 },

    #[error("account locked, try again in {remaining_minutes} minutes")]
    Locked { remaining_minutes: i64 },

    #[error("no user is signed in")]
    NotSignedIn,
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl From<Vec<FieldError>> for AuthError {
    fn from(errors: Vec<FieldError>) -> Self {
        AuthError::Validation(errors)
    }
}

// ============================================================================
// POLICY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPolicy {
    /// Failed logins within `lockout_window` that trigger a lockout
    pub lockout_threshold: u32,
    pub lockout_window: Duration,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        AuthPolicy {
            lockout_threshold: 5,
            lockout_window: Duration::minutes(15),
        }
    }
}

// ============================================================================
// ACTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub name: String,
    pub company: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    Register(RegistrationRequest),
    Login { email: String, password: String },
    Logout,
    DeleteAccount { confirmation: String, reason: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Registered(UserAccount),
    LoggedIn(UserAccount),
    LoggedOut,
    Deleted(DeletedAccount),
}

// ============================================================================
// STORE
// ============================================================================

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Minutes left until `until`, rounded up
fn minutes_until(now: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    let seconds = (until - now).num_seconds().max(0);
    (seconds + 59) / 60
}

#[derive(Debug, Clone)]
pub struct AuthStore {
    policy: AuthPolicy,
    users: Vec<UserAccount>,
    deleted_accounts: Vec<DeletedAccount>,
    registration_attempts: Vec<RegistrationAttempt>,
    auth_log: Vec<AuthLogEntry>,

    /// Recent failed logins per email (oldest first)
    failed_logins: HashMap<String, Vec<DateTime<Utc>>>,

    /// Lockout expiry per email
    lockouts: HashMap<String, DateTime<Utc>>,

    /// Signed-in user id
    session: Option<String>,
}

impl AuthStore {
    pub fn new(policy: AuthPolicy, deleted_accounts: Vec<DeletedAccount>) -> Self {
        AuthStore {
            policy,
            users: Vec::new(),
            deleted_accounts,
            registration_attempts: Vec::new(),
            auth_log: Vec::new(),
            failed_logins: HashMap::new(),
            lockouts: HashMap::new(),
            session: None,
        }
    }

    /// Default policy with the mock deleted-account list
    pub fn with_defaults() -> Self {
        AuthStore::new(AuthPolicy::default(), crate::seed::seed_deleted_accounts())
    }

    pub fn policy(&self) -> AuthPolicy {
        self.policy
    }

    pub fn users(&self) -> &[UserAccount] {
        &self.users
    }

    pub fn registered_emails(&self) -> Vec<&str> {
        self.users.iter().map(|u| u.email.as_str()).collect()
    }

    pub fn deleted_accounts(&self) -> &[DeletedAccount] {
        &self.deleted_accounts
    }

    pub fn registration_attempts(&self) -> &[RegistrationAttempt] {
        &self.registration_attempts
    }

    pub fn auth_log(&self) -> &[AuthLogEntry] {
        &self.auth_log
    }

    pub fn current_user(&self) -> Option<&UserAccount> {
        let id = self.session.as_deref()?;
        self.users.iter().find(|u| u.id == id)
    }

    pub fn is_deleted(&self, email: &str) -> bool {
        let email = normalize_email(email);
        self.deleted_accounts.iter().any(|d| normalize_email(&d.email) == email)
    }

    fn find_user(&self, email: &str) -> Option<&UserAccount> {
        self.users.iter().find(|u| u.email == email)
    }

    fn log(&mut self, now: DateTime<Utc>, email: &str, kind: AuthEventKind, detail: Option<String>) {
        self.auth_log.push(AuthLogEntry {
            event_id: uuid::Uuid::new_v4().to_string(),
            at: now,
            email: email.to_string(),
            kind,
            detail,
        });
    }

    fn record_attempt(&mut self, now: DateTime<Utc>, email: &str, blocked: bool, reason: Option<&str>) {
        self.registration_attempts.push(RegistrationAttempt {
            email: email.to_string(),
            at: now,
            blocked,
            reason: reason.map(str::to_string),
        });
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    pub fn register(&mut self, request: RegistrationRequest, now: DateTime<Utc>) -> Result<UserAccount, AuthError> {
        validation::validate_registration(
            &request.name,
            &request.company,
            &request.email,
            &request.password,
            &request.confirm_password,
        )?;

        let email = normalize_email(&request.email);

        if self.is_deleted(&email) {
            tracing::warn!(email = %email, "registration blocked: deleted account");
            self.record_attempt(now, &email, true, Some("deleted account"));
            self.log(now, &email, AuthEventKind::RegistrationBlocked, Some("deleted account".to_string()));
            return Err(AuthError::AccountDeleted { email });
        }

        if self.find_user(&email).is_some() {
            tracing::warn!(email = %email, "registration blocked: email taken");
            self.record_attempt(now, &email, true, Some("email already registered"));
            self.log(now, &email, AuthEventKind::RegistrationBlocked, Some("email already registered".to_string()));
            return Err(AuthError::EmailTaken);
        }

        let salt = uuid::Uuid::new_v4().simple().to_string();
        let user = UserAccount {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            company: request.company.trim().to_string(),
            password_hash: hash_password(&salt, &request.password),
            salt,
            email: email.clone(),
            created_at: now,
        };

        self.users.push(user.clone());
        self.record_attempt(now, &email, false, None);
        self.log(now, &email, AuthEventKind::Registered, None);
        self.session = Some(user.id.clone());

        tracing::info!(email = %email, "user registered");
        Ok(user)
    }

    // ------------------------------------------------------------------------
    // Login / lockout
    // ------------------------------------------------------------------------

    /// Recent failures for `email` inside the policy window
    pub fn recent_failures(&self, email: &str, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.policy.lockout_window;
        self.failed_logins
            .get(&normalize_email(email))
            .map(|times| times.iter().filter(|t| **t > cutoff).count())
            .unwrap_or(0)
    }

    /// Remaining lockout in minutes, if `email` is locked at `now`
    pub fn lockout_remaining(&self, email: &str, now: DateTime<Utc>) -> Option<i64> {
        self.lockouts
            .get(&normalize_email(email))
            .filter(|until| **until > now)
            .map(|until| minutes_until(now, *until))
    }

    /// Drop failures older than the window and lockouts that have ended
    fn prune_expired(&mut self, now: DateTime<Utc>) {
        let cutoff = now - self.policy.lockout_window;
        self.failed_logins.retain(|_, failures| {
            failures.retain(|t| *t > cutoff);
            !failures.is_empty()
        });
        self.lockouts.retain(|_, until| *until > now);
    }

    fn record_failure(&mut self, email: &str, now: DateTime<Utc>) -> AuthError {
        self.prune_expired(now);
        let failures = self.failed_logins.entry(email.to_string()).or_default();
        failures.push(now);
        let count = failures.len() as u32;

        self.log(now, email, AuthEventKind::LoginFailed, None);

        if count >= self.policy.lockout_threshold {
            self.failed_logins.remove(email);
            self.lockouts.insert(email.to_string(), now + self.policy.lockout_window);
            tracing::warn!(email = %email, failures = count, "account locked");
            self.log(now, email, AuthEventKind::LockedOut, Some(format!("{} failed attempts", count)));
        }

        AuthError::InvalidCredentials {
            attempts_remaining: self.policy.lockout_threshold.saturating_sub(count),
        }
    }

    pub fn login(&mut self, email: &str, password: &str, now: DateTime<Utc>) -> Result<UserAccount, AuthError> {
        validation::validate_login(email, password)?;
        let email = normalize_email(email);
        self.prune_expired(now);

        if let Some(remaining_minutes) = self.lockout_remaining(&email, now) {
            self.log(now, &email, AuthEventKind::LoginFailed, Some("locked".to_string()));
            return Err(AuthError::Locked { remaining_minutes });
        }

        if self.is_deleted(&email) {
            self.log(now, &email, AuthEventKind::LoginFailed, Some("deleted account".to_string()));
            return Err(AuthError::AccountDeleted { email });
        }

        let verified = self
            .find_user(&email)
            .filter(|user| user.verify_password(password))
            .cloned();
        let Some(user) = verified else {
            return Err(self.record_failure(&email, now));
        };

        self.failed_logins.remove(&email);
        self.session = Some(user.id.clone());
        self.log(now, &email, AuthEventKind::LoginSucceeded, None);
        tracing::info!(email = %email, "login succeeded");
        Ok(user)
    }

    pub fn logout(&mut self, now: DateTime<Utc>) -> Result<(), AuthError> {
        let user = self.current_user().cloned().ok_or(AuthError::NotSignedIn)?;
        self.session = None;
        self.log(now, &user.email, AuthEventKind::LoggedOut, None);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Account deletion
    // ------------------------------------------------------------------------

    /// Delete the signed-in account; its email can never register again
    pub fn delete_account(
        &mut self,
        confirmation: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<DeletedAccount, AuthError> {
        let user = self.current_user().cloned().ok_or(AuthError::NotSignedIn)?;
        validation::validate_deletion_confirmation(confirmation)?;

        let deleted = DeletedAccount {
            email: user.email.clone(),
            deleted_at: now,
            reason,
        };

        self.users.retain(|u| u.id != user.id);
        self.deleted_accounts.push(deleted.clone());
        self.session = None;
        self.log(now, &user.email, AuthEventKind::AccountDeleted, deleted.reason.clone());

        tracing::info!(email = %user.email, "account deleted");
        Ok(deleted)
    }

    // ------------------------------------------------------------------------
    // Reducer entry points
    // ------------------------------------------------------------------------

    pub fn dispatch(&mut self, action: AuthAction, now: DateTime<Utc>) -> Result<AuthOutcome, AuthError> {
        match action {
            AuthAction::Register(request) => self.register(request, now).map(AuthOutcome::Registered),
            AuthAction::Login { email, password } => self.login(&email, &password, now).map(AuthOutcome::LoggedIn),
            AuthAction::Logout => self.logout(now).map(|_| AuthOutcome::LoggedOut),
            AuthAction::DeleteAccount { confirmation, reason } => {
                self.delete_account(&confirmation, reason, now).map(AuthOutcome::Deleted)
            }
        }
    }

    /// `(state, action) -> state` form of [`AuthStore::dispatch`]
    pub fn reduce(mut self, action: AuthAction, now: DateTime<Utc>) -> (Self, Result<AuthOutcome, AuthError>) {
        let outcome = self.dispatch(action, now);
        (self, outcome)
    }
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================
