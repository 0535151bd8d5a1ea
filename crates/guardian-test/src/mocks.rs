//! Mock implementations of the engine's external collaborators.
//!
//! All mocks use `std::sync::Mutex` internally so builder methods work
//! without a tokio runtime, and recording methods can be asserted from
//! sync test code.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use guardian_core::{Appeal, AppealId, Clock, Email, ProviderConfig, Timestamp};
use guardian_engine::{Notification, Notifier, NotifyError, ProviderAdapter, ProviderError};
use guardian_policy::{IdentityError, IdentityService};

/// Scripted identity service: a map from user email to approver emails.
#[derive(Debug, Default)]
pub struct MockIdentityService {
    approvers: HashMap<String, Vec<String>>,
    failing: AtomicBool,
}

impl MockIdentityService {
    /// Create an identity service that knows nobody.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user's approvers (builder style).
    #[must_use]
    pub fn with_approvers(mut self, user: &str, approvers: Vec<&str>) -> Self {
        self.approvers.insert(
            user.to_string(),
            approvers.into_iter().map(str::to_string).collect(),
        );
        self
    }

    /// Make every subsequent lookup fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityService for MockIdentityService {
    async fn get_user_approver_emails(&self, user: &Email) -> Result<Vec<String>, IdentityError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IdentityError("identity service down".to_string()));
        }
        Ok(self
            .approvers
            .get(user.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

/// Notifier that records everything it is asked to deliver.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Create a notifier with an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Messages delivered to one recipient.
    #[must_use]
    pub fn sent_to(&self, user: &str) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.user.as_str() == user)
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clear();
    }

    /// Make every subsequent delivery fail (nothing is recorded).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notifications: Vec<Notification>) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError("transport unavailable".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .extend(notifications);
        Ok(())
    }
}

/// Provider adapter that records grant/revoke calls and can be told to
/// fail either direction.
#[derive(Debug, Default)]
pub struct MockProviderAdapter {
    grants: Mutex<Vec<AppealId>>,
    revokes: Mutex<Vec<AppealId>>,
    fail_grant: AtomicBool,
    fail_revoke: AtomicBool,
}

impl MockProviderAdapter {
    /// Create an adapter that succeeds at everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appeals granted so far, in call order.
    #[must_use]
    pub fn grants(&self) -> Vec<AppealId> {
        self.grants
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Appeals revoked so far, in call order.
    #[must_use]
    pub fn revokes(&self) -> Vec<AppealId> {
        self.revokes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Make grant calls fail.
    pub fn set_fail_grant(&self, fail: bool) {
        self.fail_grant.store(fail, Ordering::SeqCst);
    }

    /// Make revoke calls fail.
    pub fn set_fail_revoke(&self, fail: bool) {
        self.fail_revoke.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProviderAdapter for MockProviderAdapter {
    async fn grant_access(
        &self,
        _provider: &ProviderConfig,
        appeal: &Appeal,
    ) -> Result<(), ProviderError> {
        if self.fail_grant.load(Ordering::SeqCst) {
            return Err(ProviderError::Adapter("grant refused".to_string()));
        }
        self.grants
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(appeal.id);
        Ok(())
    }

    async fn revoke_access(
        &self,
        _provider: &ProviderConfig,
        appeal: &Appeal,
    ) -> Result<(), ProviderError> {
        if self.fail_revoke.load(Ordering::SeqCst) {
            return Err(ProviderError::Adapter("revoke refused".to_string()));
        }
        self.revokes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(appeal.id);
        Ok(())
    }
}

/// A clock frozen at a settable instant.
#[derive(Debug)]
pub struct FrozenClock {
    now: Mutex<Timestamp>,
}

impl FrozenClock {
    /// Freeze at the given instant.
    #[must_use]
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Freeze at the current wall-clock time.
    #[must_use]
    pub fn from_now() -> Self {
        Self::at(Timestamp::now())
    }

    /// Move the frozen instant.
    pub fn set(&self, now: Timestamp) {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = now;
    }

    /// Advance the frozen instant.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut now = self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *now = Timestamp::from_datetime(now.into_inner() + duration);
    }
}

impl Default for FrozenClock {
    fn default() -> Self {
        Self::from_now()
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> Timestamp {
        *self
            .now
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
