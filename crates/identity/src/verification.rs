//! Email-verification and password-reset code workflows.
//!
//! Both flows share one shape: `request_*` persists a six-digit code with a
//! TTL and dispatches it by email, returning only the record id; `verify_*` /
//! `reset_*` consume the code. The four consumption failure checks run in a
//! fixed order — absent record, goal state already reached, code mismatch,
//! expiry — so the expiry check can never leak whether a code was correct.

use std::sync::Arc;

use chrono::Duration;

use passgate_auth::{generate_six_digit_code, PasswordHasher};
use passgate_core::{AuthError, AuthResult, Clock, CodeId};

use crate::store::{CodeStore, EmailMessage, IdentityStore, NotificationSender};
use crate::user::{CodePurpose, CodeRecord, User};

/// Orchestrates both code flows against the identity and code stores.
pub struct VerificationService {
    users: Arc<dyn IdentityStore>,
    codes: Arc<dyn CodeStore>,
    notifier: Arc<dyn NotificationSender>,
    hasher: Arc<PasswordHasher>,
    clock: Arc<dyn Clock>,
    verification_ttl: Duration,
    reset_ttl: Duration,
}

impl VerificationService {
    pub fn new(
        users: Arc<dyn IdentityStore>,
        codes: Arc<dyn CodeStore>,
        notifier: Arc<dyn NotificationSender>,
        hasher: Arc<PasswordHasher>,
        clock: Arc<dyn Clock>,
        verification_ttl: Duration,
        reset_ttl: Duration,
    ) -> Self {
        Self {
            users,
            codes,
            notifier,
            hasher,
            clock,
            verification_ttl,
            reset_ttl,
        }
    }

    /// Issue an email-verification code. Returns the record id, never the code.
    pub async fn request_email_verification(&self, email: &str) -> AuthResult<CodeId> {
        let user = self.find_user_by_email(email).await?;
        let record = self
            .issue_code(&user, CodePurpose::EmailVerification, self.verification_ttl)
            .await?;

        self.dispatch(
            &user,
            "Verify your email address",
            format!(
                "Hi {},\n\nYour verification code is {}. It expires in {} minutes.",
                user.first_name,
                record.code,
                self.verification_ttl.num_minutes()
            ),
        )
        .await;

        Ok(record.id)
    }

    /// Consume a verification code: activates the account and marks the email
    /// verified.
    pub async fn verify_email(&self, record_id: CodeId, supplied_code: &str) -> AuthResult<()> {
        let record = self
            .find_code(record_id, CodePurpose::EmailVerification)
            .await?;
        let mut user = self.find_code_owner(&record).await?;

        if user.is_email_verified {
            return Err(AuthError::AlreadyVerified);
        }
        if supplied_code != record.code {
            return Err(AuthError::CodeMismatch);
        }
        if record.is_expired(self.clock.now()) {
            return Err(AuthError::CodeExpired);
        }

        user.is_email_verified = true;
        user.is_active = true;
        user.updated_at = self.clock.now();
        self.users.update(&user).await.map_err(|err| {
            tracing::error!(error = %err, user_id = %user.id, "failed to persist email verification");
            AuthError::Internal
        })
    }

    /// Issue a password-reset code. Returns the record id, never the code.
    pub async fn request_password_reset(&self, email: &str) -> AuthResult<CodeId> {
        let user = self.find_user_by_email(email).await?;
        let record = self
            .issue_code(&user, CodePurpose::PasswordReset, self.reset_ttl)
            .await?;

        self.dispatch(
            &user,
            "Reset your password",
            format!(
                "Hi {},\n\nYour password reset code is {}. It expires in {} minutes.",
                user.first_name,
                record.code,
                self.reset_ttl.num_minutes()
            ),
        )
        .await;

        Ok(record.id)
    }

    /// Consume a reset code and store the new hashed secret.
    pub async fn reset_password(
        &self,
        record_id: CodeId,
        supplied_code: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let record = self.find_code(record_id, CodePurpose::PasswordReset).await?;
        let mut user = self.find_code_owner(&record).await?;

        // The identity mutating after the code was issued is the implicit
        // "already used" signal; consumed codes are never deleted.
        if user.updated_at > record.created_at {
            return Err(AuthError::AlreadyUsed);
        }
        if supplied_code != record.code {
            return Err(AuthError::CodeMismatch);
        }
        if record.is_expired(self.clock.now()) {
            return Err(AuthError::CodeExpired);
        }

        user.password_hash = self.hasher.hash(new_password)?;
        user.updated_at = self.clock.now();
        self.users.update(&user).await.map_err(|err| {
            tracing::error!(error = %err, user_id = %user.id, "failed to persist password reset");
            AuthError::Internal
        })
    }

    async fn find_user_by_email(&self, email: &str) -> AuthResult<User> {
        match self.users.find_by_email(email).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AuthError::NotFound),
            Err(err) => {
                tracing::error!(error = %err, "user lookup failed during code request");
                Err(AuthError::NotFound)
            }
        }
    }

    async fn issue_code(
        &self,
        user: &User,
        purpose: CodePurpose,
        ttl: Duration,
    ) -> AuthResult<CodeRecord> {
        let now = self.clock.now();
        let record = CodeRecord {
            id: CodeId::new(),
            user_id: user.id,
            code: generate_six_digit_code(),
            purpose,
            created_at: now,
            expires_at: now + ttl,
        };

        self.codes.create(&record).await.map_err(|err| {
            tracing::error!(error = %err, user_id = %user.id, "failed to persist code record");
            AuthError::Internal
        })?;

        Ok(record)
    }

    /// Fire-and-forget delivery: failures are logged and swallowed so the
    /// requester cannot tell whether the email went out.
    async fn dispatch(&self, user: &User, subject: &str, body: String) {
        let message = EmailMessage {
            to: user.email.clone(),
            subject: subject.to_string(),
            body,
        };
        if let Err(err) = self.notifier.send(message).await {
            tracing::warn!(error = %err, user_id = %user.id, "notification delivery failed");
        }
    }

    async fn find_code(&self, record_id: CodeId, purpose: CodePurpose) -> AuthResult<CodeRecord> {
        match self.codes.find_by_id(record_id).await {
            // A record from the other flow is treated as absent, so reset ids
            // cannot be replayed against the verification endpoint.
            Ok(Some(record)) if record.purpose == purpose => Ok(record),
            Ok(_) => Err(AuthError::NotFound),
            Err(err) => {
                tracing::error!(error = %err, "code lookup failed");
                Err(AuthError::NotFound)
            }
        }
    }

    async fn find_code_owner(&self, record: &CodeRecord) -> AuthResult<User> {
        match self.users.find_by_id(record.user_id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(AuthError::NotFound),
            Err(err) => {
                tracing::error!(error = %err, user_id = %record.user_id, "code owner lookup failed");
                Err(AuthError::NotFound)
            }
        }
    }
}
