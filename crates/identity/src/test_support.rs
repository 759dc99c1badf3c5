//! In-memory doubles and a wired-up world for service tests.
//!
//! Kept inside the crate so the services can be tested without pulling in the
//! real store backends, which depend on this crate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use passgate_auth::{BcryptSetting, PasswordHasher, TokenConfig, TokenIssuer};
use passgate_core::{Clock, CodeId, DeviceId, SessionId, UserId};

use crate::service::AuthService;
use crate::store::{
    CodeStore, EmailMessage, IdentityStore, NotificationSender, SessionStore, StoreError,
    StoreResult,
};
use crate::user::{CodeRecord, Session, User};
use crate::verification::VerificationService;

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl MemoryUsers {
    pub async fn get(&self, id: UserId) -> Option<User> {
        self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned()
    }
}

#[async_trait]
impl IdentityStore for MemoryUsers {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: &User) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(user.email.clone()));
        }
        rows.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|u| u.id == user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }
}

#[derive(Default)]
pub struct MemorySessions {
    rows: Mutex<Vec<Session>>,
}

impl MemorySessions {
    pub async fn dump(&self) -> Vec<Session> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessions {
    async fn create(&self, session: &Session) -> StoreResult<()> {
        self.rows.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.token == token)
            .cloned())
    }

    async fn find_by_id(&self, id: SessionId) -> StoreResult<Option<Session>> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn list_by_user(&self, user_id: UserId) -> StoreResult<Vec<Session>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: SessionId) -> StoreResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok((before - rows.len()) as u64)
    }

    async fn delete_by_user_and_device(
        &self,
        user_id: UserId,
        device_id: DeviceId,
    ) -> StoreResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| !(s.user_id == user_id && s.device_id == device_id));
        Ok((before - rows.len()) as u64)
    }

    async fn delete_all_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| s.expires_at > now);
        Ok((before - rows.len()) as u64)
    }
}

#[derive(Default)]
pub struct MemoryCodes {
    rows: Mutex<Vec<CodeRecord>>,
}

impl MemoryCodes {
    pub async fn dump(&self) -> Vec<CodeRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeStore for MemoryCodes {
    async fn create(&self, record: &CodeRecord) -> StoreResult<()> {
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CodeId) -> StoreResult<Option<CodeRecord>> {
        Ok(self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }
}

/// Records every message; can be told to fail the next delivery.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<EmailMessage>>,
    fail_next: AtomicBool,
}

impl RecordingSender {
    pub fn dump(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, message: EmailMessage) -> anyhow::Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            anyhow::bail!("simulated delivery failure");
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

fn test_key_pems() -> &'static (String, String) {
    static KEYS: OnceLock<(String, String)> = OnceLock::new();
    KEYS.get_or_init(|| {
        use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
        use rsa::RsaPrivateKey;

        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, 2048).expect("rsa keygen");
        let public = private.to_public_key();
        (
            private
                .to_pkcs1_pem(LineEnding::LF)
                .expect("private pem")
                .to_string(),
            public.to_pkcs1_pem(LineEnding::LF).expect("public pem"),
        )
    })
}

/// Everything a service test needs, pre-wired over the in-memory doubles.
pub struct TestWorld {
    pub users: Arc<MemoryUsers>,
    pub sessions: Arc<MemorySessions>,
    pub codes: Arc<MemoryCodes>,
    pub outbox: Arc<RecordingSender>,
    pub hasher: Arc<PasswordHasher>,
    pub tokens: Arc<TokenIssuer>,
    clock: Arc<ManualClock>,
}

impl TestWorld {
    pub fn new() -> Self {
        let (private_key_pem, public_key_pem) = test_key_pems().clone();
        let tokens = TokenIssuer::new(&TokenConfig {
            issuer: "passgate".to_string(),
            audience: "passgate-clients".to_string(),
            access_ttl_hours: 1,
            refresh_ttl_hours: 720,
            private_key_pem,
            public_key_pem,
        })
        .expect("test token issuer");

        Self {
            users: Arc::new(MemoryUsers::default()),
            sessions: Arc::new(MemorySessions::default()),
            codes: Arc::new(MemoryCodes::default()),
            outbox: Arc::new(RecordingSender::default()),
            hasher: Arc::new(fixtures::test_hasher()),
            tokens: Arc::new(tokens),
            clock: Arc::new(ManualClock::starting_at(Utc::now())),
        }
    }

    /// Stamps the record with the world clock so wall-clock skew between
    /// fixture construction and the frozen clock cannot affect ordering
    /// comparisons.
    pub async fn seed_user(&self, mut user: User) -> User {
        user.created_at = self.now();
        user.updated_at = self.now();
        self.users.create(&user).await.expect("seed user");
        user
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(
            self.users.clone(),
            self.sessions.clone(),
            self.hasher.clone(),
            self.tokens.clone(),
            self.clock.clone(),
        )
    }

    pub fn verification(&self) -> VerificationService {
        VerificationService::new(
            self.users.clone(),
            self.codes.clone(),
            self.outbox.clone(),
            self.hasher.clone(),
            self.clock.clone(),
            self.verification_ttl(),
            self.reset_ttl(),
        )
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn clock(&self) -> Arc<ManualClock> {
        self.clock.clone()
    }

    pub fn verification_ttl(&self) -> Duration {
        Duration::minutes(10)
    }

    pub fn reset_ttl(&self) -> Duration {
        Duration::minutes(15)
    }
}

pub mod fixtures {
    use super::*;
    use passgate_auth::Role;

    /// Minimum bcrypt cost keeps the hashing fast under test.
    pub fn test_hasher() -> PasswordHasher {
        PasswordHasher::new(BcryptSetting::Cost(4))
    }

    fn base_user(email: &str, password: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password_hash: test_hasher().hash(password).expect("fixture hash"),
            role: Role::User,
            is_active: false,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// A verified, active account ready to log in.
    pub fn active_user(email: &str, password: &str) -> User {
        let mut user = base_user(email, password);
        user.is_active = true;
        user.is_email_verified = true;
        user
    }

    /// A fresh signup: inactive until email verification completes.
    pub fn unverified_user(email: &str, password: &str) -> User {
        base_user(email, password)
    }
}
