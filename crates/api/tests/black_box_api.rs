use std::sync::{Arc, OnceLock};

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding};
use rsa::RsaPrivateKey;
use serde_json::json;

use passgate_api::app::{build_app, AppServices};
use passgate_api::middleware::AuthState;
use passgate_auth::{BcryptSetting, PasswordHasher, Role, TokenConfig, TokenIssuer};
use passgate_core::{SystemClock, UserId};
use passgate_events::InMemoryEventBus;
use passgate_identity::{
    AuthService, IdentityStore, UserCreated, UserService, VerificationService,
};
use passgate_infra::{
    InMemoryCodeStore, InMemoryIdentityStore, InMemorySessionStore, LogNotificationSender,
};

fn test_key_pems() -> &'static (String, String) {
    static KEYS: OnceLock<(String, String)> = OnceLock::new();
    KEYS.get_or_init(|| {
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

struct TestServer {
    base_url: String,
    tokens: Arc<TokenIssuer>,
    users: Arc<InMemoryIdentityStore>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, wired over the in-memory stores and bound to
        // an ephemeral port.
        let (private_key_pem, public_key_pem) = test_key_pems().clone();
        let tokens = Arc::new(
            TokenIssuer::new(&TokenConfig {
                issuer: "passgate".to_string(),
                audience: "passgate-clients".to_string(),
                access_ttl_hours: 1,
                refresh_ttl_hours: 720,
                private_key_pem,
                public_key_pem,
            })
            .expect("token issuer"),
        );

        let users = Arc::new(InMemoryIdentityStore::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let codes = Arc::new(InMemoryCodeStore::new());
        let hasher = Arc::new(PasswordHasher::new(BcryptSetting::Cost(4)));
        let clock = Arc::new(SystemClock);
        let bus = Arc::new(InMemoryEventBus::<UserCreated>::default());

        let services = Arc::new(AppServices {
            auth: AuthService::new(
                users.clone(),
                sessions.clone(),
                hasher.clone(),
                tokens.clone(),
                clock.clone(),
            ),
            users: UserService::new(users.clone(), hasher.clone(), bus, clock.clone()),
            verification: VerificationService::new(
                users.clone(),
                codes,
                Arc::new(LogNotificationSender),
                hasher,
                clock,
                ChronoDuration::minutes(10),
                ChronoDuration::minutes(15),
            ),
            application_name: "passgate-test".to_string(),
        });

        let app = build_app(
            services,
            AuthState {
                tokens: tokens.clone(),
            },
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            tokens,
            users,
            handle,
        }
    }

    /// Sign up over HTTP, then flip the account active directly in the store
    /// (the verify-email flow has its own tests).
    async fn signup_active_user(&self, client: &reqwest::Client, email: &str, password: &str) {
        let res = client
            .post(format!("{}/users/signup", self.base_url))
            .json(&json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let mut user = self
            .users
            .find_by_email(email)
            .await
            .unwrap()
            .expect("signed-up user");
        user.is_active = true;
        user.is_email_verified = true;
        self.users.update(&user).await.unwrap();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn guarded_routes_reject_missing_and_malformed_bearers() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/auth/sessions", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], "Unauthorized");

    for bad in ["Bearer ", "Bearer not-a-jwt", "Basic abc"] {
        let res = client
            .get(format!("{}/auth/me", srv.base_url))
            .header("authorization", bad)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "accepted {bad:?}");
    }
}

#[tokio::test]
async fn expired_access_token_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Signed with the live key but already past its expiry.
    let stale = srv
        .tokens
        .issue_access_token(UserId::new(), Role::User, Utc::now() - ChronoDuration::hours(2))
        .unwrap();

    let res = client
        .get(format!("{}/auth/sessions", srv.base_url))
        .bearer_auth(&stale.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_round_trip_exposes_the_camel_case_contract() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    srv.signup_active_user(&client, "ada@example.com", "Sup3r$ecret")
        .await;

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({
            "email": "ada@example.com",
            "password": "Sup3r$ecret",
            "deviceName": "laptop",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    let auth = &body["auth"];
    assert!(auth["accessToken"].as_str().is_some());
    assert!(auth["refreshToken"].as_str().is_some());
    let access_expires_in = auth["accessTokenExpiresIn"].as_i64().unwrap();
    assert!((3590..=3600).contains(&access_expires_in));
    assert!(auth["refreshTokenExpiresIn"].as_i64().unwrap() > access_expires_in);
    assert_eq!(auth["deviceName"], "laptop");

    let user = &body["user"];
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["firstName"], "Ada");
    assert_eq!(user["isActive"], true);
    assert!(user.get("passwordHash").is_none());

    // The issued access token opens the guarded routes.
    let token = auth["accessToken"].as_str().unwrap();
    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: serde_json::Value = res.json().await.unwrap();
    assert_eq!(me["email"], "ada@example.com");

    let res = client
        .get(format!("{}/auth/sessions", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let sessions: serde_json::Value = res.json().await.unwrap();
    assert_eq!(sessions["sessions"].as_array().unwrap().len(), 1);
    assert_eq!(sessions["sessions"][0]["deviceName"], "laptop");
}

#[tokio::test]
async fn inactive_account_login_is_locked() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Signup without the activation step: the account stays unverified.
    let res = client
        .post(format!("{}/users/signup", srv.base_url))
        .json(&json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "new@example.com",
            "password": "Sup3r$ecret",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "new@example.com", "password": "Sup3r$ecret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::LOCKED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], "AccountInactive");
}

#[tokio::test]
async fn refresh_header_rotates_the_session() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    srv.signup_active_user(&client, "ada@example.com", "Sup3r$ecret")
        .await;

    let login: serde_json::Value = client
        .post(format!("{}/auth/login", srv.base_url))
        .json(&json!({ "email": "ada@example.com", "password": "Sup3r$ecret" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let old_refresh = login["auth"]["refreshToken"].as_str().unwrap().to_string();

    // Refresh without the header is unauthorized.
    let res = client
        .post(format!("{}/auth/refresh-token", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/auth/refresh-token", srv.base_url))
        .header("x-refresh-token", &old_refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let rotated: serde_json::Value = res.json().await.unwrap();
    assert_ne!(rotated["refreshToken"].as_str().unwrap(), old_refresh);

    // The rotated-out token no longer works.
    let res = client
        .post(format!("{}/auth/refresh-token", srv.base_url))
        .header("x-refresh-token", &old_refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
