use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;

use passgate_api::app::{build_app, AppServices};
use passgate_api::config::AppConfig;
use passgate_api::middleware::AuthState;
use passgate_auth::{PasswordHasher, TokenIssuer};
use passgate_core::SystemClock;
use passgate_events::{EventBus, InMemoryEventBus};
use passgate_identity::{
    AuthService, CodeStore, ExpiredSessionReaper, IdentityStore, NotificationSender, SessionStore,
    UserCreated, UserService, VerificationService,
};
use passgate_infra::{
    HttpNotificationSender, InMemoryCodeStore, InMemoryIdentityStore, InMemorySessionStore,
    LogNotificationSender, PostgresCodeStore, PostgresIdentityStore, PostgresSessionStore,
};

#[tokio::main]
async fn main() {
    passgate_observability::init("passgate-api");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration is invalid, refusing to start");
            std::process::exit(1);
        }
    };

    let tokens = match TokenIssuer::new(&config.token_config()) {
        Ok(issuer) => Arc::new(issuer),
        Err(e) => {
            tracing::error!(error = %e, "token key material is invalid, refusing to start");
            std::process::exit(1);
        }
    };

    let (users, sessions, codes) = build_stores(&config).await;

    let hasher = Arc::new(PasswordHasher::new(config.bcrypt.clone()));
    let clock = Arc::new(SystemClock);
    let notifier = build_notifier(&config);

    let bus = Arc::new(InMemoryEventBus::<UserCreated>::default());
    spawn_signup_listener(&bus);

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
            users,
            codes,
            notifier,
            hasher,
            clock.clone(),
            ChronoDuration::minutes(config.verification_code_ttl_minutes),
            ChronoDuration::minutes(config.reset_code_ttl_minutes),
        ),
        application_name: config.application_name.clone(),
    });

    let reaper = ExpiredSessionReaper::new(
        sessions,
        clock,
        Duration::from_secs(config.reaper_interval_secs),
    );
    tokio::spawn(reaper.run());

    let app = build_app(
        services,
        AuthState {
            tokens,
        },
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    tracing::info!(addr = %config.bind_addr, "listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server exited");
        std::process::exit(1);
    }
}

async fn build_stores(
    config: &AppConfig,
) -> (
    Arc<dyn IdentityStore>,
    Arc<dyn SessionStore>,
    Arc<dyn CodeStore>,
) {
    match &config.database_url {
        Some(url) => {
            let pool = match sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
            {
                Ok(pool) => Arc::new(pool),
                Err(e) => {
                    tracing::error!(error = %e, "failed to connect to the database");
                    std::process::exit(1);
                }
            };
            (
                Arc::new(PostgresIdentityStore::new(pool.clone())),
                Arc::new(PostgresSessionStore::new(pool.clone())),
                Arc::new(PostgresCodeStore::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores");
            (
                Arc::new(InMemoryIdentityStore::new()),
                Arc::new(InMemorySessionStore::new()),
                Arc::new(InMemoryCodeStore::new()),
            )
        }
    }
}

fn build_notifier(config: &AppConfig) -> Arc<dyn NotificationSender> {
    match &config.email_api_key {
        Some(key) => Arc::new(HttpNotificationSender::new(
            key.clone(),
            config.from_email.clone(),
        )),
        None => {
            tracing::warn!("RESEND_API_KEY not set; emails will be logged, not sent");
            Arc::new(LogNotificationSender)
        }
    }
}

fn spawn_signup_listener(bus: &Arc<InMemoryEventBus<UserCreated>>) {
    let subscription = bus.subscribe();
    std::thread::spawn(move || {
        while let Ok(event) = subscription.recv() {
            tracing::info!(
                user_id = %event.user_id,
                email = %event.email,
                full_name = %event.full_name,
                "user created"
            );
        }
    });
}
