mod auth;
mod cors;
mod error;
mod extract;
mod health;
mod not_found;
mod rate_limit;
mod reply;
mod responder;
mod session;
mod uploads;
mod webhooks;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use launchpad_auth::TokenVerifier;
use launchpad_config::{Config, UploadsConfig};
use launchpad_db::Database;
use launchpad_ratelimit::RequestLimiter;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use extract::{Id, Validate, ValidatedJson};
pub use reply::{Created, Success};
pub use responder::{ErrorBody, ErrorEnvelope, ErrorReporter, ErrorResponder, TracingReporter};
pub use webhooks::{Webhook, WebhookEvent};

/// Shared handler state
#[derive(Clone)]
struct AppState {
    database: Option<Database>,
    check_database: bool,
    webhooks: Arc<webhooks::WebhookRegistry>,
    uploads: UploadsConfig,
}

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration, reporting errors through `tracing`
    ///
    /// # Errors
    ///
    /// Returns an error if the database pool or rate limiter cannot be built
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_reporter(config, Arc::new(TracingReporter::new()))
    }

    /// Build the server with a custom error reporter
    ///
    /// # Errors
    ///
    /// Returns an error if the database pool or rate limiter cannot be built
    pub fn with_reporter(config: Config, reporter: Arc<dyn ErrorReporter>) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let database = config.database.as_ref().map(Database::connect_lazy).transpose()?;

        let state = AppState {
            database,
            check_database: config.server.health.check_database,
            webhooks: Arc::default(),
            uploads: config.uploads.clone(),
        };

        let mut app = Router::new()
            .route("/api/session", get(session::current_session))
            .route("/api/webhooks", post(webhooks::create).get(webhooks::list))
            .route("/api/webhooks/{id}", get(webhooks::fetch).delete(webhooks::remove))
            .route(
                "/api/uploads",
                post(uploads::receive).layer(DefaultBodyLimit::disable()),
            );

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, get(health::health_handler));
        }

        // Apply middleware layers (innermost first)

        // Bearer token authentication, matched routes only so unknown paths still 404
        if let Some(ref auth_config) = config.auth
            && auth_config.enabled
        {
            let verifier = Arc::new(TokenVerifier::new(&auth_config.secret));
            let public_paths: Arc<[String]> = auth_config.public_paths.clone().into();
            app = app.route_layer(axum::middleware::from_fn(move |req, next| {
                let verifier = Arc::clone(&verifier);
                let public_paths = Arc::clone(&public_paths);
                async move { auth::auth_middleware(verifier, public_paths, req, next).await }
            }));
        }

        let mut app = app
            .fallback(not_found::route_not_found)
            .method_not_allowed_fallback(not_found::route_not_found)
            .with_state(state);

        // Rate limiting
        if let Some(ref rl_config) = config.server.rate_limit {
            let limiter = RequestLimiter::new(rl_config)?;
            if limiter.is_active() {
                let limiter = Arc::new(limiter);
                let trusted_hops = config
                    .server
                    .client_ip
                    .as_ref()
                    .map_or(0, launchpad_config::ClientIpConfig::trusted_hops);
                app = app.layer(axum::middleware::from_fn(move |req, next| {
                    let limiter = Arc::clone(&limiter);
                    async move { rate_limit::rate_limit_middleware(limiter, trusted_hops, req, next).await }
                }));
            }
        }

        // CORS
        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        // Error rendering, wrapping every layer that can reject a request
        let responder = Arc::new(ErrorResponder::new(config.environment, reporter));
        app = app.layer(axum::middleware::from_fn(move |req, next| {
            let responder = Arc::clone(&responder);
            async move { error::error_layer(responder, req, next).await }
        }));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(
            listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("graceful shutdown initiated");
        })
        .await?;

        Ok(())
    }
}
