mod auth;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use parley_config::Config;
use parley_llm::{LlmState, Orchestrator, StaticContextStore};
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the backend adapter cannot be constructed
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let tools = Arc::new(parley_tools::builtin_registry(&config.tools));
        let context = Arc::new(StaticContextStore::from_config(&config.context));
        let backend = parley_llm::backend::from_config(&config.llm)?;
        let orchestrator = Orchestrator::new(backend, tools, context);

        tracing::info!(
            backend = orchestrator.backend_name(),
            model = %config.llm.default_model,
            "completion engine ready"
        );

        let llm_state = LlmState::new(orchestrator, &config.llm);

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        // Completion routes
        app = app.merge(parley_llm::llm_router(llm_state));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // Bearer token authentication
        if let Some(ref auth_config) = config.server.auth {
            let auth = Arc::new(auth::BearerAuth::new(auth_config));
            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let auth = Arc::clone(&auth);
                async move { auth::auth_middleware(auth, req, next).await }
            }));
        }

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

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
