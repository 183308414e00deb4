use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::{HeaderName, HeaderValue, Request, Response, header};
use axum::routing::{get, patch, post};
use axum::{Router, middleware};
use folio_auth::AuthState;
use folio_db_memory::InMemoryStorage;
use folio_db_postgres::PostgresStorage;
use folio_storage::{DynCache, DynStorage};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::audit::AuditLogService;
use crate::cache::create_cache_backend;
use crate::config::{AppConfig, CacheConfig, Environment, StorageBackend};
use crate::error::expose_internal_errors;
use crate::handlers;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: DynStorage,
    pub cache: DynCache,
    pub auth: AuthState,
    pub audit: AuditLogService,
    pub cache_config: Arc<CacheConfig>,
    pub environment: Environment,
}

impl AppState {
    pub fn new(cfg: &AppConfig, storage: DynStorage, cache: DynCache) -> Self {
        Self {
            auth: AuthState::new(&cfg.auth, cache.clone()),
            audit: AuditLogService::new(storage.clone(), cache.clone()),
            cache_config: Arc::new(cfg.cache.clone()),
            environment: cfg.server.environment,
            storage,
            cache,
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh-token", patch(handlers::auth::refresh_token))
        .route("/auth/user-profile", get(handlers::auth::user_profile))
        .route("/auth/logout", post(handlers::auth::logout))
        .route(
            "/profile",
            get(handlers::profile::get_profile)
                .post(handlers::profile::create_profile)
                .put(handlers::profile::update_profile),
        )
        .route(
            "/project",
            get(handlers::project::list_own_projects).post(handlers::project::create_project),
        )
        .route(
            "/project/{id}",
            get(handlers::project::get_project)
                .put(handlers::project::update_project)
                .delete(handlers::project::delete_project),
        )
        .route(
            "/project/public/{user_id}",
            get(handlers::project::list_public_projects),
        )
        .route(
            "/project/private/{user_id}",
            get(handlers::project::list_private_projects),
        )
        .route("/auditlog", get(handlers::audit_log::list_audit_logs))
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin else {
        return CorsLayer::permissive();
    };
    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(e) => {
            tracing::warn!(error = %e, "invalid server.cors_origin, allowing any origin");
            CorsLayer::permissive()
        }
    }
}

pub fn build_app(cfg: &AppConfig, state: AppState) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        .route("/healthz", get(handlers::health::healthz))
        .route("/readyz", get(handlers::health::readyz))
        .nest("/api/v1", api_routes())
        .fallback(handlers::not_found)
        .with_state(state)
        // Middleware stack (outermost last): request id -> trace -> cors/headers -> errors -> body limit
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(
            cfg.server.environment,
            expose_internal_errors,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors_layer(cfg.server.cors_origin.as_deref()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .headers()
                        .get(&REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(|res: &Response<_>, latency: Duration, span: &tracing::Span| {
                    span.record("http.status_code", tracing::field::display(res.status().as_u16()));
                    tracing::info!(
                        http.status = %res.status().as_u16(),
                        elapsed_ms = %latency.as_millis(),
                        "request handled"
                    );
                }),
        )
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
}

pub struct FolioServer {
    addr: SocketAddr,
    app: Router,
    postgres: Option<PostgresStorage>,
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Connects the store and the cache and assembles the router.
    pub async fn build(self) -> anyhow::Result<FolioServer> {
        let (storage, postgres): (DynStorage, Option<PostgresStorage>) =
            match self.config.storage.backend {
                StorageBackend::Postgres => {
                    let pg_config = self.config.storage.postgres.to_backend_config();
                    let pg = PostgresStorage::connect(&pg_config).await?;
                    (Arc::new(pg.clone()), Some(pg))
                }
                StorageBackend::Memory => {
                    tracing::warn!("using in-memory storage, data is lost on restart");
                    (Arc::new(InMemoryStorage::new()), None)
                }
            };
        let cache = create_cache_backend(&self.config.redis).await;

        let state = AppState::new(&self.config, storage, cache);
        let app = build_app(&self.config, state);

        Ok(FolioServer {
            addr: self.addr,
            app,
            postgres,
        })
    }
}

impl FolioServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        if let Some(pg) = self.postgres {
            pg.close().await;
            tracing::info!("PostgreSQL pool closed");
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
