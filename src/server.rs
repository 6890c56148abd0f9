use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::auth::{hash_password, AuthError, JwtAuthority, TokenVerifier};
use crate::config::AppConfig;
use crate::database::{DocumentStore, User};
use crate::handlers::protected::resource::{self, ResourceName};
use crate::handlers::public::{auth, files, health};
use crate::middleware::require_bearer;
use crate::services::ResourceService;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10MB

/// Shared handler state; configuration is immutable once the server is built
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<DocumentStore>,
    pub resources: ResourceService,
    pub jwt: Option<Arc<JwtAuthority>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AuthError> {
        let jwt = config
            .auth
            .as_ref()
            .map(JwtAuthority::new)
            .transpose()?
            .map(Arc::new);
        let store = Arc::new(DocumentStore::new(&config.storage.database_path));

        Ok(Self {
            config: Arc::new(config),
            resources: ResourceService::new(store.clone()),
            store,
            jwt,
        })
    }
}

/// Create configured folders and, on first run, the seeded document
pub async fn bootstrap(state: &AppState) -> anyhow::Result<()> {
    let storage = &state.config.storage;
    for dir in [&storage.public_dir, &storage.uploads_dir].into_iter().flatten() {
        ensure_dir(dir).await?;
    }
    if let Some(parent) = storage.database_path.parent() {
        ensure_dir(parent).await?;
    }

    if state.store.exists().await {
        info!("Using document {}", state.store.path().display());
        return Ok(());
    }

    // Login and register need a users collection, even an empty one
    let users = if state.config.requires_authorization() {
        let mut users = Vec::new();
        if let Some((username, password)) = state.config.admin_credentials() {
            users.push(User {
                username: username.to_string(),
                password: hash_password(password)?,
            });
        }
        Some(users)
    } else {
        None
    };
    state
        .store
        .create_initial(&state.config.resources, users)
        .await
        .context("failed to create initial document")?;
    Ok(())
}

async fn ensure_dir(dir: &Path) -> anyhow::Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health))
        .merge(resource_routes(&state));

    if state.config.requires_authorization() {
        router = router.merge(auth_routes());
    }
    if let Some(dir) = &state.config.storage.uploads_dir {
        router = router.merge(upload_routes(dir));
    }

    let mut router = router.with_state(state.clone());
    if let Some(dir) = &state.config.storage.public_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    // Global middleware
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

/// Mounted only when authorization is required; without it there is no
/// `users` collection for `/register` to write to
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
}

fn upload_routes(dir: &Path) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(files::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .nest_service("/files", ServeDir::new(dir))
}

/// Six routes per declared resource, nested under the API prefix
fn resource_routes(state: &AppState) -> Router<AppState> {
    let mut api = Router::new();
    for name in &state.config.resources {
        let routes = Router::new()
            .route(
                &format!("/{}", name),
                get(resource::list)
                    .post(resource::create)
                    .delete(resource::clear),
            )
            .route(
                &format!("/{}/:id", name),
                get(resource::show)
                    .put(resource::replace)
                    .patch(resource::patch)
                    .delete(resource::delete),
            )
            .layer(Extension(ResourceName(name.clone())));
        api = api.merge(routes);
    }

    // route_layer panics on a router without routes
    if let (Some(jwt), false) = (&state.jwt, state.config.resources.is_empty()) {
        let verifier: Arc<dyn TokenVerifier> = jwt.clone();
        api = api.route_layer(middleware::from_fn_with_state(verifier, require_bearer));
    }

    Router::new().nest(&state.config.api_prefix(), api)
}

/// Bootstrap, bind and serve until Ctrl-C
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::new(config).context("invalid authorization settings")?;
    bootstrap(&state).await?;

    let bind_addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(
        "jsonver listening on http://{}{} ({} resource(s), authorization {})",
        bind_addr,
        state.config.api_prefix(),
        state.config.resources.len(),
        if state.config.requires_authorization() { "on" } else { "off" }
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("jsonver stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
