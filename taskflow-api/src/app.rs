/// Application state and router builder
///
/// This module defines the shared application state, the authentication gate
/// and the function that assembles the Axum router.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskflow_api::{app::{build_router, AppState}, config::Config};
/// use taskflow_shared::{db::memory::MemoryStore, notify::LogNotifier, services::Services};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let services = Services::new(Arc::new(MemoryStore::seeded()), Arc::new(LogNotifier));
/// let app = build_router(AppState::new(services, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use taskflow_shared::{
    auth::{
        jwt::TokenService,
        middleware::{bearer_token, AuthContext},
    },
    error::DomainError,
    services::Services,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Domain operations over the configured store
    pub services: Services,

    /// Token service, keys built once at startup
    pub tokens: Arc<TokenService>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state, deriving the token keys from `config`
    pub fn new(services: Services, config: Config) -> Self {
        let tokens = TokenService::new(
            &config.jwt.secret,
            chrono::Duration::seconds(config.jwt.ttl_seconds),
        );
        Self {
            services,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                               # public
/// └── /api/
///     ├── /auth/register, /auth/login       # public
///     ├── /auth/me
///     ├── /users[/:id]
///     ├── /projects[/:id]
///     │   ├── /members[/:user_id]
///     │   └── /columns, /cards, /activity
///     ├── /columns[/:id]
///     ├── /column-types[/:id]
///     └── /cards[/:id]
///         ├── /move, /complete, /assign-me
///         └── /comments, /activity
/// ```
///
/// # Middleware Stack
///
/// Outermost first:
/// 1. CORS (answers preflight requests itself)
/// 2. Logging (tower-http TraceLayer)
/// 3. Authentication gate, for every route outside the public allow-list
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/me", get(routes::auth::me));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route(
            "/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        );

    let project_routes = Router::new()
        .route(
            "/",
            post(routes::boards::create_board).get(routes::boards::list_boards),
        )
        .route(
            "/:id",
            get(routes::boards::get_board)
                .put(routes::boards::update_board)
                .delete(routes::boards::delete_board),
        )
        .route(
            "/:id/members",
            get(routes::members::list_members).post(routes::members::add_member),
        )
        .route(
            "/:id/members/:user_id",
            axum::routing::delete(routes::members::remove_member),
        )
        .route("/:id/columns", get(routes::columns::list_columns))
        .route("/:id/cards", get(routes::cards::list_cards))
        .route("/:id/activity", get(routes::activity::board_activity));

    let column_routes = Router::new()
        .route("/", post(routes::columns::create_column))
        .route(
            "/:id",
            put(routes::columns::update_column).delete(routes::columns::delete_column),
        );

    let column_type_routes = Router::new()
        .route(
            "/",
            post(routes::column_types::create_column_type).get(routes::column_types::list_column_types),
        )
        .route(
            "/:id",
            get(routes::column_types::get_column_type)
                .put(routes::column_types::update_column_type)
                .delete(routes::column_types::delete_column_type),
        );

    let card_routes = Router::new()
        .route("/", post(routes::cards::create_card))
        .route(
            "/:id",
            get(routes::cards::get_card)
                .put(routes::cards::update_card)
                .delete(routes::cards::delete_card),
        )
        .route("/:id/move", put(routes::cards::move_card))
        .route("/:id/complete", put(routes::cards::complete_card))
        .route("/:id/assign-me", put(routes::cards::assign_self))
        .route(
            "/:id/comments",
            get(routes::comments::list_comments).post(routes::comments::add_comment),
        )
        .route("/:id/activity", get(routes::activity::card_activity));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/columns", column_routes)
        .nest("/column-types", column_type_routes)
        .nest("/cards", card_routes);

    // Configure CORS from the allow-list
    let cors = if state.config.cors_permissive() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Requests that pass the gate without a token
pub fn is_public(method: &Method, path: &str) -> bool {
    if path == "/docs" || path.starts_with("/docs/") {
        return true;
    }
    match path {
        "/health" => *method == Method::GET,
        "/api/auth/register" | "/api/auth/login" => *method == Method::POST,
        _ => false,
    }
}

/// Authentication gate
///
/// Validates the bearer token, re-loads the identity so its current roles
/// apply, and inserts an [`AuthContext`] into the request extensions. Never
/// writes to the store.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let claims = state.tokens.validate(bearer_token(req.headers())?)?;

    let user = state
        .services
        .resolve_identity(&claims.sub)
        .await
        .map_err(|e| match e {
            DomainError::Unauthenticated => {
                tracing::debug!("Token subject no longer exists");
                ApiError::Unauthorized("Unknown identity".to_string())
            }
            other => other.into(),
        })?;

    req.extensions_mut().insert(AuthContext::from_user(&user));

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_allow_list() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::POST, "/api/auth/register"));
        assert!(is_public(&Method::POST, "/api/auth/login"));
        assert!(is_public(&Method::GET, "/docs/index.html"));

        assert!(!is_public(&Method::GET, "/api/auth/me"));
        assert!(!is_public(&Method::GET, "/api/projects"));
        assert!(!is_public(&Method::DELETE, "/health"));
        assert!(!is_public(&Method::GET, "/docsx"));
    }
}
