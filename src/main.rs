//! Government Exam Portal
//!
//! Read API over the content store, bundled data files, and server-rendered list/detail
//! pages with SEO metadata for jobs, admit cards, results, notifications, syllabus,
//! answer keys and admissions.

mod api;
mod config;
mod content;
mod db;
mod errors;
mod models;
mod pages;
mod seo;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use content::Catalog;
use db::ContentStore;
use errors::AppError;
use models::Category;
use pages::{SearchParams, Templates};
use seo::SiteInfo;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ContentStore>,
    pub catalog: Arc<Catalog>,
    pub templates: Arc<Templates>,
    pub site: Arc<SiteInfo>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the state from configuration; the store connects lazily.
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let store = Arc::new(ContentStore::new(&config.db_path));
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let catalog = Catalog::from_config(&config, store.clone(), client);

        Ok(Self {
            store,
            catalog: Arc::new(catalog),
            templates: Arc::new(Templates::new()?),
            site: Arc::new(SiteInfo {
                name: config.site_name.clone(),
                url: config.site_url.clone(),
            }),
            config: Arc::new(config),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!config.log_json).then(|| tracing_subscriber::fmt::layer());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!("Starting exam portal");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Static directory: {:?}", config.static_dir);
    tracing::info!("Bind address: {}", config.bind_addr);
    for category in Category::ALL {
        tracing::info!("{:?} pages use the {} binding", category, config.binding(category));
    }

    let bind_addr = config.bind_addr;
    let seed_dir = config.seed_dir.clone();
    let state = AppState::from_config(config)?;

    // Warm the store connection; a failure here is retried on the next request
    if let Err(e) = state.store.connection().await {
        tracing::warn!("Content store unavailable at startup: {}", e);
    }

    if let Some(dir) = seed_dir {
        match state.store.seed_from_dir(&dir).await {
            Ok(count) => tracing::info!("Seeded {} documents from {:?}", count, dir),
            Err(e) => tracing::warn!("Seeding from {:?} failed: {}", dir, e),
        }
    }

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let mut api_routes = Router::new();
    for category in Category::ALL {
        let Some(segment) = category.api_segment() else {
            continue;
        };

        let mut collection = get(move |State(state): State<AppState>| {
            api::list_records(state, category)
        });
        if category == Category::Notifications {
            collection = collection.post(api::create_notification);
        }

        api_routes = api_routes
            .route(&format!("/{}", segment), collection)
            .route(
                &format!("/{}/{{id}}", segment),
                get(
                    move |State(state): State<AppState>, Path(id): Path<String>| {
                        api::get_record(state, category, id)
                    },
                ),
            );
    }

    // Pages
    let mut page_routes = Router::new().route(
        "/",
        get(
            |State(state): State<AppState>, Query(params): Query<SearchParams>| {
                pages::home(state, params)
            },
        ),
    );
    for category in Category::ALL {
        page_routes = page_routes
            .route(
                &format!("/{}", category.route()),
                get(
                    move |State(state): State<AppState>, Query(params): Query<SearchParams>| {
                        pages::list_page(state, category, params)
                    },
                ),
            )
            .route(
                &format!("/{}/{{id}}", category.route()),
                get(
                    move |State(state): State<AppState>, Path(id): Path<String>| {
                        pages::detail_page(state, category, id)
                    },
                ),
            );
    }

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    // Bundled data files, e.g. /jobsData.json
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .nest("/api", api_routes)
        .merge(page_routes)
        .merge(health_routes)
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
