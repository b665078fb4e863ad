use anyhow::Context;
use axum::{debug_handler, http::HeaderValue, response::IntoResponse, routing::get, Router};
use duochat::{auth, db, fanout::FanoutEngine, registry::RoomRegistry, rooms, store::MessageStore, AppState};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let database_url =
        dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:duochat.db?mode=rwc".to_owned());

    // A storage connection failure at startup is fatal; everything after this
    // point degrades per event instead.
    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(&database_url)
        .await
        .context("storage connection failed")?;
    db::init_db(&db_pool).await.context("schema init failed")?;

    let store = MessageStore::new(db_pool);
    let registry = RoomRegistry::new();
    let fanout = FanoutEngine::new(store.clone(), registry.clone());
    let users = auth::UserDirectory::from_env();

    let app_state = AppState {
        store,
        registry,
        fanout,
        users,
    };

    let app = Router::new()
        .route("/", get(health))

        .nest("/api/auth", auth::router())
        .nest("/api/chatroom", rooms::chatroom_router())
        .nest("/api/message", rooms::message_router())
        .merge(rooms::ws_router())

        .with_state(app_state)
        .layer(cors_layer());

    let port: u16 = dotenv::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(5000);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

#[debug_handler]
async fn health() -> impl IntoResponse {
    "server is running"
}

fn cors_layer() -> CorsLayer {
    let origin = match dotenv::var("ALLOWED_ORIGINS") {
        Ok(raw) => AllowOrigin::list(
            raw.split(',')
                .filter_map(|o| o.trim().parse::<HeaderValue>().ok()),
        ),
        Err(_) => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
