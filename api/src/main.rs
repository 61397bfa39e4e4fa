use api::routes::routes;
use api::ws::ws_routes;
use axum::Router;
use common::config::AppConfig;
use common::logger::init_logger;
use common::state::AppState;
use common::ws::WebSocketManager;
use migration::{Migrator, MigratorTrait};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let (log_level, log_file, host, port, project_name) = {
        let config = AppConfig::global();
        (
            config.log_level.clone(),
            config.log_file.clone(),
            config.host.clone(),
            config.port,
            config.project_name.clone(),
        )
    };
    init_logger(&log_level, &log_file);

    let db = db::connect().await;
    Migrator::up(&db, None).await.expect("Migration failed");

    let app_state = AppState::new(db, WebSocketManager::new());

    let cors = CorsLayer::very_permissive();

    let app = Router::new()
        .nest("/api", routes(app_state.clone()))
        .nest("/ws", ws_routes(app_state))
        .layer(cors);

    let addr: SocketAddr = format!("{host}:{port}").parse().expect("Invalid address");

    log::info!("Starting {project_name} on http://{host}:{port}");

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Server crashed");
}
