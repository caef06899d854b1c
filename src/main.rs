use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

use stellar_market::entities::{primary_setup, setup_schema};
use stellar_market::routes::api_router;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db: DatabaseConnection = Database::connect(&database_url).await.unwrap();
    setup_schema(&db).await.expect("Failed to create schema");

    primary_setup(&db).await;

    let shared_db = Arc::new(db);
    let app = api_router(shared_db);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await.unwrap();
    tracing::info!("Running at {:?}", listener);
    axum::serve(listener, app).await.unwrap();
}
