use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use task_api::config::{Config, CorsConfig};
use task_api::repository::{PgTaskStore, PgUserStore};
use task_api::{routes, AppState};

fn cors(config: &CorsConfig) -> Cors {
    let cors = if config.allowed_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    cors.allow_any_method()
        .allow_any_header()
        .max_age(config.max_age)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env().map_err(io::Error::other)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    log::debug!("loaded configuration: {:?}", config);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout)
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            log::error!("failed to connect to database: {}", e);
            io::Error::other(e)
        })?;
    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(io::Error::other)?;
    log::info!("successfully connected to the database");

    let state = AppState::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgTaskStore::new(pool)),
        &config.auth,
    )
    .map_err(io::Error::other)?;

    log::info!(
        "rate limit configured at {} requests per {:?} (not enforced in-process)",
        config.rate_limit.requests,
        config.rate_limit.window
    );
    log::info!("starting server at {}", config.server_url());

    let cors_config = config.cors.clone();
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_config))
            .wrap(Logger::default())
            .configure(routes::configure(state.clone()))
    })
    .keep_alive(config.server.keep_alive)
    .client_request_timeout(config.server.request_timeout)
    .shutdown_timeout(config.server.shutdown_timeout.as_secs());

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server
        .bind((config.server.host.as_str(), config.server.port))?
        .run()
        .await
}
