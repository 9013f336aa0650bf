#![deny(missing_docs)]

//! # tiny-url-svc
//!
//! Entry point for the Actix Web server.

use actix_web::{middleware, web, App, HttpServer};
use clap::Parser;
use std::net::TcpListener;
use tinyurl_web::{configure, logging, ApiController, AppConfig};

fn build_server(
    listener: TcpListener,
    controller: web::Data<ApiController>,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .configure(configure(controller.clone()))
    })
    .listen(listener)?
    .run())
}

async fn run(config: AppConfig) -> std::io::Result<()> {
    let controller = web::Data::new(ApiController::in_memory(&config));
    let listener = TcpListener::bind(&config.bind)?;
    tracing::info!(bind = %config.bind, base_url = %config.base_url, "starting tiny-url");
    let server = build_server(listener, controller)?;

    if config.oneshot {
        let handle = server.handle();
        let task = actix_web::rt::spawn(server);
        handle.stop(true).await;
        return task.await.map_err(std::io::Error::other)?;
    }

    server.await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::parse();
    logging::init(&config.log);
    run(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_run_oneshot() {
        let config = AppConfig {
            bind: "127.0.0.1:0".into(),
            oneshot: true,
            ..AppConfig::default()
        };
        assert!(run(config).await.is_ok());
    }

    #[actix_web::test]
    async fn test_build_server_start_stop() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let controller = web::Data::new(ApiController::in_memory(&AppConfig::default()));
        let server = build_server(listener, controller).unwrap();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        handle.stop(true).await;
    }
}
