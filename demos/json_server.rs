//! A server that answers every request with a small JSON document.
//!
//! Configuration comes from `TINYHTTP_*` environment variables, logging from
//! `RUST_LOG`:
//!
//! ```sh
//! RUST_LOG=debug TINYHTTP_ADDR=127.0.0.1:8080 cargo run --example json_server
//! curl -v http://127.0.0.1:8080/anything
//! ```

use serde::Serialize;
use tinyhttp_rs::{HttpRequest, HttpResponse, HttpServer, ServerConfig, StatusCode};

#[derive(Serialize)]
struct Item {
    id: u32,
}

fn handle(request: &HttpRequest) -> HttpResponse {
    if !request.body.is_empty() {
        println!("Body: {}", String::from_utf8_lossy(&request.body));
    }

    HttpResponse::new(StatusCode::OK)
        .with_json(&Item { id: 1 })
        .unwrap_or_else(|e| {
            HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .with_body_string(e.to_string())
                .with_content_length()
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ServerConfig::from_env()?;
    println!("Starting server on http://{}", config.addr);

    let server = HttpServer::new(config, handle);
    server.start().await?;

    Ok(())
}
