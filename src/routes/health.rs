use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe.
///
/// Reports which build is answering (crate name and version) along with the
/// server's current time, so a deployment can be checked without credentials.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now(),
    }))
}
