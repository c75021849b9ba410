use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use sqlx::{Pool, Postgres};
use tracing::error;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'static str>,
}

async fn database_reachable(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

fn probe_response(result: Result<(), sqlx::Error>, up: &'static str, down: &'static str) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: up,
            database: "connected",
            error: None,
        }),
        Err(e) => {
            error!("Health probe failed ({}): {}", down, e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: down,
                database: "disconnected",
                error: Some("Database unavailable"),
            })
        }
    }
}

/// Overall health including database connectivity
#[get("/health")]
async fn health_check(pool: web::Data<Pool<Postgres>>) -> HttpResponse {
    probe_response(database_reachable(&pool).await, "healthy", "unhealthy")
}

/// Whether the service can take traffic; 503 while the database is away
#[get("/ready")]
async fn readiness_check(pool: web::Data<Pool<Postgres>>) -> HttpResponse {
    probe_response(database_reachable(&pool).await, "ready", "not_ready")
}

/// Process liveness only
#[get("/live")]
async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "alive",
        database: "not_checked",
        error: None,
    })
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config
        .service(health_check)
        .service(readiness_check)
        .service(liveness_check);
}
