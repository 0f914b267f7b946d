use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use roster_db::DbPool;
use serde::Serialize;

/// What the readiness probe checks behind the customer endpoints.
#[derive(Clone)]
pub enum StoreProbe {
    Sqlite(DbPool),
    Memory,
}

#[derive(Clone)]
pub struct HealthState {
    store: StoreProbe,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub storage: HealthCheck,
    pub checked_at: String,
}

pub fn router(store: StoreProbe) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { store })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let storage = storage_check(&state.store).await;
    let ready = storage.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "roster-server runtime initialized".to_string(),
        },
        storage,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn storage_check(store: &StoreProbe) -> HealthCheck {
    let pool = match store {
        StoreProbe::Memory => {
            return HealthCheck { status: "ready", detail: "in-memory store".to_string() };
        }
        StoreProbe::Sqlite(pool) => pool,
    };

    match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}
