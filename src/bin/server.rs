//! Flexure Solver HTTP Server

use axum::{
    extract::Json,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use flexure_solver::grid::field_to_rows;
use flexure_solver::prelude::*;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct FlexureResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<ResultsData>,
}

#[derive(Debug, Serialize)]
struct ResultsData {
    /// Deflection rows, same layout as the request's `q0`
    w: Vec<Vec<f64>>,
    summary: FlexureSummary,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn flexure(Json(config): Json<FlexureConfig>) -> impl IntoResponse {
    match run_flexure(config) {
        Ok(results) => (
            StatusCode::OK,
            Json(FlexureResponse {
                success: true,
                error: None,
                results: Some(results),
            }),
        ),
        Err(e) => {
            log::warn!("flexure request failed: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(FlexureResponse {
                    success: false,
                    error: Some(e.to_string()),
                    results: None,
                }),
            )
        }
    }
}

fn run_flexure(config: FlexureConfig) -> FlexureResult<ResultsData> {
    let mut model = config.into_model()?;
    model.run()?;

    let summary = model.summary()?;
    let w = field_to_rows(model.deflection()?);
    Ok(ResultsData { w, summary })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/v1/flexure", post(flexure))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8087));
    println!("Flexure Solver Server listening on http://{}", addr);
    println!("  Health check: GET  /health");
    println!("  Flexure:      POST /api/v1/flexure");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
