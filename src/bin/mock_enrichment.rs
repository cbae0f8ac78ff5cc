//! Stand-in for the age, gender and nationality services during local runs.
//!
//! Point `PS_AGE_URL`, `PS_GENDER_URL` and `PS_NATIONALITY_URL` at
//! `http://<addr>/age`, `/gender` and `/nat`.

use axum::{extract::Query, routing::get, Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;

type Params = Query<HashMap<String, String>>;

fn name_of(params: &Params) -> String {
    params.get("name").cloned().unwrap_or_default()
}

async fn age(params: Params) -> Json<Value> {
    Json(json!({"count": 3800, "name": name_of(&params), "age": 43}))
}

async fn gender(params: Params) -> Json<Value> {
    Json(json!({
        "count": 25459,
        "name": name_of(&params),
        "gender": "male",
        "probability": 1.0
    }))
}

async fn nationality(params: Params) -> Json<Value> {
    Json(json!({
        "count": 34878,
        "name": name_of(&params),
        "country": [
            {"country_id": "RU", "probability": 0.089},
            {"country_id": "UA", "probability": 0.085},
            {"country_id": "CN", "probability": 0.072},
            {"country_id": "BA", "probability": 0.056},
            {"country_id": "TH", "probability": 0.055}
        ]
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let addr = std::env::var("MOCK_ENRICHMENT_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8098".to_string());

    let app = Router::new()
        .route("/age", get(age))
        .route("/gender", get(gender))
        .route("/nat", get(nationality));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Mock enrichment services listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
