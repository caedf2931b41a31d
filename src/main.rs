use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use fare_predictor::{
    config::Config, request::parse_pickup_datetime, FareError, FeatureAssembler,
    FsArtifactStore, ModelCache, RideRequest,
};

// ---------- Request/Response types ----------

#[derive(Deserialize, Debug)]
struct PredictParams {
    pickup_datetime: String,
    pickup_longitude: f64,
    pickup_latitude: f64,
    dropoff_longitude: f64,
    dropoff_latitude: f64,
    passenger_count: u32,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn into_api_error(e: FareError) -> ApiError {
    let status = match &e {
        FareError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        FareError::ArtifactNotFound | FareError::StoreIo(_) => StatusCode::SERVICE_UNAVAILABLE,
        FareError::ArtifactFormat { .. } | FareError::DimensionMismatch { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": e.to_string() })))
}

// ---------- Server state ----------

#[derive(Clone)]
struct AppState {
    cache: Arc<ModelCache>,
    store: Arc<FsArtifactStore>,
    assembler: Arc<FeatureAssembler>,
    artifact_prefix: String,
}

// ---------- Handlers ----------

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn predict(
    State(state): State<AppState>,
    Query(params): Query<PredictParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pickup_datetime =
        parse_pickup_datetime(&params.pickup_datetime).map_err(into_api_error)?;
    let ride = RideRequest::new(
        pickup_datetime,
        params.pickup_latitude,
        params.pickup_longitude,
        params.dropoff_latitude,
        params.dropoff_longitude,
        params.passenger_count,
    )
    .map_err(into_api_error)?;

    // Lazy reload: the first request after a cold start (or a store
    // outage at boot) triggers a single refresh attempt.
    let artifact = match state.cache.get() {
        Some(artifact) => artifact,
        None => {
            tracing::info!("no cached model, refreshing from store");
            state
                .cache
                .refresh(
                    state.store.as_ref(),
                    &state.artifact_prefix,
                    state.assembler.width(),
                )
                .map_err(into_api_error)?
        }
    };

    let features = state.assembler.assemble(&ride);
    let fare = artifact.predict(&features).map_err(into_api_error)?;
    tracing::info!(
        "predicted fare {:.2} with model {}",
        fare,
        artifact.version()
    );

    Ok(Json(json!({ "fare": fare })))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = Config::from_env()?;
    let store = Arc::new(FsArtifactStore::new(cfg.artifact_dir.clone()));
    let assembler = Arc::new(FeatureAssembler::new());
    let cache = Arc::new(ModelCache::new());

    match cache.refresh(store.as_ref(), &cfg.artifact_prefix, assembler.width()) {
        Ok(artifact) => tracing::info!("model {} loaded at startup", artifact.version()),
        Err(e) => tracing::warn!("initial model load failed, will retry on demand: {e}"),
    }

    let state = AppState {
        cache,
        store,
        assembler,
        artifact_prefix: cfg.artifact_prefix.clone(),
    };

    let app = axum::Router::new()
        .route("/", get(health))
        .route("/predict", get(predict))
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
