//! `/api/ai/*`: proxies to the AI service. Failures never surface as
//! errors; the response carries the fallback value and `fallback: true`.

use std::sync::Arc;

use axent_common::ai::{
    AiHealth, ChatRequest, ChatResponse, ForecastRequest, ForecastResponse, ImageAnalysisOptions,
    ImageAnalysisResponse, PriceEstimateRequest, PriceEstimateResponse, RecommendationRequest,
    RecommendationResponse,
};
use axum::extract::{Multipart, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Serialize;

use super::UploadForm;
use crate::ai::{fallback, with_fallback, Estimated, MAX_CHAT_MESSAGE_CHARS};
use crate::auth::Session;
use crate::error::{AppError, Result};
use crate::AppState;

async fn price(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PriceEstimateRequest>,
) -> Json<Estimated<PriceEstimateResponse>> {
    Json(with_fallback("estimate_price", state.ai_client.estimate_price(&request), fallback::price_estimate).await)
}

async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecommendationRequest>,
) -> Json<Estimated<RecommendationResponse>> {
    Json(with_fallback("recommend", state.ai_client.recommend(&request), fallback::recommendations).await)
}

async fn forecast(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForecastRequest>,
) -> Json<Estimated<ForecastResponse>> {
    let estimate = with_fallback("forecast_demand", state.ai_client.forecast_demand(&request), || {
        fallback::forecast(&request.equipment_type, &request.region)
    })
    .await;
    Json(estimate)
}

/// Multipart `file` plus optional `analyze_condition`, `detect_type`,
/// `identify_brand` flags.
async fn image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Estimated<ImageAnalysisResponse>>> {
    let mut form = UploadForm::read(multipart).await?;
    let defaults = ImageAnalysisOptions::default();
    let options = ImageAnalysisOptions {
        analyze_condition: form.flag("analyze_condition", defaults.analyze_condition),
        detect_type: form.flag("detect_type", defaults.detect_type),
        identify_brand: form.flag("identify_brand", defaults.identify_brand),
    };

    if form.files.is_empty() {
        return Err(AppError::InvalidRequest("missing image file".to_string()));
    }
    let upload = form.files.swap_remove(0);

    Ok(Json(
        with_fallback(
            "analyze_image",
            state.ai_client.analyze_image(upload, options),
            fallback::image_analysis,
        )
        .await,
    ))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(mut request): Json<ChatRequest>,
) -> Result<Json<Estimated<ChatResponse>>> {
    let length = request.message.chars().count();
    if request.message.trim().is_empty() || length > MAX_CHAT_MESSAGE_CHARS {
        return Err(AppError::InvalidRequest(format!(
            "message must be 1 to {} characters",
            MAX_CHAT_MESSAGE_CHARS
        )));
    }
    if request.user_id.is_none() {
        request.user_id = session.profile().map(|p| p.id.clone());
    }

    let conversation_id = request.conversation_id.clone();
    Ok(Json(
        with_fallback("chat", state.ai_client.chat(&request), || fallback::chat(conversation_id)).await,
    ))
}

#[derive(Debug, Serialize)]
struct HealthView {
    healthy: bool,
    #[serde(flatten)]
    health: Estimated<AiHealth>,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthView> {
    let health = with_fallback("health", state.ai_client.health(), fallback::health).await;
    Json(HealthView {
        healthy: health.value.is_healthy(),
        health,
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ai/price", post(price))
        .route("/ai/recommend", post(recommend))
        .route("/ai/forecast", post(forecast))
        .route("/ai/image", post(image))
        .route("/ai/chat", post(chat))
        .route("/ai/health", get(health))
}
