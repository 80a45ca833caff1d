//! Static stand-ins shown when the AI service is unavailable.

use std::future::Future;

use axent_common::ai::{
    AiHealth, ChatResponse, ForecastResponse, ImageAnalysisResponse, PriceEstimateResponse, PriceFactors,
    ProjectAnalysis, RecommendationResponse,
};
use serde::Serialize;

use super::AiError;

pub const FALLBACK_MIN_COST: f64 = 4800.0;
pub const FALLBACK_MAX_COST: f64 = 6500.0;
pub const FALLBACK_DURATION_DAYS: u32 = 15;

const UNAVAILABLE_CHAT_REPLY: &str =
    "Our assistant is unavailable right now. Please try again in a few minutes.";

/// A value plus whether it came from the fallback path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimated<T> {
    #[serde(flatten)]
    pub value: T,
    pub fallback: bool,
}

impl<T> Estimated<T> {
    pub fn live(value: T) -> Self {
        Self { value, fallback: false }
    }

    pub fn fallback(value: T) -> Self {
        Self { value, fallback: true }
    }
}

/// Await an AI call, substituting `fallback()` on any error.
pub async fn with_fallback<T, F>(
    operation: &'static str,
    call: F,
    fallback: impl FnOnce() -> T,
) -> Estimated<T>
where
    F: Future<Output = Result<T, AiError>>,
{
    match call.await {
        Ok(value) => Estimated::live(value),
        Err(e) => {
            tracing::warn!(operation, error = %e, "AI call failed, using fallback");
            Estimated::fallback(fallback())
        }
    }
}

/// Cost and duration shown on the project estimator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectEstimate {
    pub min_cost: f64,
    pub max_cost: f64,
    pub duration_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    pub required_machinery: Vec<String>,
    pub suggested_providers: Vec<serde_json::Value>,
}

impl ProjectEstimate {
    pub fn fallback() -> Self {
        Self {
            min_cost: FALLBACK_MIN_COST,
            max_cost: FALLBACK_MAX_COST,
            duration_days: FALLBACK_DURATION_DAYS,
            work_type: None,
            required_machinery: Vec::new(),
            suggested_providers: Vec::new(),
        }
    }

    /// Zero or missing numbers are replaced field by field.
    pub fn from_analysis(analysis: ProjectAnalysis) -> Self {
        let positive = |v: Option<f64>| v.filter(|v| *v > 0.0);
        Self {
            min_cost: positive(analysis.estimated_cost_min).unwrap_or(FALLBACK_MIN_COST),
            max_cost: positive(analysis.estimated_cost_max).unwrap_or(FALLBACK_MAX_COST),
            duration_days: analysis
                .estimated_duration_days
                .filter(|d| *d > 0)
                .unwrap_or(FALLBACK_DURATION_DAYS),
            work_type: analysis.work_type,
            required_machinery: analysis.required_machinery,
            suggested_providers: analysis.suggested_providers,
        }
    }
}

pub fn price_estimate() -> PriceEstimateResponse {
    PriceEstimateResponse {
        estimated_price_per_hour: 0.0,
        confidence_score: 0.0,
        price_range_min: 0.0,
        price_range_max: 0.0,
        factors: PriceFactors::default(),
        market_trend: "stable".to_string(),
    }
}

pub fn recommendations() -> RecommendationResponse {
    RecommendationResponse {
        recommendations: Vec::new(),
        total_count: 0,
        algorithm_used: "none".to_string(),
    }
}

pub fn forecast(equipment_type: &str, region: &str) -> ForecastResponse {
    ForecastResponse {
        equipment_type: equipment_type.to_string(),
        region: region.to_string(),
        forecast_data: Vec::new(),
        overall_trend: "stable".to_string(),
        peak_demand_date: None,
        seasonal_pattern: None,
        model_accuracy: 0.0,
    }
}

pub fn image_analysis() -> ImageAnalysisResponse {
    ImageAnalysisResponse::default()
}

pub fn chat(conversation_id: Option<String>) -> ChatResponse {
    ChatResponse {
        message: UNAVAILABLE_CHAT_REPLY.to_string(),
        conversation_id: conversation_id.unwrap_or_default(),
        suggested_actions: None,
        equipment_suggestions: None,
    }
}

pub fn health() -> AiHealth {
    AiHealth {
        status: "unavailable".to_string(),
        service: String::new(),
        version: String::new(),
    }
}
