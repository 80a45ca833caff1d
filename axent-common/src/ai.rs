//! AI service request/response contract.
//!
//! These mirror the JSON shapes served by the external AI HTTP service
//! (price estimation, recommendations, demand forecasting, image analysis,
//! project analysis and chat).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// POST /estimate/price request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimateRequest {
    /// e.g. "tractor", "excavator"
    pub equipment_type: String,
    /// "agriculture", "construction", "industrial"
    pub equipment_category: String,
    /// "excellent", "good", "fair", "poor"
    pub condition: String,
    pub age_years: f64,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceFactors {
    #[serde(default)]
    pub condition_impact: f64,
    #[serde(default)]
    pub age_impact: f64,
    #[serde(default)]
    pub location_demand: f64,
    #[serde(default)]
    pub seasonal_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimateResponse {
    pub estimated_price_per_hour: f64,
    /// 0.0 to 1.0
    pub confidence_score: f64,
    pub price_range_min: f64,
    pub price_range_max: f64,
    #[serde(default)]
    pub factors: PriceFactors,
    /// "increasing", "stable", "decreasing"
    pub market_trend: String,
}

/// POST /recommend/equipment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_equipment_id: Option<String>,
    pub user_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecommendation {
    pub equipment_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub score: f64,
    pub price_per_hour: f64,
    pub location: String,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<EquipmentRecommendation>,
    pub total_count: u32,
    pub algorithm_used: String,
}

/// POST /forecast/demand request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub equipment_type: String,
    pub region: String,
    /// 7 to 365, service default 30
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_seasonality: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDataPoint {
    pub date: String,
    pub predicted_demand: f64,
    pub confidence_interval_lower: f64,
    pub confidence_interval_upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub equipment_type: String,
    pub region: String,
    pub forecast_data: Vec<ForecastDataPoint>,
    pub overall_trend: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_demand_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_pattern: Option<HashMap<String, f64>>,
    pub model_accuracy: f64,
}

/// Flags sent alongside an uploaded image to POST /vision/analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAnalysisOptions {
    #[serde(default = "default_true")]
    pub analyze_condition: bool,
    #[serde(default = "default_true")]
    pub detect_type: bool,
    #[serde(default)]
    pub identify_brand: bool,
}

impl Default for ImageAnalysisOptions {
    fn default() -> Self {
        Self {
            analyze_condition: true,
            detect_type: true,
            identify_brand: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysisResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_type_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_assessment: Option<String>,
    /// 0 to 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_identified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_confidence: Option<f64>,
    #[serde(default)]
    pub detected_features: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// An uploaded file forwarded to the AI service.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Multipart project analysis request (POST /analyzer/analyze-project).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectAnalysisRequest {
    pub description: Option<String>,
    pub location: Option<String>,
    pub work_type: Option<String>,
    /// Sent as repeated `files` parts
    pub files: Vec<FileUpload>,
}

/// Project cost/duration estimate.
///
/// The service has answered both flat and nested under `estimation`; see
/// [`ProjectAnalysisEnvelope`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type_confidence: Option<f64>,
    #[serde(default)]
    pub required_machinery: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_score: Option<f64>,
    #[serde(default)]
    pub suggested_providers: Vec<serde_json::Value>,
}

/// Raw analyzer response: either the analysis itself or wrapped in
/// `{"estimation": {...}, "recommendations": [...]}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectAnalysisEnvelope {
    #[serde(default)]
    pub estimation: Option<ProjectAnalysis>,
    #[serde(default)]
    pub recommendations: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub flat: ProjectAnalysis,
}

impl ProjectAnalysisEnvelope {
    pub fn into_analysis(self) -> ProjectAnalysis {
        let mut analysis = self.estimation.unwrap_or(self.flat);
        if analysis.suggested_providers.is_empty() {
            analysis.suggested_providers = self.recommendations;
        }
        analysis
    }
}

/// POST /chat/message request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// 1 to 1000 characters
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_actions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_suggestions: Option<Vec<String>>,
}

/// GET /health response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiHealth {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub version: String,
}

impl AiHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_request_skips_absent_optionals() {
        let req = PriceEstimateRequest {
            equipment_type: "tractor".to_string(),
            equipment_category: "agriculture".to_string(),
            condition: "good".to_string(),
            age_years: 3.5,
            location: "Udupi".to_string(),
            duration_hours: None,
            season: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("duration_hours"));
        assert!(!json.contains("season"));
    }

    #[test]
    fn test_recommendation_type_field_renamed() {
        let json = r#"{
            "equipment_id": "equip_789",
            "name": "John Deere 5050D",
            "type": "tractor",
            "score": 0.95,
            "price_per_hour": 42.0,
            "location": "Udupi",
            "available": true,
            "reason": "Highly rated nearby"
        }"#;
        let rec: EquipmentRecommendation = serde_json::from_str(json).unwrap();
        assert_eq!(rec.equipment_type, "tractor");
        assert!(rec.image_url.is_none());
    }

    #[test]
    fn test_image_options_defaults() {
        let opts: ImageAnalysisOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, ImageAnalysisOptions::default());
        assert!(opts.analyze_condition);
        assert!(opts.detect_type);
        assert!(!opts.identify_brand);
    }

    #[test]
    fn test_project_envelope_flat() {
        let json = r#"{
            "work_type": "Excavation",
            "estimated_cost_min": 5200.0,
            "estimated_cost_max": 7100.0,
            "estimated_duration_days": 12
        }"#;
        let envelope: ProjectAnalysisEnvelope = serde_json::from_str(json).unwrap();
        let analysis = envelope.into_analysis();
        assert_eq!(analysis.work_type.as_deref(), Some("Excavation"));
        assert_eq!(analysis.estimated_duration_days, Some(12));
    }

    #[test]
    fn test_project_envelope_nested() {
        let json = r#"{
            "estimation": {"estimated_cost_min": 100.0, "estimated_cost_max": 200.0},
            "recommendations": [{"name": "Tata Hitachi EX200"}]
        }"#;
        let envelope: ProjectAnalysisEnvelope = serde_json::from_str(json).unwrap();
        let analysis = envelope.into_analysis();
        assert_eq!(analysis.estimated_cost_min, Some(100.0));
        assert_eq!(analysis.suggested_providers.len(), 1);
    }

    #[test]
    fn test_ai_health_is_healthy() {
        let health: AiHealth = serde_json::from_str(r#"{"status":"healthy"}"#).unwrap();
        assert!(health.is_healthy());
        let health: AiHealth = serde_json::from_str(r#"{"status":"degraded"}"#).unwrap();
        assert!(!health.is_healthy());
    }
}
