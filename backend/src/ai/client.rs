use std::time::Duration;

use axent_common::ai::{
    AiHealth, ChatRequest, ChatResponse, FileUpload, ForecastRequest, ForecastResponse,
    ImageAnalysisOptions, ImageAnalysisResponse, PriceEstimateRequest, PriceEstimateResponse,
    ProjectAnalysis, ProjectAnalysisEnvelope, ProjectAnalysisRequest, RecommendationRequest,
    RecommendationResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Longest chat message the service accepts, in characters.
pub const MAX_CHAT_MESSAGE_CHARS: usize = 1000;

const API_PREFIX: &str = "/api/v1";

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI service timed out")]
    Timeout,
    #[error("HTTP request failed: {0}")]
    Request(String),
    #[error("AI service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout
        } else if e.is_decode() {
            AiError::InvalidResponse(e.to_string())
        } else {
            AiError::Request(e.to_string())
        }
    }
}

/// Error body: the service answers `{"error": ..}` or `{"detail": ..}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        self.error.or_else(|| {
            self.detail.map(|d| match d {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
        })
    }
}

/// Client for the external AI HTTP service.
pub struct AiClient {
    http_client: Client,
    base_url: String,
}

impl AiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AiError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AiError::Request(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Service root: the base URL without its `/api/v1` suffix.
    fn root_url(&self) -> &str {
        self.base_url.strip_suffix(API_PREFIX).unwrap_or(&self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AiError> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::message)
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(AiError::Status { status, message });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AiError::InvalidResponse(e.to_string()))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, AiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Calling AI service");
        self.send(self.http_client.post(url).json(body)).await
    }

    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, AiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Calling AI service (multipart)");
        self.send(self.http_client.post(url).multipart(form)).await
    }

    pub async fn estimate_price(&self, request: &PriceEstimateRequest) -> Result<PriceEstimateResponse, AiError> {
        self.post_json("/estimate/price", request).await
    }

    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse, AiError> {
        self.post_json("/recommend/equipment", request).await
    }

    pub async fn forecast_demand(&self, request: &ForecastRequest) -> Result<ForecastResponse, AiError> {
        self.post_json("/forecast/demand", request).await
    }

    pub async fn analyze_image(
        &self,
        upload: FileUpload,
        options: ImageAnalysisOptions,
    ) -> Result<ImageAnalysisResponse, AiError> {
        let form = Form::new()
            .part("file", file_part(upload)?)
            .text("analyze_condition", options.analyze_condition.to_string())
            .text("detect_type", options.detect_type.to_string())
            .text("identify_brand", options.identify_brand.to_string());

        self.post_form("/vision/analyze", form).await
    }

    /// Analyze a project description (and optional photos) for cost and duration.
    pub async fn analyze_project(&self, request: ProjectAnalysisRequest) -> Result<ProjectAnalysis, AiError> {
        let mut form = Form::new();
        if let Some(description) = request.description {
            form = form.text("description", description);
        }
        if let Some(location) = request.location {
            form = form.text("location", location);
        }
        if let Some(work_type) = request.work_type {
            form = form.text("work_type", work_type);
        }
        for upload in request.files {
            form = form.part("files", file_part(upload)?);
        }

        let envelope: ProjectAnalysisEnvelope = self.post_form("/analyzer/analyze-project", form).await?;
        Ok(envelope.into_analysis())
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AiError> {
        let length = request.message.trim().chars().count();
        if length == 0 || request.message.chars().count() > MAX_CHAT_MESSAGE_CHARS {
            return Err(AiError::Request(format!(
                "chat message must be 1 to {} characters",
                MAX_CHAT_MESSAGE_CHARS
            )));
        }
        self.post_json("/chat/message", request).await
    }

    pub async fn health(&self) -> Result<AiHealth, AiError> {
        let url = format!("{}/health", self.root_url());
        self.send(self.http_client.get(url)).await
    }
}

fn file_part(upload: FileUpload) -> Result<Part, AiError> {
    let part = Part::bytes(upload.bytes).file_name(upload.file_name);
    match upload.content_type {
        Some(content_type) => part
            .mime_str(&content_type)
            .map_err(|e| AiError::Request(format!("invalid content type {:?}: {}", content_type, e))),
        None => Ok(part),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AiClient {
        AiClient::new(&format!("{}/api/v1", server.uri()), Duration::from_millis(500)).unwrap()
    }

    fn price_request() -> PriceEstimateRequest {
        PriceEstimateRequest {
            equipment_type: "tractor".to_string(),
            equipment_category: "agriculture".to_string(),
            condition: "good".to_string(),
            age_years: 4.0,
            location: "Udupi".to_string(),
            duration_hours: Some(8),
            season: None,
        }
    }

    #[tokio::test]
    async fn test_estimate_price() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/estimate/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "estimated_price_per_hour": 850.0,
                "confidence_score": 0.82,
                "price_range_min": 700.0,
                "price_range_max": 1000.0,
                "factors": {"condition_impact": 1.0, "age_impact": 0.9, "location_demand": 1.1, "seasonal_factor": 1.0},
                "market_trend": "stable"
            })))
            .mount(&server)
            .await;

        let response = client(&server).estimate_price(&price_request()).await.unwrap();
        assert_eq!(response.estimated_price_per_hour, 850.0);
        assert_eq!(response.market_trend, "stable");
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/estimate/price"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let err = client(&server).estimate_price(&price_request()).await.unwrap_err();
        assert!(matches!(err, AiError::Timeout));
    }

    #[tokio::test]
    async fn test_error_body_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/forecast/demand"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "forecast_days out of range"})))
            .mount(&server)
            .await;

        let request = ForecastRequest {
            equipment_type: "excavator".to_string(),
            region: "Karnataka".to_string(),
            forecast_days: Some(1000),
            include_seasonality: None,
        };
        match client(&server).forecast_demand(&request).await.unwrap_err() {
            AiError::Status { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "forecast_days out of range");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/chat/message"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let request = ChatRequest {
            message: "Which tractor suits paddy fields?".to_string(),
            user_id: None,
            conversation_id: None,
        };
        match client(&server).chat(&request).await.unwrap_err() {
            AiError::Status { message, .. } => assert_eq!(message, "HTTP 503"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_message_length_checked_locally() {
        let server = MockServer::start().await;
        let client = client(&server);

        let empty = ChatRequest {
            message: "   ".to_string(),
            user_id: None,
            conversation_id: None,
        };
        assert!(matches!(client.chat(&empty).await, Err(AiError::Request(_))));

        let long = ChatRequest {
            message: "a".repeat(MAX_CHAT_MESSAGE_CHARS + 1),
            ..empty
        };
        assert!(matches!(client.chat(&long).await, Err(AiError::Request(_))));
    }

    #[tokio::test]
    async fn test_analyze_project_nested_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/analyzer/analyze-project"))
            .and(body_string_contains("name=\"work_type\""))
            .and(body_string_contains("name=\"files\"; filename=\"site.jpg\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "estimation": {
                    "estimated_cost_min": 12000.0,
                    "estimated_cost_max": 18000.0,
                    "estimated_duration_days": 9
                },
                "recommendations": [{"name": "Coastal Earthmovers"}]
            })))
            .mount(&server)
            .await;

        let request = ProjectAnalysisRequest {
            description: Some("Clear and level a 2 acre plot".to_string()),
            location: Some("Kundapura".to_string()),
            work_type: Some("Excavation".to_string()),
            files: vec![FileUpload {
                file_name: "site.jpg".to_string(),
                content_type: Some("image/jpeg".to_string()),
                // body_string_contains only matches UTF-8 bodies
                bytes: b"site-photo".to_vec(),
            }],
        };
        let analysis = client(&server).analyze_project(request).await.unwrap();
        assert_eq!(analysis.estimated_cost_min, Some(12000.0));
        assert_eq!(analysis.estimated_duration_days, Some(9));
        assert_eq!(analysis.suggested_providers.len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_image_sends_flags() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/vision/analyze"))
            .and(body_string_contains("name=\"identify_brand\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "equipment_type": "excavator",
                "condition_score": 72.5,
                "detected_features": ["tracks", "bucket"]
            })))
            .mount(&server)
            .await;

        let upload = FileUpload {
            file_name: "jcb.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: b"excavator-photo".to_vec(),
        };
        let analysis = client(&server)
            .analyze_image(upload, ImageAnalysisOptions::default())
            .await
            .unwrap();
        assert_eq!(analysis.equipment_type.as_deref(), Some("excavator"));
        assert_eq!(analysis.detected_features, vec!["tracks", "bucket"]);
    }

    #[tokio::test]
    async fn test_health_strips_api_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "service": "axent-ai",
                "version": "1.0.0"
            })))
            .mount(&server)
            .await;

        let health = client(&server).health().await.unwrap();
        assert!(health.is_healthy());
    }

    #[tokio::test]
    async fn test_invalid_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/recommend/equipment"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let request = RecommendationRequest {
            user_id: "user_1".to_string(),
            current_equipment_id: None,
            user_role: "customer".to_string(),
            location: None,
            limit: Some(3),
        };
        let err = client(&server).recommend(&request).await.unwrap_err();
        assert!(matches!(err, AiError::InvalidResponse(_)));
    }
}
