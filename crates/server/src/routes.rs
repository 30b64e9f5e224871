//! HTTP surface: the HTML page plus a small JSON API.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::orchestrator::{Evaluation, EvaluationError, RatingOrchestrator};
use crate::render::{render_page, PageState};

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub title: String,
}

/// JSON API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl From<EvaluationError> for ApiError {
    fn from(err: EvaluationError) -> Self {
        match err {
            EvaluationError::UnknownTitle(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn create_router(orchestrator: RatingOrchestrator) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/evaluate", post(evaluate_page))
        .route("/health", get(health_check))
        .route("/api/movies", get(list_movies))
        .route("/api/evaluate", post(evaluate_json))
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}

async fn index_page(State(orchestrator): State<RatingOrchestrator>) -> Html<String> {
    Html(render_page(&orchestrator.titles(), None, &PageState::Idle))
}

async fn evaluate_page(
    State(orchestrator): State<RatingOrchestrator>,
    Form(request): Form<EvaluateRequest>,
) -> Html<String> {
    let result = orchestrator.evaluate(&request.title).await.map_err(|e| {
        warn!("Evaluation of '{}' failed: {}", request.title, e);
        e.to_string()
    });
    Html(render_page(
        &orchestrator.titles(),
        Some(request.title.as_str()),
        &PageState::Evaluated(result),
    ))
}

async fn health_check() -> &'static str {
    "OK"
}

async fn list_movies(State(orchestrator): State<RatingOrchestrator>) -> Json<Vec<String>> {
    Json(orchestrator.titles())
}

async fn evaluate_json(
    State(orchestrator): State<RatingOrchestrator>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<Evaluation>, ApiError> {
    let evaluation = orchestrator.evaluate(&request.title).await?;
    Ok(Json(evaluation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppContext;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use data_loader::{DataIndex, FeatureMatrix, MovieRecord};
    use ml_client::LinearRatingModel;
    use posters::PosterResolver;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let movie = |title: &str, external_id, average_vote| MovieRecord {
            title: title.to_string(),
            external_id,
            average_vote,
        };
        let catalog = vec![
            movie("Avatar", 19995, 7.2),
            movie("Tom & Jerry", 587807, 7.0),
            movie("Spectre", 206647, 6.3),
        ];
        let vectors = FeatureMatrix::from_rows(vec![
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
        ])
        .unwrap();
        let index = Arc::new(DataIndex::new(catalog, vectors).unwrap());
        let model = Arc::new(LinearRatingModel::new(vec![1.0, 0.5], 5.0).unwrap());
        let context =
            AppContext::new(index, model, PosterResolver::offline().unwrap(), 5).unwrap();
        create_router(RatingOrchestrator::new(context))
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/evaluate")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/evaluate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_index_page_lists_titles() {
        let response = test_router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("<option value=\"Avatar\" selected>Avatar</option>"));
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(!html.contains("Predicted Rating for"));
    }

    #[tokio::test]
    async fn test_evaluate_page() {
        let response = test_router()
            .oneshot(form_request("title=Tom+%26+Jerry"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_text(response).await;
        assert!(html.contains("Predicted Rating for 'Tom &amp; Jerry': 6.50/10"));
        assert!(html.contains("Actual TMDB Rating: 7.0/10"));
        assert!(html.contains("<figcaption>Avatar</figcaption>"));
        assert!(html.contains("<figcaption>Spectre</figcaption>"));
        assert!(html.contains("<h2>Top 2 Similar Movies</h2>"));
    }

    #[tokio::test]
    async fn test_evaluate_page_unknown_title() {
        let response = test_router()
            .oneshot(form_request("title=Nope"))
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Prediction failed: Unknown movie title: &#39;Nope&#39;"));
        assert!(!html.contains("Predicted Rating for"));
    }

    #[tokio::test]
    async fn test_repeated_evaluation_renders_identically() {
        let router = test_router();
        let first = router
            .clone()
            .oneshot(form_request("title=Spectre"))
            .await
            .unwrap();
        let second = router.oneshot(form_request("title=Spectre")).await.unwrap();
        assert_eq!(body_text(first).await, body_text(second).await);
    }

    #[tokio::test]
    async fn test_list_movies() {
        let response = test_router()
            .oneshot(Request::get("/api/movies").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let titles: Vec<String> = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(titles, vec!["Avatar", "Tom & Jerry", "Spectre"]);
    }

    #[tokio::test]
    async fn test_evaluate_json() {
        let response = test_router()
            .oneshot(json_request(r#"{"title": "Avatar"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["title"], "Avatar");
        assert_eq!(body["row"], 0);
        assert_eq!(body["predicted_rating"], 6.0);
        let similar = body["similar"].as_array().unwrap();
        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0]["poster"]["display_title"], "Tom & Jerry");
        assert_eq!(similar[1]["poster"]["display_title"], "Spectre");
    }

    #[tokio::test]
    async fn test_evaluate_json_unknown_title() {
        let response = test_router()
            .oneshot(json_request(r#"{"title": "Nope"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body["error"], "Unknown movie title: 'Nope'");
    }
}
