// Request extractors that report failures through ApiError

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// JSON body that has been deserialized and validated
///
/// Malformed bodies and failed field validation both answer 400.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError::InvalidArgument(format!("Invalid input: {}", rejection.body_text()))
            })?;

        value.validate()?;
        Ok(Self(value))
    }
}

/// Positive numeric id taken from the single `:id` path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::InvalidArgument(rejection.body_text()))?;

        parse_id(&raw).map(EntityId)
    }
}

/// Parse a surrogate id; zero, negative and non-numeric values are rejected
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::InvalidArgument(format!("Invalid ID: '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::{get, post}, Router};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Validate)]
    struct Named {
        #[validate(length(min = 2))]
        name: String,
    }

    async fn echo_name(ValidatedJson(body): ValidatedJson<Named>) -> String {
        body.name
    }

    async fn echo_id(EntityId(id): EntityId) -> String {
        id.to_string()
    }

    fn server() -> TestServer {
        let app = Router::new()
            .route("/named", post(echo_name))
            .route("/items/:id", get(echo_id));
        TestServer::new(app).unwrap()
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-4").is_err());
        assert!(parse_id("abc").is_err());
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let response = server().post("/named").json(&json!({"name": "Ann"})).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "Ann");
    }

    #[tokio::test]
    async fn test_wrong_type_is_bad_request() {
        let response = server().post("/named").json(&json!({"name": 123})).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error_code"], "INVALID_ARGUMENT");
        assert!(body["message"].as_str().unwrap().contains("Invalid input"));
    }

    #[tokio::test]
    async fn test_failed_validation_is_bad_request() {
        let response = server().post("/named").json(&json!({"name": "A"})).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error_code"], "VALIDATION_ERROR");
        assert!(body["details"]["name"].is_array());
    }

    #[tokio::test]
    async fn test_bad_path_id_is_bad_request() {
        let response = server().get("/items/abc").await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let response = server().get("/items/7").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "7");
    }
}
