//! HTTP API for the Keygate licensing service.
//!
//! Every endpoint is POST-only and reads `email` and `licenseKey` from the
//! JSON body, falling back to the query string. `ok` in a response body
//! always agrees with the HTTP status: 200 for success, 400 for bad input,
//! 500 when the backend fails.

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::post,
};
use chrono::{DateTime, Utc};
use keygate_license::{AccessStatus, LicenseError, LicensingService};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Request parameters shared by all endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseParams {
    pub email: Option<String>,
    pub license_key: Option<String>,
}

impl LicenseParams {
    /// Takes each field from `self` unless it is missing or empty there.
    fn or(self, fallback: LicenseParams) -> Self {
        Self {
            email: non_empty(self.email).or_else(|| non_empty(fallback.email)),
            license_key: non_empty(self.license_key).or_else(|| non_empty(fallback.license_key)),
        }
    }

    fn email(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Response for `POST /api/trial/start`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrialResponse {
    pub ok: bool,
    pub status: AccessStatus,
    /// Epoch milliseconds.
    pub expires_at: i64,
    pub message: String,
}

/// Response for `POST /api/license/activate`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivateResponse {
    pub ok: bool,
    pub status: AccessStatus,
    pub license_key: String,
    pub expires_at: Option<i64>,
}

/// Response for `POST /api/license/verify`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub ok: bool,
    pub status: AccessStatus,
    pub expires_at: Option<i64>,
    pub reason: Option<String>,
    pub license_key: Option<String>,
}

/// Body of every failed request except verify's missing-email case.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

fn millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// Failures rendered as `{ok: false, error}`.
#[derive(Debug)]
enum ApiError {
    InvalidQuery,
    InvalidBody,
    License(LicenseError),
}

impl ApiError {
    fn message(&self) -> String {
        match self {
            Self::InvalidQuery => "Invalid query string".to_string(),
            Self::InvalidBody => "Invalid JSON body".to_string(),
            Self::License(e) => e.client_message(),
        }
    }
}

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        Self::License(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidQuery | Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::License(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::License(e) => {
                warn!("Licensing backend failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorResponse::new(self.message()))).into_response()
    }
}

type QueryParams = Result<Query<LicenseParams>, QueryRejection>;

/// Merges the JSON body over the query string. An empty or `null` body
/// leaves the query string as is.
fn read_params(query: QueryParams, body: &Bytes) -> Result<LicenseParams, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        debug!("Rejected query string: {}", rejection);
        ApiError::InvalidQuery
    })?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(query);
    }
    let from_body: Option<LicenseParams> =
        serde_json::from_slice(body).map_err(|_| ApiError::InvalidBody)?;
    Ok(match from_body {
        Some(params) => params.or(query),
        None => query,
    })
}

async fn start_trial_handler(
    State(service): State<LicensingService>,
    query: QueryParams,
    body: Bytes,
) -> Result<Json<TrialResponse>, ApiError> {
    let params = read_params(query, &body)?;
    let grant = service.start_trial(params.email()).await?;
    Ok(Json(TrialResponse {
        ok: true,
        status: grant.status,
        expires_at: millis(grant.expires_at),
        message: grant.message.to_string(),
    }))
}

async fn activate_handler(
    State(service): State<LicensingService>,
    query: QueryParams,
    body: Bytes,
) -> Result<Json<ActivateResponse>, ApiError> {
    let params = read_params(query, &body)?;
    let activation = service
        .activate_license(params.email(), params.license_key.as_deref())
        .await?;
    Ok(Json(ActivateResponse {
        ok: true,
        status: activation.status,
        license_key: activation.license_key,
        expires_at: activation.expires_at.map(millis),
    }))
}

/// Verify reports unusable requests as status `invalid` rather than `{error}`.
fn invalid_request(reason: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(VerifyResponse {
            ok: false,
            status: AccessStatus::Invalid,
            expires_at: None,
            reason: Some(reason),
            license_key: None,
        }),
    )
        .into_response()
}

async fn verify_handler(
    State(service): State<LicensingService>,
    query: QueryParams,
    body: Bytes,
) -> Result<Response, ApiError> {
    let params = match read_params(query, &body) {
        Ok(params) => params,
        Err(e) => return Ok(invalid_request(e.message())),
    };
    match service
        .verify_license(params.email(), params.license_key.as_deref())
        .await
    {
        Ok(v) => Ok(Json(VerifyResponse {
            ok: true,
            status: v.status,
            expires_at: v.expires_at.map(millis),
            reason: v.reason,
            license_key: v.license_key,
        })
        .into_response()),
        Err(e) if e.is_validation() => Ok(invalid_request(e.client_message())),
        Err(e) => Err(e.into()),
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(ErrorResponse::new("Method not allowed")),
    )
        .into_response()
}

/// Build the HTTP API router over the given service.
pub fn build_router(service: LicensingService) -> Router {
    Router::new()
        .route(
            "/api/trial/start",
            post(start_trial_handler).fallback(method_not_allowed),
        )
        .route(
            "/api/license/activate",
            post(activate_handler).fallback(method_not_allowed),
        )
        .route(
            "/api/license/verify",
            post(verify_handler).fallback(method_not_allowed),
        )
        .with_state(service)
}
