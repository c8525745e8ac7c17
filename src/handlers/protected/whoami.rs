use axum::{http::HeaderMap, Extension};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::app::AppState;
use crate::auth::{authorize, AllowList, AuthContext};
use crate::error::ApiError;
use crate::middleware::{bearer_token, ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub id: String,
    pub role: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Non-reserved claims carried by the token.
    pub claims: Map<String, Value>,
}

/// GET /api/whoami - the caller's identity, re-checked strictly
///
/// Unlike the other protected routes this one rejects an expired token.
pub async fn get(
    Extension(state): Extension<AppState>,
    ctx: Option<Extension<AuthContext>>,
    headers: HeaderMap,
) -> ApiResult<WhoAmI> {
    authorize(ctx.as_ref().map(|Extension(c)| c), AllowList::ANY_ROLE)?;

    let token = bearer_token(&headers).map_err(ApiError::unauthorized)?;
    let claims = state.codec.validate_strict(token)?;

    Ok(ApiResponse::success(WhoAmI {
        issued_at: claims.issued_at.and_then(|t| Utc.timestamp_opt(t, 0).single()),
        expires_at: claims.expires_at_utc(),
        id: claims.subject_id,
        role: claims.subject_role.to_lowercase(),
        claims: claims.extensions,
    }))
}
