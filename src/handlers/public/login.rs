use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::accounts::authenticate;
use crate::app::AppState;
use crate::auth::token::TOKEN_VALIDITY_HOURS;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: String,
    pub id: String,
    pub expires_in: i64,
}

/// POST /login - exchange email and password for a 24 hour token
///
/// Staff accounts are tried before parent accounts. The token's `type` claim
/// is the role that matched.
pub async fn post(
    Extension(state): Extension<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let Some((role, account)) = authenticate(state.accounts.as_ref(), payload.email.trim(), &payload.password).await?
    else {
        warn!("Failed login for {}", payload.email);
        return Err(ApiError::unauthorized("invalid email or password"));
    };

    let id = account.id.to_string();
    let token = state.codec.issue(role.as_str(), &id, None)?;
    info!("Issued {} token for {}", role, id);

    Ok(ApiResponse::success(LoginResponse {
        token,
        role: role.as_str().to_string(),
        id,
        expires_in: TOKEN_VALIDITY_HOURS * 3600,
    }))
}
