use axum::{extract::Path, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::attendance::{ArrivalKind, ArrivalRecord, RecordOutcome};
use crate::auth::{authorize, AllowList, AuthContext, Role};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ArrivalRequest {
    /// Defaults to the caller. When given it must be the caller.
    #[serde(default, alias = "actorId")]
    pub actor_id: Option<String>,
    #[serde(alias = "subjectId", alias = "studentId")]
    pub student_id: String,
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Serialize)]
pub struct RecordedArrival {
    #[serde(flatten)]
    pub record: ArrivalRecord,
    pub outcome: RecordOutcome,
}

type Caller = Option<Extension<AuthContext>>;

fn context(ctx: &Caller) -> Option<&AuthContext> {
    ctx.as_ref().map(|Extension(c)| c)
}

/// POST /api/arrivals/home - a parent confirms a student got home
pub async fn home_post(
    Extension(state): Extension<AppState>,
    ctx: Caller,
    Json(payload): Json<ArrivalRequest>,
) -> ApiResult<RecordedArrival> {
    let caller = authorize(context(&ctx), AllowList::PARENT_ONLY)?;
    record(&state, ArrivalKind::Home, caller, payload).await
}

/// POST /api/arrivals/school - a staff member confirms a student reached school
pub async fn school_post(
    Extension(state): Extension<AppState>,
    ctx: Caller,
    Json(payload): Json<ArrivalRequest>,
) -> ApiResult<RecordedArrival> {
    let caller = authorize(context(&ctx), AllowList::STAFF_ONLY)?;
    record(&state, ArrivalKind::School, caller, payload).await
}

async fn record(
    state: &AppState,
    kind: ArrivalKind,
    caller: &AuthContext,
    payload: ArrivalRequest,
) -> ApiResult<RecordedArrival> {
    let actor_id = match payload.actor_id.as_deref() {
        None => caller.subject_id(),
        Some(actor_id) if actor_id == caller.subject_id() => actor_id,
        Some(_) => {
            return Err(ApiError::forbidden(
                "arrivals can only be recorded for the calling account",
            ))
        }
    };

    let recorded = state
        .recorder
        .record_confirmation(kind, actor_id, &payload.student_id, payload.confirmed)
        .await?;

    let outcome = recorded.outcome;
    let body = RecordedArrival {
        record: recorded.record,
        outcome,
    };
    Ok(match outcome {
        RecordOutcome::Created => ApiResponse::created(body),
        RecordOutcome::Updated => ApiResponse::success(body),
    })
}

/// GET /api/arrivals/:kind/today - every record for today
pub async fn today_get(
    Extension(state): Extension<AppState>,
    ctx: Caller,
    Path(kind): Path<ArrivalKind>,
) -> ApiResult<Vec<ArrivalRecord>> {
    authorize(context(&ctx), AllowList::GENERAL_ACCESS)?;
    let records = state.recorder.query_by_day(kind, state.recorder.today()).await?;
    Ok(ApiResponse::success(records))
}

/// GET /api/arrivals/:kind/today/:actor_id - one actor's records for today
pub async fn today_actor_get(
    Extension(state): Extension<AppState>,
    ctx: Caller,
    Path((kind, actor_id)): Path<(ArrivalKind, String)>,
) -> ApiResult<Vec<ArrivalRecord>> {
    let caller = authorize(context(&ctx), AllowList::STAFF_OR_PARENT)?;
    ensure_own_records(caller, &actor_id)?;

    let records = state
        .recorder
        .query_by_actor_and_day(kind, &actor_id, state.recorder.today())
        .await?;
    Ok(ApiResponse::success(records))
}

/// GET /api/arrivals/:kind/week - every record for the current week
pub async fn week_get(
    Extension(state): Extension<AppState>,
    ctx: Caller,
    Path(kind): Path<ArrivalKind>,
) -> ApiResult<Vec<ArrivalRecord>> {
    authorize(context(&ctx), AllowList::STAFF_ONLY)?;
    let records = state.recorder.query_week(kind, None, state.recorder.today()).await?;
    Ok(ApiResponse::success(records))
}

/// GET /api/arrivals/:kind/week/:actor_id - one actor's records for the current week
pub async fn week_actor_get(
    Extension(state): Extension<AppState>,
    ctx: Caller,
    Path((kind, actor_id)): Path<(ArrivalKind, String)>,
) -> ApiResult<Vec<ArrivalRecord>> {
    let caller = authorize(context(&ctx), AllowList::STAFF_OR_PARENT)?;
    ensure_own_records(caller, &actor_id)?;

    let records = state
        .recorder
        .query_week(kind, Some(&actor_id), state.recorder.today())
        .await?;
    Ok(ApiResponse::success(records))
}

/// Parents may only read their own records; staff may read anyone's.
fn ensure_own_records(caller: &AuthContext, actor_id: &str) -> Result<(), ApiError> {
    if caller.role() == Some(Role::Parent) && caller.subject_id() != actor_id {
        return Err(ApiError::forbidden("parents can only read their own arrivals"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accepts_both_spellings() {
        let camel: ArrivalRequest =
            serde_json::from_str(r#"{"actorId":"P1","subjectId":"S1","confirmed":true}"#).unwrap();
        assert_eq!(camel.actor_id.as_deref(), Some("P1"));
        assert_eq!(camel.student_id, "S1");
        assert!(camel.confirmed);

        let snake: ArrivalRequest = serde_json::from_str(r#"{"student_id":"S2"}"#).unwrap();
        assert_eq!(snake.actor_id, None);
        assert!(!snake.confirmed);
    }

    #[test]
    fn parents_are_limited_to_their_own_id() {
        let parent = AuthContext::new("P1", "parent");
        assert!(ensure_own_records(&parent, "P1").is_ok());
        assert!(ensure_own_records(&parent, "P2").is_err());

        let staff = AuthContext::new("T1", "staff");
        assert!(ensure_own_records(&staff, "P2").is_ok());
    }
}
