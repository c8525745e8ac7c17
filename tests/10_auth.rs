mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::{json, Map, Value};

use common::{spawn_app, PARENT_EMAIL, PARENT_PASSWORD, STAFF_EMAIL, STAFF_PASSWORD};

#[tokio::test]
async fn health_reports_memory_backend() -> Result<()> {
    let app = spawn_app().await?;
    let (status, body) = app.get("/health", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], "memory");
    Ok(())
}

#[tokio::test]
async fn staff_login_issues_staff_token() -> Result<()> {
    let app = spawn_app().await?;
    let (status, body) = app
        .post("/login", None, json!({ "email": STAFF_EMAIL, "password": STAFF_PASSWORD }))
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["role"], "staff");
    assert_eq!(body["data"]["id"], app.staff.id.to_string());
    assert_eq!(body["data"]["expires_in"], 24 * 3600);

    let token = body["data"]["token"].as_str().unwrap_or_default();
    let claims = app.codec.validate_strict(token)?;
    assert_eq!(claims.subject_role, "staff");
    assert_eq!(claims.subject_id, app.staff.id.to_string());
    Ok(())
}

#[tokio::test]
async fn parent_login_ignores_email_case() -> Result<()> {
    let app = spawn_app().await?;
    let (status, body) = app
        .post(
            "/login",
            None,
            json!({ "email": PARENT_EMAIL.to_uppercase(), "password": PARENT_PASSWORD }),
        )
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "parent");
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() -> Result<()> {
    let app = spawn_app().await?;

    let (status, body) = app
        .post("/login", None, json!({ "email": STAFF_EMAIL, "password": "wrong" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app
        .post("/login", None, json!({ "email": "ghost@school.test", "password": STAFF_PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/login", None, json!({ "email": " ", "password": "" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn whoami_echoes_identity() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.parent_token();

    let (status, body) = app.get("/api/whoami", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], app.parent.id.to_string());
    assert_eq!(body["data"]["role"], "parent");
    assert!(body["data"]["expires_at"].is_string());
    Ok(())
}

#[tokio::test]
async fn anonymous_and_garbage_tokens_have_no_identity() -> Result<()> {
    let app = spawn_app().await?;

    let (status, body) = app.get("/api/whoami", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "no identity in context, try logging in again");

    let (status, _) = app.get("/api/whoami", Some("not.a.token")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = guard_api::auth::TokenCodec::new(b"someone-else").issue("staff", "T1", None)?;
    let (status, _) = app.get("/api/whoami", Some(&forged)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unknown_role_is_forbidden() -> Result<()> {
    let app = spawn_app().await?;
    let token = app.token("visitor", "V1");

    let (status, body) = app.get("/api/whoami", Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "visitor is not allowed");
    Ok(())
}

#[tokio::test]
async fn expired_token_fails_strict_check_only() -> Result<()> {
    let app = spawn_app().await?;
    let mut extensions = Map::new();
    extensions.insert("exp".to_string(), Value::from(Utc::now().timestamp() - 60));
    let stale = app.codec.issue("staff", &app.staff.id.to_string(), Some(&extensions))?;

    // whoami re-validates strictly
    let (status, body) = app.get("/api/whoami", Some(&stale)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "token has expired");

    // routes behind the optimistic context still accept it
    let (status, _) = app.get("/api/arrivals/school/today", Some(&stale)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
