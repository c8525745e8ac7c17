#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use guard_api::accounts::Account;
use guard_api::app::{app, AppState};
use guard_api::attendance::{AttendanceRecorder, LocalCalendar, ManualClock};
use guard_api::auth::password::hash_password;
use guard_api::auth::{Role, TokenCodec};
use guard_api::config::AppConfig;
use guard_api::database::MemoryStore;

pub const SECRET: &[u8] = b"integration-test-secret";
pub const STAFF_EMAIL: &str = "staff@school.test";
pub const STAFF_PASSWORD: &str = "staff-pass";
pub const PARENT_EMAIL: &str = "parent@school.test";
pub const PARENT_PASSWORD: &str = "parent-pass";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub codec: TokenCodec,
    pub staff: Account,
    pub parent: Account,
}

/// Wednesday 2024-03-06, 08:15 UTC
pub fn school_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 6, 8, 15, 0).unwrap()
}

pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(AppConfig::development()).await
}

pub async fn spawn_app_with(config: AppConfig) -> Result<TestApp> {
    let store = Arc::new(MemoryStore::new());
    let staff = store
        .add_account(Role::Staff, STAFF_EMAIL, &hash_password(STAFF_PASSWORD).unwrap())
        .await;
    let parent = store
        .add_account(Role::Parent, PARENT_EMAIL, &hash_password(PARENT_PASSWORD).unwrap())
        .await;

    let clock = Arc::new(ManualClock::new(school_morning()));
    let state = AppState {
        codec: Arc::new(TokenCodec::new(SECRET)),
        recorder: Arc::new(AttendanceRecorder::new(store.clone(), clock.clone(), LocalCalendar::utc())),
        accounts: store.clone(),
        pool: None,
    };

    Ok(TestApp {
        router: app(state, &config),
        store,
        clock,
        codec: TokenCodec::new(SECRET),
        staff,
        parent,
    })
}

impl TestApp {
    pub fn token(&self, role: &str, id: &str) -> String {
        self.codec.issue(role, id, None).unwrap()
    }

    pub fn staff_token(&self) -> String {
        self.token("staff", &self.staff.id.to_string())
    }

    pub fn parent_token(&self) -> String {
        self.token("parent", &self.parent.id.to_string())
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Ok((status, body))
    }
}
