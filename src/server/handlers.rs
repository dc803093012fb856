use crate::core::session::Action;
use crate::errors::{AppError, AppResult};
use crate::export::{ExportFormat, Period, file_name};
use crate::models::settings::SettingsUpdate;
use crate::server::auth::{AuthUser, SESSION_COOKIE, session_token};
use crate::server::response::{OkResponse, ok};
use crate::server::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Run blocking tracker work (SQLite, per-user locks) off the async workers.
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Other(format!("worker task failed: {e}")))?
}

#[derive(Serialize)]
struct HealthInfo {
    service: &'static str,
    version: &'static str,
}

pub async fn health() -> impl IntoResponse {
    Json(OkResponse {
        ok: true,
        data: Some(HealthInfo {
            service: "rtimetracker",
            version: env!("CARGO_PKG_VERSION"),
        }),
    })
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginInfo {
    username: String,
}

pub async fn login(State(state): State<AppState>, Json(form): Json<LoginForm>) -> AppResult<Response> {
    let tracker = state.tracker.clone();
    let username = form.username.clone();
    blocking(move || tracker.login(&form.username, &form.password)).await?;

    let token = state.sessions.create(&username, state.tracker.clock().now());
    let cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        state.sessions.ttl().num_seconds()
    );
    info!(user = %username, "logged in");

    Ok((
        [(SET_COOKIE, cookie)],
        Json(OkResponse {
            ok: true,
            data: Some(LoginInfo { username }),
        }),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(token);
    }

    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0");
    (
        [(SET_COOKIE, cookie)],
        Json(OkResponse::<()> { ok: true, data: None }),
    )
        .into_response()
}

pub async fn dashboard(State(state): State<AppState>, AuthUser(user): AuthUser) -> AppResult<Response> {
    let tracker = state.tracker.clone();
    let view = blocking(move || tracker.dashboard(&user)).await?;
    Ok(ok(view))
}

async fn act(state: AppState, user: String, action: Action) -> AppResult<Response> {
    let tracker = state.tracker.clone();
    let report = blocking(move || tracker.apply(&user, action)).await?;
    Ok(ok(report))
}

pub async fn start(State(state): State<AppState>, AuthUser(user): AuthUser) -> AppResult<Response> {
    act(state, user, Action::Start).await
}

pub async fn stop(State(state): State<AppState>, AuthUser(user): AuthUser) -> AppResult<Response> {
    act(state, user, Action::Stop).await
}

pub async fn break_start(State(state): State<AppState>, AuthUser(user): AuthUser) -> AppResult<Response> {
    act(state, user, Action::BreakStart).await
}

pub async fn break_end(State(state): State<AppState>, AuthUser(user): AuthUser) -> AppResult<Response> {
    act(state, user, Action::BreakEnd).await
}

pub async fn history(State(state): State<AppState>, AuthUser(user): AuthUser) -> AppResult<Response> {
    let tracker = state.tracker.clone();
    let view = blocking(move || tracker.history(&user)).await?;
    Ok(ok(view))
}

pub async fn get_settings(State(state): State<AppState>, AuthUser(user): AuthUser) -> AppResult<Response> {
    let tracker = state.tracker.clone();
    let settings = blocking(move || tracker.settings(&user)).await?;
    Ok(ok(settings))
}

pub async fn post_settings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(update): Json<SettingsUpdate>,
) -> AppResult<Response> {
    let tracker = state.tracker.clone();
    let settings = blocking(move || tracker.update_settings(&user, &update)).await?;
    Ok(ok(settings))
}

/// Raw query strings, parsed by hand so bad values get our own 400 message.
#[derive(Deserialize)]
pub struct ExportQuery {
    pub period: Option<String>,
    pub format: Option<String>,
}

pub async fn export(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(q): Query<ExportQuery>,
) -> AppResult<Response> {
    let period = Period::parse(q.period.as_deref().unwrap_or_default())?;
    let format = match q.format.as_deref() {
        Some(f) => ExportFormat::parse(f)?,
        None => ExportFormat::default(),
    };

    let tracker = state.tracker.clone();
    let (name, body) = blocking(move || {
        let report = tracker.report(&user, period)?;
        let body = format.render(&report)?;
        Ok((file_name(&report, format), body))
    })
    .await?;

    let disposition = format!("attachment; filename=\"{name}\"");
    Ok((
        [
            (CONTENT_TYPE, format.content_type().to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
