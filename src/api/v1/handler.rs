use super::error::*;
use crate::domain_model::{
    AccessToken, ChatMessage, ChatPrompt, SessionId, SessionStatus, WeekRange,
};
use crate::logger::*;
use crate::server::{Server, SignInOptions};
use chrono::{DateTime, Datelike, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::Uri;
use warp::http::header::{CONTENT_TYPE, SET_COOKIE};
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

// region sign-in

pub async fn sign_in(server: Arc<Server>) -> Result<impl warp::Reply, warp::Rejection> {
    let session = SessionId::generate();
    let state = server
        .state_signer
        .sign(&session)
        .map_err(ApiErrorCode::internal)
        .map_err(reject::custom)?;
    let location = authorize_url(&server.sign_in, &state)
        .map_err(ApiErrorCode::internal)
        .map_err(reject::custom)?;

    debug!(%session, "redirecting to provider authorization");
    Ok(warp::reply::with_header(
        warp::redirect::see_other(location),
        SET_COOKIE,
        session_cookie(&server.sign_in, &session),
    ))
}

fn authorize_url(options: &SignInOptions, state: &str) -> anyhow::Result<Uri> {
    let url = reqwest::Url::parse_with_params(
        &options.authorize_url,
        &[
            ("client_id", options.client_id.as_str()),
            ("redirect_uri", options.redirect_url.as_str()),
            ("response_type", "code"),
            ("approval_prompt", "auto"),
            ("scope", options.scope.as_str()),
            ("state", state),
        ],
    )?;
    Ok(url.as_str().parse::<Uri>()?)
}

fn session_cookie(options: &SignInOptions, session: &SessionId) -> String {
    let secure = if options.secure_cookie { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax{}",
        options.cookie_name, session, secure
    )
}

fn expired_cookie(options: &SignInOptions) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", options.cookie_name)
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn callback(
    query: CallbackQuery,
    session: Option<SessionId>,
    server: Arc<Server>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if let Some(error) = query.error {
        warn!(error = %error, "provider did not authorize");
        return Err(reject::custom(ApiErrorCode::SignInFailed));
    }
    let session = session.ok_or_else(|| reject::custom(ApiErrorCode::SignInRequired))?;
    let state = query.state.unwrap_or_default();
    if !server.state_signer.verify(&session, &state) {
        warn!(%session, "sign-in state mismatch");
        return Err(reject::custom(ApiErrorCode::InvalidState));
    }

    server
        .authenticator
        .sign_in(&session, query.code.as_deref().unwrap_or_default())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::redirect::see_other(Uri::from_static("/")))
}

pub async fn sign_out(
    session: Option<SessionId>,
    server: Arc<Server>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if let Some(session) = session {
        server
            .authenticator
            .sign_out(&session)
            .await
            .map_err(ApiErrorCode::from)
            .map_err(reject::custom)?;
    }

    Ok(warp::reply::with_header(
        warp::redirect::see_other(Uri::from_static("/")),
        SET_COOKIE,
        expired_cookie(&server.sign_in),
    ))
}

// endregion

pub async fn session_status(
    session: Option<SessionId>,
    server: Arc<Server>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let status: SessionStatus = server
        .accessor
        .status(session.as_ref())
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(status)))
}

// region activities

#[derive(Debug, Deserialize)]
pub struct ActivitiesQuery {
    pub year: Option<i32>,
    pub week: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ActivitiesResponse {
    pub week: WeekRange,
    pub activities: serde_json::Value,
}

pub async fn list_activities(
    query: ActivitiesQuery,
    token: AccessToken,
    server: Arc<Server>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let range = week_range(&query, server.clock.now())
        .ok_or_else(|| reject::custom(ApiErrorCode::InvalidWeek))?;

    let activities = server
        .activity_source
        .list_activities(&token, &range)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(ActivitiesResponse {
        week: range,
        activities,
    })))
}

/// No parameters means the current week; a week alone is taken in the current ISO year.
fn week_range(query: &ActivitiesQuery, now: DateTime<Utc>) -> Option<WeekRange> {
    match (query.year, query.week) {
        (None, None) => Some(WeekRange::containing(now)),
        (year, Some(week)) => {
            WeekRange::iso(year.unwrap_or_else(|| now.iso_week().year()), week)
        }
        (Some(_), None) => None,
    }
}

// endregion

// region chat

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// The week the user is looking at. Without it the current week is fetched.
    #[serde(default)]
    pub activities: Option<serde_json::Value>,
}

/// Streams the coach's reply as plain UTF-8 text.
pub async fn chat(
    token: AccessToken,
    request: ChatRequest,
    server: Arc<Server>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let activities = match request.activities {
        Some(activities) => activities,
        None => server
            .activity_source
            .list_activities(&token, &WeekRange::containing(server.clock.now()))
            .await
            .map_err(ApiErrorCode::from)
            .map_err(reject::custom)?,
    };
    let prompt = ChatPrompt::week_review(request.messages, &activities);

    let reply = server
        .chat_model
        .stream_reply(&prompt)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?
        .inspect(|piece| {
            if let Err(e) = piece {
                warn!(error = %e, "chat reply cut short");
            }
        });

    Ok(warp::reply::with_header(
        warp::reply::Response::new(warp::hyper::Body::wrap_stream(reply)),
        CONTENT_TYPE,
        "text/plain; charset=utf-8",
    ))
}

// endregion
