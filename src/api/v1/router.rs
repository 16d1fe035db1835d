use super::error::*;
use super::handler::{self, ActivitiesQuery, CallbackQuery, ChatRequest};
use crate::domain_model::{AccessToken, SessionId};
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

const CHAT_BODY_LIMIT: u64 = 256 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let cookie_name = server.sign_in.cookie_name.clone();

    let sign_in = warp::get()
        .and(warp::path!("auth" / "signin"))
        .and(with(server.clone()))
        .and_then(handler::sign_in);

    let callback = warp::get()
        .and(warp::path!("auth" / "callback"))
        .and(warp::query::<CallbackQuery>())
        .and(with_session(cookie_name.clone()))
        .and(with(server.clone()))
        .and_then(handler::callback);

    let sign_out = warp::get()
        .and(warp::path!("auth" / "signout"))
        .and(with_session(cookie_name.clone()))
        .and(with(server.clone()))
        .and_then(handler::sign_out);

    let session = warp::get()
        .and(warp::path!("session"))
        .and(with_session(cookie_name))
        .and(with(server.clone()))
        .and_then(handler::session_status);

    // TODO: per-session rate limit before this reaches the upstream API quota
    let activities = warp::get()
        .and(warp::path!("activities"))
        .and(warp::query::<ActivitiesQuery>())
        .and(with_access_token(server.clone()))
        .and(with(server.clone()))
        .and_then(handler::list_activities);

    let chat = warp::post()
        .and(warp::path!("chat"))
        .and(with_access_token(server.clone()))
        .and(warp::body::content_length_limit(CHAT_BODY_LIMIT))
        .and(warp::body::json::<ChatRequest>())
        .and(with(server))
        .and_then(handler::chat);

    sign_in
        .or(callback)
        .or(sign_out)
        .or(session)
        .or(activities)
        .or(chat)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_session(
    cookie_name: String,
) -> impl Filter<Extract = (Option<SessionId>,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>("cookie").map(
        move |raw: Option<String>| {
            raw.and_then(|raw| find_cookie(&raw, &cookie_name))
                .map(SessionId)
        },
    )
}

/// Resolves the request's session into a live access token, refreshing it if needed.
/// Requests without a usable session are rejected towards sign-in.
fn with_access_token(
    server: Arc<Server>,
) -> impl Filter<Extract = (AccessToken,), Error = warp::Rejection> + Clone {
    with_session(server.sign_in.cookie_name.clone()).and_then(move |session: Option<SessionId>| {
        let accessor = server.accessor.clone();
        async move {
            let session = session.ok_or_else(|| reject::custom(ApiErrorCode::SignInRequired))?;
            accessor
                .current_token(&session)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}

fn find_cookie(raw: &str, name: &str) -> Option<String> {
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
