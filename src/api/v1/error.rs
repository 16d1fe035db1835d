use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::domain_port::{ActivitySourceError, ChatModelError};
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::{StatusCode, Uri};
use warp::reply::Response;
use warp::{Rejection, Reply, reject};

pub const SIGN_IN_PATH: &str = "/api/v1/auth/signin";

pub async fn recover_error(err: Rejection) -> Result<Response, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        if matches!(err, ApiErrorCode::SignInRequired) {
            return Ok(warp::redirect::see_other(Uri::from_static(SIGN_IN_PATH)).into_response());
        }
        return Ok(error_reply(err.clone(), err.to_string()));
    }

    if err.is_not_found() {
        return Ok(error_reply(ApiErrorCode::NotFound, "Not found"));
    }
    if let Some(e) = err.find::<reject::InvalidQuery>() {
        return Ok(error_reply(ApiErrorCode::BadRequest, e.to_string()));
    }
    if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(error_reply(ApiErrorCode::BadRequest, e.to_string()));
    }
    if err.find::<reject::PayloadTooLarge>().is_some() {
        return Ok(error_reply(ApiErrorCode::PayloadTooLarge, "Payload too large"));
    }
    if err.find::<reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(ApiErrorCode::MethodNotAllowed, "Method not allowed"));
    }

    Ok(error_reply(
        ApiErrorCode::InternalError,
        format!("Unhandled error: {:?}", err),
    ))
}

fn error_reply(code: ApiErrorCode, message: impl Into<String>) -> Response {
    let status = code.status();
    let json = warp::reply::json(&ApiResponse::<()>::err(code, message));
    warp::reply::with_status(json, status).into_response()
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Sign in required")]
    SignInRequired,
    #[error("Sign-in state does not match this session")]
    InvalidState,
    #[error("Sign-in was not completed")]
    SignInFailed,
    #[error("No such ISO week")]
    InvalidWeek,
    #[error("Activity provider unavailable")]
    UpstreamUnavailable,
    #[error("Coach unavailable")]
    ChatUnavailable,
    #[error("Server is shutting down")]
    ShuttingDown,
    #[error("Bad request")]
    BadRequest,
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("Not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::SignInRequired => StatusCode::SEE_OTHER,
            ApiErrorCode::InvalidState | ApiErrorCode::InvalidWeek | ApiErrorCode::BadRequest => {
                StatusCode::BAD_REQUEST
            }
            ApiErrorCode::SignInFailed => StatusCode::UNAUTHORIZED,
            ApiErrorCode::UpstreamUnavailable | ApiErrorCode::ChatUnavailable => {
                StatusCode::BAD_GATEWAY
            }
            ApiErrorCode::ShuttingDown => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<SessionError> for ApiErrorCode {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Unauthenticated | SessionError::RefreshFailed(_) => {
                ApiErrorCode::SignInRequired
            }
            SessionError::SignInFailed(_) => ApiErrorCode::SignInFailed,
            SessionError::Cancelled => ApiErrorCode::ShuttingDown,
            SessionError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<ActivitySourceError> for ApiErrorCode {
    fn from(error: ActivitySourceError) -> Self {
        match error {
            ActivitySourceError::Unauthorized => ApiErrorCode::SignInRequired,
            e => {
                warn!("activity fetch failed: {}", e);
                ApiErrorCode::UpstreamUnavailable
            }
        }
    }
}

impl From<ChatModelError> for ApiErrorCode {
    fn from(error: ChatModelError) -> Self {
        warn!("chat model failed: {}", error);
        ApiErrorCode::ChatUnavailable
    }
}
