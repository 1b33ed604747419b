use crate::helper_model;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

pub fn error_body(title: &str, message: &str) -> helper_model::ErrorResponse {
    helper_model::ErrorResponse {
        title: title.to_string(),
        message: message.to_string(),
    }
}

pub fn method_not_allowed_response() -> Result<(warp::reply::Response,), Rejection> {
    let msg = error_body("Method Not Allowed", "This route only accepts POST requests.");
    Ok((warp::reply::with_status(
        warp::reply::json(&msg),
        StatusCode::METHOD_NOT_ALLOWED,
    )
    .into_response(),))
}

pub fn session_not_found() -> Result<(warp::reply::Response,), Rejection> {
    let msg = error_body("Session Not Found", "This booking session has expired or was already submitted. Please start again.");
    Ok((warp::reply::with_status(warp::reply::json(&msg), StatusCode::NOT_FOUND).into_response(),))
}

pub fn submission_in_progress() -> Result<(warp::reply::Response,), Rejection> {
    let msg = error_body("Submission In Progress", "This booking is already being submitted.");
    Ok((warp::reply::with_status(warp::reply::json(&msg), StatusCode::CONFLICT).into_response(),))
}

pub fn submission_rejected(
    error: &helper_model::BackendError,
    session: crate::methods::session::SessionSnapshot,
) -> Result<(warp::reply::Response,), Rejection> {
    let body = helper_model::SubmissionRejected {
        error: error_body("Booking Not Created", &error.user_message()),
        session,
    };
    Ok((warp::reply::with_status(warp::reply::json(&body), StatusCode::BAD_GATEWAY).into_response(),))
}

pub fn validation_failed(
    error: &helper_model::ValidationError,
    session: crate::methods::session::SessionSnapshot,
) -> Result<(warp::reply::Response,), Rejection> {
    let body = helper_model::SubmissionRejected {
        error: error_body("Booking Incomplete", &error.to_string()),
        session,
    };
    Ok((warp::reply::with_status(warp::reply::json(&body), StatusCode::UNPROCESSABLE_ENTITY).into_response(),))
}

pub fn response_with_obj<T>(obj: T, status_code: StatusCode)
    -> Result<(warp::reply::Response,), Rejection> where T: serde::Serialize {
    Ok((warp::reply::with_status(warp::reply::json(&obj), status_code).into_response(),))
}
