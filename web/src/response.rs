//! Success response shapes.
//!
//! | Outcome | Status | Body |
//! |---|---|---|
//! | write succeeded | 201 | `{"result": "success"}` |
//! | yes/no lookup | 200 | `{"result": true}` |
//! | listing | 200 | JSON array (plain `Json<Vec<T>>`) |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ResultBody<T> {
    result: T,
}

/// A write that succeeded: `201 {"result": "success"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Created;

impl IntoResponse for Created {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(ResultBody { result: "success" })).into_response()
    }
}

/// Answer to a yes/no lookup: `200 {"result": <bool>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flag(pub bool);

impl IntoResponse for Flag {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(ResultBody { result: self.0 })).into_response()
    }
}
