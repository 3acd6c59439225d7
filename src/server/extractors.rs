//! Axum extractors whose rejections use the API error envelope.

use axum::extract::{FromRequest, FromRequestParts, Path, Query};
use axum::Json;

use super::error::ApiError;

/// Path parameters. Anything that does not parse is a missing resource.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// JSON body. A missing or malformed body is unprocessable.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
