//! JSON body extractor that runs `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use planner_core::error::AppError;

use crate::error::ApiError;

/// Like [`Json`], but malformed bodies and failed validation rules both
/// become 400 responses in the standard error shape.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(format!("Invalid request body: {}", e.body_text())))?;

        value.validate().map_err(|errors| {
            let details = serde_json::to_value(&errors).unwrap_or_default();
            AppError::validation("Request validation failed").with_details(details)
        })?;

        Ok(Self(value))
    }
}
