use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use tollgate_core::ServiceError;

/// `Json<T>` whose rejections (bad syntax, wrong content type, missing
/// fields) are returned as `ServiceError` bodies.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
