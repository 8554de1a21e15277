use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::{header::CONTENT_TYPE, HeaderValue},
    Form, Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Request body from either a JSON client or an HTML form post.
///
/// A body that fails to parse yields `T::default()`, which the services
/// then reject as missing fields.
pub struct Payload<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(mut req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_form_content_type);

        // Rejection texts quote the offending value, which may be a password,
        // so only the status is logged.
        let parsed = if is_form {
            // Form matches the header byte-for-byte
            req.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(v)| v)
                .map_err(|e| ("form", e.status()))
        } else {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(v)| v)
                .map_err(|e| ("json", e.status()))
        };

        match parsed {
            Ok(v) => Ok(Payload(v)),
            Err((format, status)) => {
                debug!(format, %status, "unreadable request body");
                Ok(Payload(T::default()))
            }
        }
    }
}

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Media type comparison ignoring case and parameters such as `charset`.
fn is_form_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}
