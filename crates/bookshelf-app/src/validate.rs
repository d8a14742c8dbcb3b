use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use bookshelf_dal::validation::Check;
use http::StatusCode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body extractor whose rejections are [`ApiError`]s, so malformed or
/// incomplete bodies get a plain text 400.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl<T> Deref for ApiJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extractor wrapper which runs [`Check`] on the extracted payload.
///
/// A failed check is rejected with 400 and the reason as a plain text body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checked<E>(pub E);

impl<E> Deref for Checked<E> {
    type Target = E;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<E> DerefMut for Checked<E> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<E> Checked<E> {
    pub fn into_inner(self) -> E {
        self.0
    }
}

#[derive(Debug)]
pub enum CheckRejection<V, E> {
    /// Payload was extracted but did not pass the check
    Invalid(V),
    /// Inner extractor failed
    Inner(E),
}

impl<V: Display, E: Display> Display for CheckRejection<V, E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckRejection::Invalid(reason) => write!(f, "{reason}"),
            CheckRejection::Inner(error) => write!(f, "{error}"),
        }
    }
}

impl<V: Error + 'static, E: Error + 'static> Error for CheckRejection<V, E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CheckRejection::Invalid(reason) => Some(reason),
            CheckRejection::Inner(e) => Some(e),
        }
    }
}

impl<V: Display, E: IntoResponse> IntoResponse for CheckRejection<V, E> {
    fn into_response(self) -> Response {
        match self {
            CheckRejection::Invalid(reason) => {
                debug!("Payload rejected: {reason}");
                (StatusCode::BAD_REQUEST, reason.to_string()).into_response()
            }
            CheckRejection::Inner(e) => e.into_response(),
        }
    }
}

impl<Extractor, T> FromRequest<AppState> for Checked<Extractor>
where
    T: Check,
    T::Reason: Display,
    Extractor: Deref<Target = T> + FromRequest<AppState>,
{
    type Rejection = CheckRejection<T::Reason, <Extractor as FromRequest<AppState>>::Rejection>;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let inner = Extractor::from_request(req, state)
            .await
            .map_err(CheckRejection::Inner)?;

        inner.deref().check().map_err(CheckRejection::Invalid)?;
        Ok(Checked(inner))
    }
}
