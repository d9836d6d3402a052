use axum::{
    extract::{FromRequestParts, rejection::{PathRejection, QueryRejection}},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// `axum::extract::Path` that rejects with the JSON error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) = axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Path(value))
    }
}

/// `axum::extract::Query` that rejects with the JSON error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) = axum::extract::Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Query(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;
    use crate::routes::params::SearchQuery;

    #[tokio::test]
    async fn bad_query_becomes_bad_request() {
        let (mut parts, _) = Request::builder()
            .uri("/categories?page=x")
            .body(())
            .unwrap()
            .into_parts();
        let err = Query::<SearchQuery>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn good_query_passes_through() {
        let (mut parts, _) = Request::builder()
            .uri("/categories?page=2&q=robe")
            .body(())
            .unwrap()
            .into_parts();
        let Query(query) = Query::<SearchQuery>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.q.as_deref(), Some("robe"));
    }
}
