use bookshelf_dal::book::BookRepository;

use crate::state::AppState;
use axum::routing::get;

crate::repository_from_request!(BookRepository);

pub mod crud_api {
    use super::*;
    use crate::error::ApiResult;
    use crate::validate::{ApiJson, Checked};
    use axum::{
        extract::{Path, State},
        response::IntoResponse,
        Json,
    };
    #[allow(unused_imports)]
    use bookshelf_dal::book::{Book, CreateBook};
    use bookshelf_dal::validation::Check as _;
    use http::{header, StatusCode};
    use tracing::debug;
    use uuid::Uuid;

    #[cfg_attr(feature = "openapi",  utoipa::path(post, path = "", tag = "Book", operation_id = "createBook",
    request_body = CreateBook,
    responses((status = StatusCode::CREATED, description = "Created Book", body = Book),
    (status = StatusCode::BAD_REQUEST, description = "Invalid book", body = String),
    (status = StatusCode::CONFLICT, description = "Same title and author already exists", body = String))))]
    pub async fn create(
        repository: BookRepository,
        State(state): State<AppState>,
        Checked(ApiJson(payload)): Checked<ApiJson<CreateBook>>,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.create(payload).await?;
        let location = state.build_url(&format!("api/books/{}", record.id))?;

        Ok((
            StatusCode::CREATED,
            [(header::LOCATION, location.to_string())],
            Json(record),
        ))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "", tag = "Book", operation_id = "listBook",
    responses((status = StatusCode::OK, description = "All books, oldest first", body = Vec<Book>))))]
    pub async fn list(repository: BookRepository) -> ApiResult<impl IntoResponse> {
        let books = repository.list().await?;
        debug!("Listing {} books", books.len());
        Ok((StatusCode::OK, Json(books)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(get, path = "/{id}", tag = "Book", operation_id = "getBook",
    params(("id" = Uuid, Path, description = "Book id")),
    responses((status = StatusCode::OK, description = "Get one", body = Book),
    (status = StatusCode::NOT_FOUND, description = "Unknown id", body = String))))]
    pub async fn get(
        Path(id): Path<Uuid>,
        repository: BookRepository,
    ) -> ApiResult<impl IntoResponse> {
        let record = repository.get(id).await?;

        Ok((StatusCode::OK, Json(record)))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(put, path = "/{id}", tag = "Book", operation_id = "updateBook",
    params(("id" = Uuid, Path, description = "Book id")),
    request_body = CreateBook,
    responses((status = StatusCode::NO_CONTENT, description = "Updated"),
    (status = StatusCode::BAD_REQUEST, description = "Invalid book", body = String),
    (status = StatusCode::NOT_FOUND, description = "Unknown id", body = String))))]
    pub async fn update(
        Path(id): Path<Uuid>,
        repository: BookRepository,
        ApiJson(payload): ApiJson<CreateBook>,
    ) -> ApiResult<impl IntoResponse> {
        // unknown id is reported before an invalid payload
        repository.get(id).await?;
        payload.check()?;
        repository.update(id, payload).await?;

        Ok((StatusCode::NO_CONTENT, ()))
    }

    #[cfg_attr(feature = "openapi",  utoipa::path(delete, path = "/{id}", tag = "Book", operation_id = "deleteBook",
    params(("id" = Uuid, Path, description = "Book id")),
    responses((status = StatusCode::NO_CONTENT, description = "Deleted"),
    (status = StatusCode::NOT_FOUND, description = "Unknown id", body = String))))]
    pub async fn delete(
        Path(id): Path<Uuid>,
        repository: BookRepository,
    ) -> ApiResult<impl IntoResponse> {
        repository.delete(id).await?;

        Ok((StatusCode::NO_CONTENT, ()))
    }

    #[cfg(feature = "openapi")]
    #[derive(utoipa::OpenApi)]
    #[openapi(paths(create, list, get, update, delete))]
    struct ApiDocs;

    #[cfg(feature = "openapi")]
    pub(super) fn api_docs() -> utoipa::openapi::OpenApi {
        use utoipa::OpenApi as _;
        ApiDocs::openapi()
    }
}

#[cfg(feature = "openapi")]
pub fn api_docs() -> utoipa::openapi::OpenApi {
    crud_api::api_docs()
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(crud_api::list).post(crud_api::create))
        .route(
            "/{id}",
            get(crud_api::get)
                .put(crud_api::update)
                .delete(crud_api::delete),
        )
}
