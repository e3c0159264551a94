use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;

use kernel::model::id::BookId;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::book::{BookListQuery, BookResponse, CreateBookRequest, PaginatedBookResponse},
};

// 蔵書の登録は管理者のみ
pub async fn register_book(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookRequest>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    if !user.is_admin() {
        return Err(AppError::ForbiddenOperation);
    }
    req.validate(&())?;

    let book = registry.book_repository().create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

pub async fn show_book_list(
    Query(query): Query<BookListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaginatedBookResponse>> {
    query.validate(&())?;

    let list = registry.book_repository().find_all(query.into()).await?;
    Ok(Json(list.into()))
}

pub async fn show_book(
    Path(book_id): Path<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookResponse>> {
    let book = registry
        .book_repository()
        .find_by_id(book_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound("指定された蔵書が見つかりません".into()))?;
    Ok(Json(book.into()))
}
