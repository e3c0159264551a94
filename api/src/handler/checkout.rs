use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use kernel::model::{book::Book, id::BookId};
use registry::AppRegistry;
use shared::error::AppResult;

use crate::{
    extractor::AuthorizedUser,
    model::checkout::{CheckoutResponse, CheckoutsResponse},
};

pub async fn checkout_book(
    user: AuthorizedUser,
    Path(book_id): Path<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .circulation_service()
        .checkout_book(book_id, user.id())
        .await
        .map(|_| StatusCode::CREATED)
}

pub async fn return_book(
    user: AuthorizedUser,
    Path(book_id): Path<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .circulation_service()
        .return_book(book_id, user.id())
        .await
        .map(|_| StatusCode::OK)
}

// 自分が借りている蔵書の一覧
pub async fn show_checked_out_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<CheckoutsResponse>> {
    let checkouts = registry
        .checkout_repository()
        .find_active_by_user_id(user.id())
        .await?;

    let book_ids: Vec<BookId> = checkouts.iter().map(|c| c.book_id).collect();
    let books: HashMap<BookId, Book> = registry
        .book_repository()
        .find_by_ids(&book_ids)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();

    let items = checkouts
        .into_iter()
        .filter_map(|c| books.get(&c.book_id).map(|b| CheckoutResponse::new(c, b)))
        .collect();
    Ok(Json(CheckoutsResponse { items }))
}
