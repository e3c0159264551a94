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
    model::reservation::{ReservationResponse, ReservationsResponse},
};

pub async fn reserve_book(
    user: AuthorizedUser,
    Path(book_id): Path<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .circulation_service()
        .reserve_book(book_id, user.id())
        .await
        .map(|_| StatusCode::CREATED)
}

// 自分の予約一覧。待ち行列に並んだ順で返す
pub async fn show_reservation_list(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationsResponse>> {
    let reservations = registry
        .reservation_repository()
        .find_by_user_id(user.id())
        .await?;

    let book_ids: Vec<BookId> = reservations.iter().map(|r| r.book_id).collect();
    let books: HashMap<BookId, Book> = registry
        .book_repository()
        .find_by_ids(&book_ids)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();

    let items = reservations
        .into_iter()
        .filter_map(|r| {
            books
                .get(&r.book_id)
                .map(|b| ReservationResponse::new(r, b))
        })
        .collect();
    Ok(Json(ReservationsResponse { items }))
}
