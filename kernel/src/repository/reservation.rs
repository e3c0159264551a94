use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::{BookId, ReservationId, UserId},
    reservation::{event::CreateReservation, Reservation},
};

#[mockall::automock]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    // 予約操作。同じ (蔵書, 利用者) の予約が残っていれば DuplicateReservation を返す
    async fn enqueue(&self, event: CreateReservation) -> AppResult<Reservation>;
    // キューからの取り除き。返却時に最古の予約を貸出へ変換する際に使う
    async fn dequeue(&self, reservation_id: ReservationId) -> AppResult<()>;
    async fn find_by_book_and_user(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> AppResult<Option<Reservation>>;
    // 最も長く待っている予約。reserved_at 昇順、同時刻なら sequence 昇順
    async fn peek_oldest(&self, book_id: BookId) -> AppResult<Option<Reservation>>;
    async fn count_for_book(&self, book_id: BookId) -> AppResult<i64>;
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Reservation>>;
}
