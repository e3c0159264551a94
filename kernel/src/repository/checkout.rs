use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    checkout::{event::CreateCheckout, Checkout},
    id::{BookId, CheckoutId, UserId},
};

#[mockall::automock]
#[async_trait]
pub trait CheckoutRepository: Send + Sync {
    // 貸出操作
    async fn create(&self, event: CreateCheckout) -> AppResult<Checkout>;
    // 返却操作。台帳からレコードごと削除する
    async fn delete(&self, checkout_id: CheckoutId) -> AppResult<()>;
    // (蔵書, 利用者) の組に対する未返却の貸出情報を取得する
    async fn find_active(&self, book_id: BookId, user_id: UserId) -> AppResult<Option<Checkout>>;
    // ユーザー ID に紐づく未返却の貸出情報を取得する
    async fn find_active_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Checkout>>;
    // 蔵書ごとの未返却数
    async fn count_active_for_book(&self, book_id: BookId) -> AppResult<i64>;
}
