use chrono::{DateTime, Utc};

use super::id::{BookId, CheckoutId, UserId};

pub mod event;

// 貸出中の 1 冊を表す台帳レコード。返却されると削除される
#[derive(Debug, Clone)]
pub struct Checkout {
    pub id: CheckoutId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub checked_out_at: DateTime<Utc>,
}
