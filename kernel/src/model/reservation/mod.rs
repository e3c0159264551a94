use chrono::{DateTime, Utc};

use super::id::{BookId, ReservationId, UserId};

pub mod event;

// 予約キューの 1 エントリ。reserved_at の昇順が待ち行列の順序で、
// 同時刻に並んだ場合は挿入時に払い出される sequence が順序を決める
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: ReservationId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub reserved_at: DateTime<Utc>,
    pub sequence: u64,
}
