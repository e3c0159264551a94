use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kernel::model::reservation::Reservation;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReservationDocument {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub reserved_at: DateTime<Utc>,
    // 挿入時にコレクションから払い出される値。reserved_at の同時刻を並べ替える
    pub sequence: u64,
}

impl From<ReservationDocument> for Reservation {
    fn from(value: ReservationDocument) -> Self {
        Reservation {
            id: value.id.into(),
            book_id: value.book_id.into(),
            user_id: value.user_id.into(),
            reserved_at: value.reserved_at,
            sequence: value.sequence,
        }
    }
}
