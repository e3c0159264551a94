use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kernel::model::checkout::Checkout;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckoutDocument {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub checked_out_at: DateTime<Utc>,
}

impl From<CheckoutDocument> for Checkout {
    fn from(value: CheckoutDocument) -> Self {
        Checkout {
            id: value.id.into(),
            book_id: value.book_id.into(),
            user_id: value.user_id.into(),
            checked_out_at: value.checked_out_at,
        }
    }
}
