use chrono::{DateTime, Utc};
use serde::Serialize;

use kernel::model::{
    book::Book,
    checkout::Checkout,
    id::{BookId, CheckoutId},
};

// 貸出中の 1 冊を書誌情報と合わせて返す
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub id: CheckoutId,
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub checked_out_at: DateTime<Utc>,
}

impl CheckoutResponse {
    pub fn new(checkout: Checkout, book: &Book) -> Self {
        CheckoutResponse {
            id: checkout.id,
            book_id: checkout.book_id,
            title: book.title.clone(),
            author: book.author.clone(),
            checked_out_at: checkout.checked_out_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutsResponse {
    pub items: Vec<CheckoutResponse>,
}
