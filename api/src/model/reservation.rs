use chrono::{DateTime, Utc};
use serde::Serialize;

use kernel::model::{
    book::Book,
    id::{BookId, ReservationId},
    reservation::Reservation,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: ReservationId,
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub reserved_at: DateTime<Utc>,
}

impl ReservationResponse {
    pub fn new(reservation: Reservation, book: &Book) -> Self {
        ReservationResponse {
            id: reservation.id,
            book_id: reservation.book_id,
            title: book.title.clone(),
            author: book.author.clone(),
            reserved_at: reservation.reserved_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReservationsResponse {
    pub items: Vec<ReservationResponse>,
}
