use crate::model::id::{BookId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateReservation {
    pub book_id: BookId,
    pub user_id: UserId,
}
