use async_trait::async_trait;
use chrono::Utc;
use derive_new::new;
use uuid::Uuid;

use kernel::{
    model::{
        id::{BookId, ReservationId, UserId},
        reservation::{event::CreateReservation, Reservation},
    },
    repository::reservation::ReservationRepository,
};
use shared::error::{AppError, AppResult};

use crate::database::{model::reservation::ReservationDocument, DocumentStore, Filter};

#[derive(new)]
pub struct ReservationRepositoryImpl {
    db: DocumentStore,
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    async fn enqueue(&self, event: CreateReservation) -> AppResult<Reservation> {
        // 重複予約の拒否はキュー自身の契約でもある
        if self
            .find_by_book_and_user(event.book_id, event.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateReservation(
                "この蔵書はすでに予約しています".into(),
            ));
        }

        let doc = ReservationDocument {
            id: Uuid::new_v4(),
            book_id: event.book_id.raw(),
            user_id: event.user_id.raw(),
            reserved_at: Utc::now(),
            sequence: self.db.reservations().next_sequence(),
        };
        self.db.reservations().insert_one(doc.id, &doc).await?;
        Ok(doc.into())
    }

    async fn dequeue(&self, reservation_id: ReservationId) -> AppResult<()> {
        let filter = Filter::new().eq("id", reservation_id.raw());
        match self.db.reservations().delete_one(&filter).await? {
            0 => Err(AppError::NoRowAffectedError(
                "reservation to dequeue was not found".into(),
            )),
            _ => Ok(()),
        }
    }

    async fn find_by_book_and_user(
        &self,
        book_id: BookId,
        user_id: UserId,
    ) -> AppResult<Option<Reservation>> {
        let filter = Filter::new()
            .eq("bookId", book_id.raw())
            .eq("userId", user_id.raw());
        Ok(self
            .db
            .reservations()
            .find_one::<ReservationDocument>(&filter)
            .await?
            .map(Reservation::from))
    }

    // 待ち行列の先頭。reserved_at 昇順、同時刻は sequence 昇順
    async fn peek_oldest(&self, book_id: BookId) -> AppResult<Option<Reservation>> {
        let filter = Filter::new().eq("bookId", book_id.raw());
        let reservations: Vec<ReservationDocument> =
            self.db.reservations().find_many(&filter).await?;
        Ok(reservations
            .into_iter()
            .map(Reservation::from)
            .min_by_key(|r| (r.reserved_at, r.sequence)))
    }

    async fn count_for_book(&self, book_id: BookId) -> AppResult<i64> {
        let filter = Filter::new().eq("bookId", book_id.raw());
        Ok(self.db.reservations().count(&filter).await? as i64)
    }

    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        let filter = Filter::new().eq("userId", user_id.raw());
        let mut reservations: Vec<Reservation> = self
            .db
            .reservations()
            .find_many::<ReservationDocument>(&filter)
            .await?
            .into_iter()
            .map(Reservation::from)
            .collect();
        reservations.sort_by_key(|r| (r.reserved_at, r.sequence));
        Ok(reservations)
    }
}
