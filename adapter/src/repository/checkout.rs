use async_trait::async_trait;
use chrono::Utc;
use derive_new::new;
use uuid::Uuid;

use kernel::{
    model::{
        checkout::{event::CreateCheckout, Checkout},
        id::{BookId, CheckoutId, UserId},
    },
    repository::checkout::CheckoutRepository,
};
use shared::error::{AppError, AppResult};

use crate::database::{model::checkout::CheckoutDocument, DocumentStore, Filter};

#[derive(new)]
pub struct CheckoutRepositoryImpl {
    db: DocumentStore,
}

#[async_trait]
impl CheckoutRepository for CheckoutRepositoryImpl {
    async fn create(&self, event: CreateCheckout) -> AppResult<Checkout> {
        let doc = CheckoutDocument {
            id: Uuid::new_v4(),
            book_id: event.book_id.raw(),
            user_id: event.user_id.raw(),
            checked_out_at: Utc::now(),
        };
        self.db.checkouts().insert_one(doc.id, &doc).await?;
        Ok(doc.into())
    }

    async fn delete(&self, checkout_id: CheckoutId) -> AppResult<()> {
        let filter = Filter::new().eq("id", checkout_id.raw());
        match self.db.checkouts().delete_one(&filter).await? {
            0 => Err(AppError::NoRowAffectedError(
                "checkout to delete was not found".into(),
            )),
            _ => Ok(()),
        }
    }

    async fn find_active(&self, book_id: BookId, user_id: UserId) -> AppResult<Option<Checkout>> {
        let filter = Filter::new()
            .eq("bookId", book_id.raw())
            .eq("userId", user_id.raw());
        Ok(self
            .db
            .checkouts()
            .find_one::<CheckoutDocument>(&filter)
            .await?
            .map(Checkout::from))
    }

    async fn find_active_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Checkout>> {
        let filter = Filter::new().eq("userId", user_id.raw());
        let mut checkouts: Vec<Checkout> = self
            .db
            .checkouts()
            .find_many::<CheckoutDocument>(&filter)
            .await?
            .into_iter()
            .map(Checkout::from)
            .collect();
        checkouts.sort_by_key(|c| c.checked_out_at);
        Ok(checkouts)
    }

    async fn count_active_for_book(&self, book_id: BookId) -> AppResult<i64> {
        let filter = Filter::new().eq("bookId", book_id.raw());
        Ok(self.db.checkouts().count(&filter).await? as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> CheckoutRepositoryImpl {
        CheckoutRepositoryImpl::new(DocumentStore::new())
    }

    #[tokio::test]
    async fn create_then_find_active() {
        let repo = repo();
        let book_id = BookId::new();
        let user_id = UserId::new();

        let checkout = repo.create(CreateCheckout { book_id, user_id }).await.unwrap();
        assert_eq!(checkout.book_id, book_id);
        assert_eq!(checkout.user_id, user_id);

        let found = repo.find_active(book_id, user_id).await.unwrap().unwrap();
        assert_eq!(found.id, checkout.id);

        // 別の利用者では見つからない
        assert!(repo
            .find_active(book_id, UserId::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_removes_ledger_row() {
        let repo = repo();
        let book_id = BookId::new();
        let user_id = UserId::new();
        let checkout = repo.create(CreateCheckout { book_id, user_id }).await.unwrap();

        repo.delete(checkout.id).await.unwrap();
        assert!(repo.find_active(book_id, user_id).await.unwrap().is_none());

        let res = repo.delete(checkout.id).await;
        assert!(matches!(res, Err(AppError::NoRowAffectedError(_))));
    }

    #[tokio::test]
    async fn counts_only_rows_for_the_book() {
        let repo = repo();
        let book_id = BookId::new();
        repo.create(CreateCheckout {
            book_id,
            user_id: UserId::new(),
        })
        .await
        .unwrap();
        repo.create(CreateCheckout {
            book_id,
            user_id: UserId::new(),
        })
        .await
        .unwrap();
        repo.create(CreateCheckout {
            book_id: BookId::new(),
            user_id: UserId::new(),
        })
        .await
        .unwrap();

        assert_eq!(repo.count_active_for_book(book_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn lists_checkouts_per_user() {
        let repo = repo();
        let user_id = UserId::new();
        repo.create(CreateCheckout {
            book_id: BookId::new(),
            user_id,
        })
        .await
        .unwrap();
        repo.create(CreateCheckout {
            book_id: BookId::new(),
            user_id,
        })
        .await
        .unwrap();

        let mine = repo.find_active_by_user_id(user_id).await.unwrap();
        assert_eq!(mine.len(), 2);
    }
}
