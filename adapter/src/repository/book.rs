use async_trait::async_trait;
use derive_new::new;
use serde_json::json;
use uuid::Uuid;

use kernel::{
    model::{
        book::{
            event::{CreateBook, UpdateAvailability},
            Book, BookListOptions, BookStatus,
        },
        id::BookId,
        list::PaginatedList,
    },
    repository::book::BookRepository,
};
use shared::error::{AppError, AppResult};

use crate::database::{model::book::BookDocument, DocumentStore, Filter};

#[derive(new)]
pub struct BookRepositoryImpl {
    db: DocumentStore,
}

#[async_trait]
impl BookRepository for BookRepositoryImpl {
    async fn create(&self, event: CreateBook) -> AppResult<Book> {
        // API 層の検証を通らずに呼ばれた場合の最終防衛
        if event.total_copies < 1 {
            return Err(AppError::UnprocessableEntity(
                "蔵書は 1 冊以上で登録してください".into(),
            ));
        }
        if event.title.trim().is_empty()
            || event.author.trim().is_empty()
            || event.genre.trim().is_empty()
        {
            return Err(AppError::UnprocessableEntity(
                "タイトル・著者・ジャンルは必須です".into(),
            ));
        }

        let doc = BookDocument {
            id: Uuid::new_v4(),
            title: event.title,
            author: event.author,
            genre: event.genre,
            total_copies: event.total_copies,
            available_copies: event.total_copies,
            status: BookStatus::derive(event.total_copies, 0),
            version: 0,
        };
        self.db.books().insert_one(doc.id, &doc).await?;
        Ok(doc.into())
    }

    async fn find_all(&self, options: BookListOptions) -> AppResult<PaginatedList<Book>> {
        let mut books: Vec<Book> = self
            .db
            .books()
            .find_many::<BookDocument>(&Filter::new())
            .await?
            .into_iter()
            .map(Book::from)
            .collect();
        // タイトル昇順。同名の蔵書は ID で順序を安定させる
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.raw().cmp(&b.id.raw())));

        let total = books.len() as i64;
        let items = books
            .into_iter()
            .skip(options.offset.max(0) as usize)
            .take(options.limit.max(0) as usize)
            .collect();
        Ok(PaginatedList {
            total,
            limit: options.limit,
            offset: options.offset,
            items,
        })
    }

    async fn find_by_id(&self, book_id: BookId) -> AppResult<Option<Book>> {
        let filter = Filter::new().eq("id", book_id.raw());
        Ok(self
            .db
            .books()
            .find_one::<BookDocument>(&filter)
            .await?
            .map(Book::from))
    }

    async fn find_by_ids(&self, book_ids: &[BookId]) -> AppResult<Vec<Book>> {
        let mut books = Vec::with_capacity(book_ids.len());
        for book_id in book_ids {
            if let Some(book) = self.find_by_id(*book_id).await? {
                books.push(book);
            }
        }
        Ok(books)
    }

    // version の一致を条件にした更新。外れた場合は 1 行も書き換わらない
    async fn set_available_and_status(&self, event: UpdateAvailability) -> AppResult<()> {
        let filter = Filter::new()
            .eq("id", event.book_id.raw())
            .eq("version", event.expected_version);
        let set = json!({
            "availableCopies": event.available_copies,
            "status": event.status,
            "version": event.expected_version + 1,
        });
        match self.db.books().update_one(&filter, set).await? {
            0 => Err(AppError::NoRowAffectedError(
                "book availability update lost a conditional write".into(),
            )),
            _ => Ok(()),
        }
    }
}
