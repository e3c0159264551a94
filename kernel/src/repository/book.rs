use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    book::{
        event::{CreateBook, UpdateAvailability},
        Book, BookListOptions,
    },
    id::BookId,
    list::PaginatedList,
};

#[mockall::automock]
#[async_trait]
pub trait BookRepository: Send + Sync {
    // 蔵書の新規登録。available_copies = total_copies で作成される
    async fn create(&self, event: CreateBook) -> AppResult<Book>;
    async fn find_all(&self, options: BookListOptions) -> AppResult<PaginatedList<Book>>;
    async fn find_by_id(&self, book_id: BookId) -> AppResult<Option<Book>>;
    async fn find_by_ids(&self, book_ids: &[BookId]) -> AppResult<Vec<Book>>;
    // 在庫数と状態ラベルの条件付き更新。現在の version が
    // event.expected_version と一致しないときは NoRowAffectedError を返す
    async fn set_available_and_status(&self, event: UpdateAvailability) -> AppResult<()>;
}
