use garde::Validate;
use serde::{Deserialize, Serialize};

use kernel::model::{
    book::{event::CreateBook, Book, BookListOptions, BookStatus},
    id::BookId,
    list::PaginatedList,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(length(min = 1))]
    pub author: String,
    #[garde(length(min = 1))]
    pub genre: String,
    #[garde(range(min = 1))]
    pub total_copies: u32,
}

impl From<CreateBookRequest> for CreateBook {
    fn from(value: CreateBookRequest) -> Self {
        CreateBook {
            title: value.title,
            author: value.author,
            genre: value.genre,
            total_copies: value.total_copies,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookListQuery {
    #[garde(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[garde(range(min = 0))]
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl From<BookListQuery> for BookListOptions {
    fn from(value: BookListQuery) -> Self {
        BookListOptions {
            limit: value.limit,
            offset: value.offset,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub total_copies: u32,
    pub available_copies: u32,
    pub status: BookStatus,
}

impl From<Book> for BookResponse {
    fn from(value: Book) -> Self {
        BookResponse {
            id: value.id,
            title: value.title,
            author: value.author,
            genre: value.genre,
            total_copies: value.total_copies,
            available_copies: value.available_copies,
            status: value.status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedBookResponse {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub items: Vec<BookResponse>,
}

impl From<PaginatedList<Book>> for PaginatedBookResponse {
    fn from(value: PaginatedList<Book>) -> Self {
        PaginatedBookResponse {
            total: value.total,
            limit: value.limit,
            offset: value.offset,
            items: value.items.into_iter().map(BookResponse::from).collect(),
        }
    }
}
