use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kernel::model::book::{Book, BookStatus};

// books コレクションのドキュメント。deny_unknown_fields により、
// 期待と異なる形のドキュメントは復号の段階で弾かれる
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BookDocument {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub total_copies: u32,
    pub available_copies: u32,
    pub status: BookStatus,
    pub version: u64,
}

impl From<BookDocument> for Book {
    fn from(value: BookDocument) -> Self {
        Book {
            id: value.id.into(),
            title: value.title,
            author: value.author,
            genre: value.genre,
            total_copies: value.total_copies,
            available_copies: value.available_copies,
            status: value.status,
            version: value.version,
        }
    }
}
