use crate::model::{book::BookStatus, id::BookId};

#[derive(Debug, PartialEq, Eq)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub total_copies: u32,
}

// 在庫数と状態ラベルは必ず 1 回の書き込みで一緒に更新する。
// expected_version が保存済みの version と一致しないときは何も書き込まれない
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateAvailability {
    pub book_id: BookId,
    pub expected_version: u64,
    pub available_copies: u32,
    pub status: BookStatus,
}
