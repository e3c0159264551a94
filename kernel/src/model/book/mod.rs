use serde::{Deserialize, Serialize};

use super::id::BookId;

pub mod event;

#[derive(Debug, Clone)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub total_copies: u32,
    pub available_copies: u32,
    pub status: BookStatus,
    // 条件付き更新の比較対象。更新が成功するたびに 1 増える
    pub version: u64,
}

// ページネーションの範囲を指定するための設定値を格納する型
#[derive(Debug)]
pub struct BookListOptions {
    pub limit: i64,
    pub offset: i64,
}

// 蔵書の貸出状況を表すラベル。在庫数と予約キューから導出できる値だが、
// 一覧表示を 1 回の読み取りで済ませるためにドキュメントにも書き込んでおく。
// 保存済みの値は更新のたびに derive() で計算し直す
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookStatus {
    Available,
    #[serde(rename = "Checked Out")]
    CheckedOut,
    Reserved,
}

impl BookStatus {
    // 在庫が 1 冊でもあれば Available。在庫ゼロで待ち行列があれば Reserved
    pub fn derive(available_copies: u32, reservation_count: i64) -> Self {
        if available_copies > 0 {
            BookStatus::Available
        } else if reservation_count > 0 {
            BookStatus::Reserved
        } else {
            BookStatus::CheckedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::BookStatus;

    #[rstest]
    #[case(3, 0, BookStatus::Available)]
    #[case(1, 0, BookStatus::Available)]
    #[case(0, 0, BookStatus::CheckedOut)]
    #[case(0, 1, BookStatus::Reserved)]
    #[case(0, 5, BookStatus::Reserved)]
    // 在庫があれば予約キューの長さは見ない
    #[case(2, 3, BookStatus::Available)]
    fn status_follows_copies_and_queue(
        #[case] available: u32,
        #[case] reservations: i64,
        #[case] expected: BookStatus,
    ) {
        assert_eq!(BookStatus::derive(available, reservations), expected);
    }

    #[test]
    fn checked_out_serializes_with_space() {
        let value = serde_json::to_value(BookStatus::CheckedOut).unwrap();
        assert_eq!(value, serde_json::json!("Checked Out"));
    }
}
