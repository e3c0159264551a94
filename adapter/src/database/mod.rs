use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use shared::error::{AppError, AppResult};

pub mod model;

/// インプロセスのドキュメントストア。
///
/// コレクションごとに JSON ドキュメントを UUID キーで保持し、
/// 等値フィルタによる検索と、フィルタが 1 件も当たらなければ
/// 何も書かない条件付き更新・削除を提供する。更新が当たった件数を
/// 返すので、呼び出し側は 0 件を競合として扱える
#[derive(Clone)]
pub struct DocumentStore {
    books: Collection,
    checkouts: Collection,
    reservations: Collection,
    users: Collection,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            books: Collection::new("books"),
            checkouts: Collection::new("checkouts"),
            reservations: Collection::new("reservations"),
            users: Collection::new("users"),
        }
    }

    pub fn books(&self) -> &Collection {
        &self.books
    }

    pub fn checkouts(&self) -> &Collection {
        &self.checkouts
    }

    pub fn reservations(&self) -> &Collection {
        &self.reservations
    }

    pub fn users(&self) -> &Collection {
        &self.users
    }

    // 全コレクションのロックが取得できることを確認する
    pub async fn ping(&self) -> bool {
        for collection in [
            &self.books,
            &self.checkouts,
            &self.reservations,
            &self.users,
        ] {
            collection.len().await;
        }
        true
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

// フィールドの等値条件の集まり。すべて一致したドキュメントだけが対象になる
#[derive(Debug, Clone, Default)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn eq(mut self, field: &str, value: impl Serialize) -> Self {
        // ドメイン型の値 (UUID・数値・文字列) の変換は失敗しない
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.0.insert(field.to_string(), value);
        self
    }

    fn matches(&self, doc: &Value) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }
}

// 1 コレクション分のドキュメント群。挿入ごとに単調増加の sequence を払い出せる
#[derive(Clone)]
pub struct Collection {
    name: &'static str,
    docs: Arc<RwLock<BTreeMap<Uuid, Value>>>,
    sequence: Arc<AtomicU64>,
}

impl Collection {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            docs: Arc::new(RwLock::new(BTreeMap::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    // 挿入順を表す値。タイムスタンプが同時刻に並んだときの第 2 キーに使う
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn insert_one<T: Serialize>(&self, id: Uuid, doc: &T) -> AppResult<()> {
        let doc = encode(self.name, doc)?;
        let mut docs = self.docs.write().await;
        if docs.contains_key(&id) {
            return Err(AppError::DocumentStoreError(format!(
                "duplicate document id {id} in {}",
                self.name
            )));
        }
        docs.insert(id, doc);
        Ok(())
    }

    pub async fn find_one<T: DeserializeOwned>(&self, filter: &Filter) -> AppResult<Option<T>> {
        let docs = self.docs.read().await;
        docs.values()
            .find(|doc| filter.matches(doc))
            .map(|doc| decode(self.name, doc))
            .transpose()
    }

    pub async fn find_many<T: DeserializeOwned>(&self, filter: &Filter) -> AppResult<Vec<T>> {
        let docs = self.docs.read().await;
        docs.values()
            .filter(|doc| filter.matches(doc))
            .map(|doc| decode(self.name, doc))
            .collect()
    }

    // フィルタに一致した最初の 1 件に set の各フィールドを上書きし、
    // 一致した件数 (0 か 1) を返す。読み取りから書き込みまで write ロックを
    // 保持するため、条件の評価と上書きの間に他の書き込みは挟まらない
    pub async fn update_one(&self, filter: &Filter, set: Value) -> AppResult<u64> {
        let Value::Object(fields) = set else {
            return Err(AppError::DocumentStoreError(format!(
                "update for {} must be a JSON object",
                self.name
            )));
        };
        let mut docs = self.docs.write().await;
        let Some(doc) = docs.values_mut().find(|doc| filter.matches(doc)) else {
            return Ok(0);
        };
        if let Value::Object(existing) = doc {
            for (k, v) in fields {
                existing.insert(k, v);
            }
        }
        Ok(1)
    }

    pub async fn delete_one(&self, filter: &Filter) -> AppResult<u64> {
        let mut docs = self.docs.write().await;
        let Some(id) = docs
            .iter()
            .find(|(_, doc)| filter.matches(doc))
            .map(|(id, _)| *id)
        else {
            return Ok(0);
        };
        docs.remove(&id);
        Ok(1)
    }

    pub async fn count(&self, filter: &Filter) -> AppResult<u64> {
        let docs = self.docs.read().await;
        Ok(docs.values().filter(|doc| filter.matches(doc)).count() as u64)
    }

    pub(crate) async fn len(&self) -> usize {
        self.docs.read().await.len()
    }
}

fn encode<T: Serialize>(collection: &str, value: &T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|e| {
        AppError::ConversionEntityError(format!("failed to encode document for {collection}: {e}"))
    })
}

// 期待する形に合わないドキュメントは読めた振りをせず、復号の時点で拒否する
fn decode<T: DeserializeOwned>(collection: &str, doc: &Value) -> AppResult<T> {
    serde_json::from_value(doc.clone()).map_err(|e| {
        AppError::ConversionEntityError(format!("rejected malformed document in {collection}: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use uuid::Uuid;

    use shared::error::AppError;

    use super::{Collection, Filter};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        id: Uuid,
        label: String,
        version: u64,
    }

    fn row(label: &str, version: u64) -> Row {
        Row {
            id: Uuid::new_v4(),
            label: label.to_string(),
            version,
        }
    }

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let col = Collection::new("rows");
        let doc = row("a", 0);
        col.insert_one(doc.id, &doc).await.unwrap();

        let found: Option<Row> = col
            .find_one(&Filter::new().eq("id", doc.id))
            .await
            .unwrap();
        assert_eq!(found, Some(doc));
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let col = Collection::new("rows");
        let doc = row("a", 0);
        col.insert_one(doc.id, &doc).await.unwrap();

        let res = col.insert_one(doc.id, &doc).await;
        assert!(matches!(res, Err(AppError::DocumentStoreError(_))));
    }

    #[tokio::test]
    async fn conditional_update_applies_when_version_matches() {
        let col = Collection::new("rows");
        let doc = row("a", 3);
        col.insert_one(doc.id, &doc).await.unwrap();

        let filter = Filter::new().eq("id", doc.id).eq("version", 3u64);
        let matched = col
            .update_one(&filter, json!({ "label": "b", "version": 4 }))
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let found: Row = col
            .find_one(&Filter::new().eq("id", doc.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.label, "b");
        assert_eq!(found.version, 4);
    }

    #[tokio::test]
    async fn conditional_update_misses_on_stale_version() {
        let col = Collection::new("rows");
        let doc = row("a", 3);
        col.insert_one(doc.id, &doc).await.unwrap();

        let filter = Filter::new().eq("id", doc.id).eq("version", 2u64);
        let matched = col
            .update_one(&filter, json!({ "label": "b", "version": 4 }))
            .await
            .unwrap();
        assert_eq!(matched, 0);

        // 外れた更新は部分的にも書き込まれない
        let found: Row = col
            .find_one(&Filter::new().eq("id", doc.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.label, "a");
        assert_eq!(found.version, 3);
    }

    #[tokio::test]
    async fn delete_one_reports_matched_count() {
        let col = Collection::new("rows");
        let doc = row("a", 0);
        col.insert_one(doc.id, &doc).await.unwrap();

        assert_eq!(
            col.delete_one(&Filter::new().eq("id", doc.id))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            col.delete_one(&Filter::new().eq("id", doc.id))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn count_honors_filter() {
        let col = Collection::new("rows");
        for (label, version) in [("a", 0), ("a", 1), ("b", 0)] {
            let doc = row(label, version);
            col.insert_one(doc.id, &doc).await.unwrap();
        }

        assert_eq!(col.count(&Filter::new().eq("label", "a")).await.unwrap(), 2);
        assert_eq!(col.count(&Filter::new()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn sequence_is_monotonic() {
        let col = Collection::new("rows");
        let first = col.next_sequence();
        let second = col.next_sequence();
        assert!(second > first);
    }
}
