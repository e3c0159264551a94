use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use kernel::model::id::UserId;

// アクセストークンと利用者 ID の対応を TTL 付きで保持する KV ストア
#[derive(Default)]
pub struct TokenStore {
    entries: RwLock<HashMap<String, TokenEntry>>,
}

#[derive(Debug, Clone, Copy)]
struct TokenEntry {
    user_id: UserId,
    expires_at: Instant,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn save(&self, token: String, user_id: UserId, ttl: Duration) {
        let now = Instant::now();
        let entry = TokenEntry {
            user_id,
            expires_at: now + ttl,
        };
        let mut entries = self.entries.write().await;
        // 書き込みのついでに期限切れを一掃する。失効後に一度も
        // 参照されないトークンもここで消える
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(token, entry);
    }

    // 期限切れのエントリは参照されたこのタイミングで削除する
    pub async fn fetch(&self, token: &str) -> Option<UserId> {
        let mut entries = self.entries.write().await;
        match entries.get(token) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.user_id),
            Some(_) => {
                entries.remove(token);
                None
            }
            None => None,
        }
    }

    pub async fn delete(&self, token: &str) {
        self.entries.write().await.remove(token);
    }
}
