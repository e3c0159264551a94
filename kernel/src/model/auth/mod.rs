pub mod event;

// サーバが発行するアクセストークン。値そのものが KV ストアのキーになる
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(pub String);
