use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kernel::model::{role::Role, user::User};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserDocument {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// パスワードハッシュはドメイン側へ持ち出さない
impl From<UserDocument> for User {
    fn from(value: UserDocument) -> Self {
        User {
            id: value.id.into(),
            name: value.name,
            email: value.email,
            role: value.role,
        }
    }
}
