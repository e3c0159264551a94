use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{id::UserId, user::event::CreateUser, user::User};

#[mockall::automock]
#[async_trait]
pub trait UserRepository: Send + Sync {
    // 利用者の登録。メールアドレスが既に使われていれば UnprocessableEntity を返す
    async fn create(&self, event: CreateUser) -> AppResult<User>;
    async fn find_current_user(&self, user_id: UserId) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}
