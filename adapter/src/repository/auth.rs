use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use derive_new::new;
use uuid::Uuid;

use kernel::{
    model::{
        auth::{event::CreateToken, AccessToken},
        id::UserId,
    },
    repository::auth::AuthRepository,
};
use shared::error::{AppError, AppResult};

use crate::{
    database::{model::user::UserDocument, DocumentStore, Filter},
    kv::TokenStore,
};

#[derive(new)]
pub struct AuthRepositoryImpl {
    db: DocumentStore,
    kv: Arc<TokenStore>,
    ttl: u64,
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn fetch_user_id_from_token(
        &self,
        access_token: &AccessToken,
    ) -> AppResult<Option<UserId>> {
        Ok(self.kv.fetch(&access_token.0).await)
    }

    async fn verify_user(&self, email: &str, password: &str) -> AppResult<UserId> {
        let filter = Filter::new().eq("email", email);
        let user: UserDocument = self
            .db
            .users()
            .find_one(&filter)
            .await?
            .ok_or(AppError::UnauthenticatedError)?;

        let valid = bcrypt::verify(password, &user.password_hash)?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }
        Ok(user.id.into())
    }

    async fn create_token(&self, event: CreateToken) -> AppResult<AccessToken> {
        let token = Uuid::new_v4().simple().to_string();
        self.kv
            .save(token.clone(), event.user_id, Duration::from_secs(self.ttl))
            .await;
        Ok(AccessToken(token))
    }

    async fn delete_token(&self, access_token: &AccessToken) -> AppResult<()> {
        self.kv.delete(&access_token.0).await;
        Ok(())
    }
}
