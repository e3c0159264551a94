use async_trait::async_trait;
use chrono::Utc;
use derive_new::new;
use uuid::Uuid;

use kernel::{
    model::{id::UserId, user::event::CreateUser, user::User},
    repository::user::UserRepository,
};
use shared::error::{AppError, AppResult};

use crate::database::{model::user::UserDocument, DocumentStore, Filter};

#[derive(new)]
pub struct UserRepositoryImpl {
    db: DocumentStore,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        if self.find_by_email(&event.email).await?.is_some() {
            return Err(AppError::UnprocessableEntity(
                "このメールアドレスは既に登録されています".into(),
            ));
        }

        let password_hash = bcrypt::hash(event.password, bcrypt::DEFAULT_COST)?;
        let doc = UserDocument {
            id: Uuid::new_v4(),
            name: event.name,
            email: event.email,
            password_hash,
            role: event.role,
            created_at: Utc::now(),
        };
        self.db.users().insert_one(doc.id, &doc).await?;
        Ok(doc.into())
    }

    async fn find_current_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let filter = Filter::new().eq("id", user_id.raw());
        Ok(self
            .db
            .users()
            .find_one::<UserDocument>(&filter)
            .await?
            .map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let filter = Filter::new().eq("email", email);
        Ok(self
            .db
            .users()
            .find_one::<UserDocument>(&filter)
            .await?
            .map(User::from))
    }
}
