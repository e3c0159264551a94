use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use kernel::model::{auth::AccessToken, id::UserId, role::Role, user::User};
use registry::AppRegistry;
use shared::error::AppError;

// Bearer トークンの検証まで済んだ利用者。認証が必要な handler は引数にこれを取る
pub struct AuthorizedUser {
    pub access_token: AccessToken,
    pub user: User,
}

impl AuthorizedUser {
    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthorizedUser
where
    AppRegistry: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let registry = AppRegistry::from_ref(state);

        // Authorization ヘッダが無い・Bearer 形式でないリクエストはここで止める
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::UnauthorizedError)?;
        let access_token = AccessToken(bearer.token().to_string());

        // KV ストアに残っているトークンだけが有効。期限切れは None で返ってくる
        let Some(user_id) = registry
            .auth_repository()
            .fetch_user_id_from_token(&access_token)
            .await?
        else {
            return Err(AppError::UnauthenticatedError);
        };

        // ログアウト済みトークンと同様、レコードの無い利用者も認証失敗にする
        let user = registry
            .user_repository()
            .find_current_user(user_id)
            .await?
            .ok_or(AppError::UnauthenticatedError)?;

        Ok(Self { access_token, user })
    }
}
