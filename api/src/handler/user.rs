use axum::{extract::State, http::StatusCode, Json};
use garde::Validate;

use kernel::model::{role::Role, user::event::CreateUser};
use registry::AppRegistry;
use shared::error::AppResult;

use crate::{
    extractor::AuthorizedUser,
    model::user::{CreateUserRequest, UserResponse},
};

pub async fn register_user(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    req.validate(&())?;

    // 公開の登録 API で作られるのは一般利用者のみ。ロールは受け取らない
    let user = registry
        .user_repository()
        .create(CreateUser {
            name: req.name,
            email: req.email,
            password: req.password,
            role: Role::User,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn get_current_user(user: AuthorizedUser) -> Json<UserResponse> {
    Json(user.user.into())
}
