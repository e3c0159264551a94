use garde::Validate;
use serde::{Deserialize, Serialize};

use kernel::model::{id::UserId, role::Role, user::User};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[garde(length(min = 2))]
    pub name: String,
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        UserResponse {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
        }
    }
}
