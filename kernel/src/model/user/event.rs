use crate::model::role::Role;

// 利用者の登録内容。パスワードはアダプタ層でハッシュ化するまで平文のまま運ぶ
#[derive(Debug)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}
