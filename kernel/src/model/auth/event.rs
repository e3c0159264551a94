use crate::model::id::UserId;

#[derive(Debug, Clone, Copy)]
pub struct CreateToken {
    pub user_id: UserId,
}

impl CreateToken {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}
