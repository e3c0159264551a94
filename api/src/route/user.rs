use axum::{
    routing::{get, post},
    Router,
};

use registry::AppRegistry;

use crate::handler::user::{get_current_user, register_user};

pub fn build_user_routers() -> Router<AppRegistry> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/me", get(get_current_user))
}
