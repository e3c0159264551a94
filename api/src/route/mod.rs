use axum::Router;

use registry::AppRegistry;

pub mod auth;
pub mod book;
pub mod health;
pub mod user;

pub fn routes(registry: AppRegistry) -> Router {
    let router = Router::new()
        .merge(health::build_health_check_routers())
        .nest("/api/v1", v1_routes());
    router.with_state(registry)
}

fn v1_routes() -> Router<AppRegistry> {
    Router::new()
        .merge(auth::build_auth_routers())
        .merge(book::build_book_routers())
        .merge(user::build_user_routers())
}
