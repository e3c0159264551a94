use axum::{
    routing::{get, post, put},
    Router,
};

use registry::AppRegistry;

use crate::handler::{
    book::{register_book, show_book, show_book_list},
    checkout::{checkout_book, return_book, show_checked_out_list},
    reservation::{reserve_book, show_reservation_list},
};

pub fn build_book_routers() -> Router<AppRegistry> {
    let circulation_routers = Router::new()
        .route("/checkouts/me", get(show_checked_out_list))
        .route("/reservations/me", get(show_reservation_list))
        .route("/:book_id/checkouts", post(checkout_book))
        .route("/:book_id/checkouts/returned", put(return_book))
        .route("/:book_id/reservations", post(reserve_book));

    let routers = Router::new()
        .route("/", get(show_book_list).post(register_book))
        .route("/:book_id", get(show_book))
        .merge(circulation_routers);

    Router::new().nest("/books", routers)
}
