pub mod auth;
pub mod book;
pub mod checkout;
pub mod id;
pub mod list;
pub mod reservation;
pub mod role;
pub mod user;
