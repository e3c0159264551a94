pub mod auth;
pub mod book;
pub mod checkout;
pub mod reservation;
pub mod user;
