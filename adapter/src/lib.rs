pub mod database;
pub mod kv;
pub mod repository;
