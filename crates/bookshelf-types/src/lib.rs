pub mod config;
pub mod genre;
