pub mod dto;
pub mod error_pages;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod utils;
pub mod views;
