pub mod blog;
pub mod db;
pub mod middleware;
pub mod orm;
pub mod session;
pub mod slug;
pub mod web;
