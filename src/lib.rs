pub mod auction;
pub mod bidding;
pub mod catalog;
pub mod client;
pub mod config;
pub mod database;
pub mod handlers;
pub mod money;
pub mod scheduler;
pub mod store;
