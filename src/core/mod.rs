pub mod cache;
pub mod client;
