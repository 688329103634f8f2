pub mod client;
pub mod events;
pub mod log_stream;
pub mod models;
