pub mod client;
pub mod generate;
pub mod response;
pub mod secrets;

pub use client::{ensure_client, test_configured_api_key};
pub use generate::request_question;
pub use secrets::{clear_api_key, store_api_key};
