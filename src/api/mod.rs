mod client;
mod error;
pub mod types;

pub use client::{ApiClient, decode_response};
pub use error::ApiError;
pub use types::Channel;
