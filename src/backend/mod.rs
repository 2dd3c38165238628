// backend module: HTTP access to the Orchestra task API

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::BackendError;
