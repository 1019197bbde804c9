// medtrack-api: Async Rust client for JSON REST collections

pub mod client;
pub mod document;
pub mod error;
pub mod transport;

pub use client::{CREATED_WITHOUT_ID, CollectionClient};
pub use document::{Document, Fields, InvalidDocument};
pub use error::Error;
pub use transport::TransportConfig;
