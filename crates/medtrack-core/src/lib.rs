// medtrack-core: Polling subscriptions and reactive bindings between medtrack-api and consumers.

pub mod binding;
pub mod config;
pub mod error;
pub mod poll;
pub mod source;
pub mod stream;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use binding::{CollectionBinding, Phase, ViewState};
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_POLL_INTERVAL};
pub use error::CoreError;
pub use poll::{PollingManager, SnapshotStream, Subscription, TickStats};
pub use source::CollectionSource;
pub use stream::{ViewStream, ViewWatchStream};

// Wire-level types consumers need without depending on medtrack-api directly.
pub use medtrack_api::{CREATED_WITHOUT_ID, CollectionClient, Document, Error as ApiError, Fields};
