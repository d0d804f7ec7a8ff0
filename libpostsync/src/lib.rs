//! postsync - client-side post-state synchronization
//!
//! Fetches, caches, mutates and reconciles a list of posts against a
//! social REST API. Every request runs through a pending/fulfilled/rejected
//! lifecycle, and only confirmed server responses change the store.

pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod store;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use client::PostSync;
pub use config::Config;
pub use error::{ErrorKind, PostSyncError, RequestError, Result};
pub use lifecycle::Operation;
pub use store::{Action, Fulfilled, PostsState, Store, StoreEvent};
pub use types::{AuthToken, Likes, Post, PostData, PostId};
