//! Command surface for the UI
//!
//! `PostSync` owns a [`Store`] and a [`LifecycleTracker`] and exposes one
//! method per operation. Each method settles its request, lets the store
//! reconcile the outcome and hands the outcome back as a `Result`.
//!
//! # Example
//!
//! ```no_run
//! use libpostsync::{AuthToken, Config, PostSync};
//!
//! # async fn example() -> libpostsync::Result<()> {
//! let config = Config::load()?;
//! let sync = PostSync::from_config(&config)?;
//!
//! sync.fetch_all().await?;
//! let token = AuthToken::new("token-from-identity-layer");
//! let post = sync.publish("Hello world", &token).await?;
//! sync.like(&post.id, &token).await?;
//!
//! let state = sync.state();
//! println!("{} posts, first is {}", state.posts.len(), state.posts[0].id);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::config::Config;
use crate::error::{RequestError, Result};
use crate::lifecycle::{Delete, Dislike, Edit, FetchAll, FetchOne, LifecycleTracker, Like, Publish};
use crate::store::{PostsState, Store, StoreReceiver};
use crate::transport::{HttpTransport, Transport};
use crate::types::{AuthToken, Post, PostData, PostId};

/// Post synchronization facade
#[derive(Clone)]
pub struct PostSync {
    tracker: LifecycleTracker,
}

impl PostSync {
    /// Create a facade over `transport` with a fresh store
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_store(transport, Store::default())
    }

    /// Create a facade over `transport` that reconciles into `store`
    pub fn with_store(transport: Arc<dyn Transport>, store: Store) -> Self {
        Self {
            tracker: LifecycleTracker::new(transport, store),
        }
    }

    /// Create a facade backed by an HTTP transport built from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is invalid or the HTTP client cannot
    /// be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = HttpTransport::from_config(&config.api)?;
        Ok(Self::with_store(
            Arc::new(transport),
            Store::new(config.events.capacity),
        ))
    }

    pub fn store(&self) -> &Store {
        self.tracker.store()
    }

    /// Current snapshot of the store
    pub fn state(&self) -> PostsState {
        self.store().state()
    }

    /// Subscribe to store change events
    pub fn subscribe(&self) -> StoreReceiver {
        self.store().subscribe()
    }

    /// `GET /posts`; replaces the list
    pub async fn fetch_all(&self) -> std::result::Result<Vec<Post>, RequestError> {
        self.tracker.run(FetchAll).await
    }

    /// `GET /posts/{id}`; replaces the detail post
    pub async fn fetch_one(&self, post_id: &PostId) -> std::result::Result<Post, RequestError> {
        self.tracker
            .run(FetchOne {
                post_id: post_id.clone(),
            })
            .await
    }

    /// `POST /posts`; prepends the created post
    pub async fn publish(
        &self,
        content: impl Into<String>,
        token: &AuthToken,
    ) -> std::result::Result<Post, RequestError> {
        self.tracker
            .run(Publish {
                content: content.into(),
                token: token.clone(),
            })
            .await
    }

    /// `POST /posts/edit/{id}`; patches the post's content
    pub async fn edit(
        &self,
        post_id: &PostId,
        post_data: PostData,
        token: &AuthToken,
    ) -> std::result::Result<Post, RequestError> {
        self.tracker
            .run(Edit {
                post_id: post_id.clone(),
                post_data,
                token: token.clone(),
            })
            .await
    }

    /// `DELETE /posts/{id}`; removes the post
    pub async fn delete(
        &self,
        post_id: &PostId,
        token: &AuthToken,
    ) -> std::result::Result<PostId, RequestError> {
        self.tracker
            .run(Delete {
                post_id: post_id.clone(),
                token: token.clone(),
            })
            .await
    }

    /// `POST /posts/like/{id}`; replaces the post with the server copy
    pub async fn like(
        &self,
        post_id: &PostId,
        token: &AuthToken,
    ) -> std::result::Result<Post, RequestError> {
        self.tracker
            .run(Like {
                post_id: post_id.clone(),
                token: token.clone(),
            })
            .await
    }

    /// `POST /posts/dislike/{id}`; replaces the post with the server copy
    pub async fn dislike(
        &self,
        post_id: &PostId,
        token: &AuthToken,
    ) -> std::result::Result<Post, RequestError> {
        self.tracker
            .run(Dislike {
                post_id: post_id.clone(),
                token: token.clone(),
            })
            .await
    }
}
