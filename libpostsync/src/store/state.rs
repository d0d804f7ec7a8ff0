//! Post store state
//!
//! Plain value type. All transitions happen through the reducer
//! (see `reducer.rs`).

use crate::error::RequestError;
use crate::lifecycle::Category;
use crate::types::{Post, PostId};

/// Snapshot of everything the UI reads
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostsState {
    /// Ordered list, unique by id
    pub posts: Vec<Post>,

    /// Currently viewed detail post; not kept in sync with `posts`
    pub single_post: Option<Post>,

    /// A fetch-all or fetch-one is pending
    pub is_list_loading: bool,

    /// A publish, edit, delete, like or dislike is pending
    pub is_content_loading: bool,

    /// Reason of the most recent rejection, cleared by the next pending
    pub last_error: Option<RequestError>,
}

impl PostsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, post_id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|post| &post.id == post_id)
    }

    pub fn contains(&self, post_id: &PostId) -> bool {
        self.find(post_id).is_some()
    }

    pub fn is_loading(&self, category: Category) -> bool {
        match category {
            Category::List => self.is_list_loading,
            Category::Content => self.is_content_loading,
        }
    }

    /// True when any request is pending
    pub fn is_busy(&self) -> bool {
        self.is_list_loading || self.is_content_loading
    }
}
