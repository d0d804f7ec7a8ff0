//! Reconciliation rules
//!
//! Pure reducer: `(PostsState, Action) -> PostsState`. No I/O, no clock,
//! same inputs give the same output.
//!
//! Only `Fulfilled` touches posts. `Pending` raises the loading flag of the
//! operation's category; `Rejected` lowers it and records the reason.
//! Nothing is applied ahead of confirmation, so nothing is ever rolled back.

use std::collections::HashSet;

use super::actions::{Action, Fulfilled};
use super::state::PostsState;
use crate::lifecycle::{Category, Operation};
use crate::types::{Post, PostId};

/// Pure reducer function
pub fn reduce(state: PostsState, action: Action) -> PostsState {
    match action {
        Action::Pending(operation) => {
            let state = set_loading(state, operation, true);
            PostsState {
                last_error: None,
                ..state
            }
        }

        Action::Rejected(error) => {
            let state = set_loading(state, error.operation, false);
            PostsState {
                last_error: Some(error),
                ..state
            }
        }

        Action::Fulfilled(payload) => {
            let operation = payload.operation();
            let state = reconcile(state, payload);
            set_loading(state, operation, false)
        }
    }
}

fn set_loading(state: PostsState, operation: Operation, loading: bool) -> PostsState {
    match operation.category() {
        Category::List => PostsState {
            is_list_loading: loading,
            ..state
        },
        Category::Content => PostsState {
            is_content_loading: loading,
            ..state
        },
    }
}

fn reconcile(state: PostsState, payload: Fulfilled) -> PostsState {
    match payload {
        // Bulk replace
        Fulfilled::FetchAll(posts) => PostsState {
            posts: dedup_by_id(posts),
            ..state
        },

        Fulfilled::FetchOne(post) => PostsState {
            single_post: Some(post),
            ..state
        },

        // Newest first
        Fulfilled::Publish(post) => {
            let mut rest = remove(state.posts, &post.id);
            let mut posts = Vec::with_capacity(rest.len() + 1);
            posts.push(post);
            posts.append(&mut rest);
            PostsState { posts, ..state }
        }

        // Only `content` is patched; a missing id (raced with delete) is a no-op
        Fulfilled::Edit(edited) => {
            let posts = state
                .posts
                .into_iter()
                .map(|post| {
                    if post.id == edited.id {
                        Post {
                            content: edited.content.clone(),
                            ..post
                        }
                    } else {
                        post
                    }
                })
                .collect();
            PostsState { posts, ..state }
        }

        Fulfilled::Delete(post_id) => PostsState {
            posts: remove(state.posts, &post_id),
            ..state
        },

        // Find-and-replace with the server copy
        Fulfilled::Like(fresh) | Fulfilled::Dislike(fresh) => PostsState {
            posts: replace(state.posts, fresh),
            ..state
        },
    }
}

fn dedup_by_id(posts: Vec<Post>) -> Vec<Post> {
    let mut seen: HashSet<PostId> = HashSet::with_capacity(posts.len());
    posts
        .into_iter()
        .filter(|post| seen.insert(post.id.clone()))
        .collect()
}

fn remove(posts: Vec<Post>, post_id: &PostId) -> Vec<Post> {
    posts.into_iter().filter(|post| &post.id != post_id).collect()
}

fn replace(posts: Vec<Post>, fresh: Post) -> Vec<Post> {
    posts
        .into_iter()
        .map(|post| if post.id == fresh.id { fresh.clone() } else { post })
        .collect()
}
