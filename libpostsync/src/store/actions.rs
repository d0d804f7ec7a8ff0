//! Actions for the reducer pattern
//!
//! Every store transition is one of these. An action is a lifecycle phase
//! of one operation; the reducer (see `reducer.rs`) matches on it
//! exhaustively.

use crate::error::RequestError;
use crate::lifecycle::Operation;
use crate::types::{Post, PostId};

/// A lifecycle phase of one operation
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Operation started; no I/O has happened yet
    Pending(Operation),

    /// Operation settled with the expected status and a usable payload
    Fulfilled(Fulfilled),

    /// Operation settled any other way
    Rejected(RequestError),
}

impl Action {
    pub fn operation(&self) -> Operation {
        match self {
            Action::Pending(operation) => *operation,
            Action::Fulfilled(payload) => payload.operation(),
            Action::Rejected(error) => error.operation,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Action::Pending(_))
    }
}

/// Successful payload, one variant per operation
#[derive(Debug, Clone, PartialEq)]
pub enum Fulfilled {
    /// Full post list
    FetchAll(Vec<Post>),

    /// The detail post
    FetchOne(Post),

    /// The newly created post
    Publish(Post),

    /// The post after edit
    Edit(Post),

    /// Identifier of the removed post
    Delete(PostId),

    /// The post after like
    Like(Post),

    /// The post after dislike
    Dislike(Post),
}

impl Fulfilled {
    pub fn operation(&self) -> Operation {
        match self {
            Fulfilled::FetchAll(_) => Operation::FetchAll,
            Fulfilled::FetchOne(_) => Operation::FetchOne,
            Fulfilled::Publish(_) => Operation::Publish,
            Fulfilled::Edit(_) => Operation::Edit,
            Fulfilled::Delete(_) => Operation::Delete,
            Fulfilled::Like(_) => Operation::Like,
            Fulfilled::Dislike(_) => Operation::Dislike,
        }
    }
}
