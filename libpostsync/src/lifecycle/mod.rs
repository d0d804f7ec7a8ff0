//! Request lifecycle tracking
//!
//! Every logical operation runs through three phases:
//!
//! ```text
//! pending ──► fulfilled(payload)
//!        └──► rejected(error)
//! ```
//!
//! `pending` is dispatched before any I/O; exactly one terminal phase
//! follows it. The endpoint contract of each operation (method, path,
//! expected status, payload derivation) lives in [`endpoints`]; the
//! phase sequencing lives in [`tracker`].

pub mod endpoints;
pub mod tracker;

pub use endpoints::{Delete, Dislike, Edit, Endpoint, FetchAll, FetchOne, Like, Publish};
pub use tracker::LifecycleTracker;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transport::Method;

/// The closed set of operations against the posts API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    FetchAll,
    FetchOne,
    Publish,
    Edit,
    Delete,
    Like,
    Dislike,
}

/// Which loading flag an operation drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// fetch-all, fetch-one
    List,
    /// publish, edit, delete, like, dislike
    Content,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::FetchAll,
        Operation::FetchOne,
        Operation::Publish,
        Operation::Edit,
        Operation::Delete,
        Operation::Like,
        Operation::Dislike,
    ];

    pub fn category(self) -> Category {
        match self {
            Operation::FetchAll | Operation::FetchOne => Category::List,
            Operation::Publish
            | Operation::Edit
            | Operation::Delete
            | Operation::Like
            | Operation::Dislike => Category::Content,
        }
    }

    pub fn method(self) -> Method {
        match self {
            Operation::FetchAll | Operation::FetchOne => Method::Get,
            Operation::Delete => Method::Delete,
            Operation::Publish | Operation::Edit | Operation::Like | Operation::Dislike => {
                Method::Post
            }
        }
    }

    /// The only status code that counts as success.
    ///
    /// Matched exactly; a 200 where 201 is expected is a contract
    /// violation. DELETE answering 201 is what the API does.
    pub fn expected_status(self) -> u16 {
        match self {
            Operation::FetchAll | Operation::FetchOne => 200,
            Operation::Publish
            | Operation::Edit
            | Operation::Delete
            | Operation::Like
            | Operation::Dislike => 201,
        }
    }

    pub fn requires_authorization(self) -> bool {
        self.category() == Category::Content
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::FetchAll => "fetch-all",
            Operation::FetchOne => "fetch-one",
            Operation::Publish => "publish",
            Operation::Edit => "edit",
            Operation::Delete => "delete",
            Operation::Like => "like",
            Operation::Dislike => "dislike",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_table() {
        let table: Vec<(Operation, Method, u16)> = Operation::ALL
            .iter()
            .map(|op| (*op, op.method(), op.expected_status()))
            .collect();

        assert_eq!(
            table,
            vec![
                (Operation::FetchAll, Method::Get, 200),
                (Operation::FetchOne, Method::Get, 200),
                (Operation::Publish, Method::Post, 201),
                (Operation::Edit, Method::Post, 201),
                (Operation::Delete, Method::Delete, 201),
                (Operation::Like, Method::Post, 201),
                (Operation::Dislike, Method::Post, 201),
            ]
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(Operation::FetchAll.category(), Category::List);
        assert_eq!(Operation::FetchOne.category(), Category::List);
        for op in &Operation::ALL[2..] {
            assert_eq!(op.category(), Category::Content, "{op}");
            assert!(op.requires_authorization());
        }
    }

    #[test]
    fn test_operation_names_match_serde() {
        for op in Operation::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.name()));
        }
    }
}
