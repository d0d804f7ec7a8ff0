//! Endpoint contracts
//!
//! One type per operation. Each knows how to build its request and how to
//! turn a response into the payload that reconciliation consumes.
//!
//! | Operation | Request | Success | Payload |
//! |---|---|---|---|
//! | fetch-all | `GET /posts` | 200 | `data.posts` |
//! | fetch-one | `GET /posts/{id}` | 200 | `data.post` |
//! | publish | `POST /posts` | 201 | last of `data.posts` |
//! | edit | `POST /posts/edit/{id}` | 201 | `{id}` in `data.posts` |
//! | delete | `DELETE /posts/{id}` | 201 | the id |
//! | like | `POST /posts/like/{id}` | 201 | `{id}` in `data.posts` |
//! | dislike | `POST /posts/dislike/{id}` | 201 | `{id}` in `data.posts` |

use serde_json::{json, Value};

use super::Operation;
use crate::error::ErrorKind;
use crate::store::Fulfilled;
use crate::transport::{Request, Response};
use crate::types::{AuthToken, Post, PostData, PostId};

/// Request/response contract of a single operation
pub trait Endpoint: Send + Sync {
    /// Payload handed back to the caller on success
    type Output: Clone + Send;

    fn operation(&self) -> Operation;

    fn request(&self) -> Request;

    /// Derive the payload from a response whose status already matched
    fn payload(&self, data: Value) -> Result<Self::Output, ErrorKind>;

    /// Wrap the payload as a reconciliation input
    fn fulfilled(&self, output: Self::Output) -> Fulfilled;

    /// Judge a response: exact status match first, then payload derivation
    fn settle(&self, response: Response) -> Result<Self::Output, ErrorKind> {
        let expected = self.operation().expected_status();
        if response.status != expected {
            return Err(ErrorKind::ContractViolation {
                expected,
                status: response.status,
                status_text: response.status_text,
            });
        }
        self.payload(response.data)
    }
}

fn request_for(operation: Operation, path: String) -> Request {
    Request::new(operation.method(), path)
}

fn take_field(data: &mut Value, field: &str) -> Result<Value, ErrorKind> {
    data.get_mut(field)
        .map(Value::take)
        .filter(|value| !value.is_null())
        .ok_or_else(|| ErrorKind::MissingPayload(format!("response has no `{}` field", field)))
}

fn decode_posts(data: &mut Value) -> Result<Vec<Post>, ErrorKind> {
    let posts = take_field(data, "posts")?;
    serde_json::from_value(posts).map_err(|e| ErrorKind::Decode(format!("posts: {}", e)))
}

fn find_post(posts: Vec<Post>, post_id: &PostId) -> Result<Post, ErrorKind> {
    posts
        .into_iter()
        .find(|post| &post.id == post_id)
        .ok_or_else(|| {
            ErrorKind::MissingPayload(format!("post {} not in returned posts", post_id))
        })
}

/// `GET /posts`
#[derive(Debug, Clone, Default)]
pub struct FetchAll;

impl Endpoint for FetchAll {
    type Output = Vec<Post>;

    fn operation(&self) -> Operation {
        Operation::FetchAll
    }

    fn request(&self) -> Request {
        request_for(Operation::FetchAll, "/posts".to_string())
    }

    fn payload(&self, mut data: Value) -> Result<Vec<Post>, ErrorKind> {
        decode_posts(&mut data)
    }

    fn fulfilled(&self, posts: Vec<Post>) -> Fulfilled {
        Fulfilled::FetchAll(posts)
    }
}

/// `GET /posts/{id}`
#[derive(Debug, Clone)]
pub struct FetchOne {
    pub post_id: PostId,
}

impl Endpoint for FetchOne {
    type Output = Post;

    fn operation(&self) -> Operation {
        Operation::FetchOne
    }

    fn request(&self) -> Request {
        request_for(Operation::FetchOne, format!("/posts/{}", self.post_id))
    }

    fn payload(&self, mut data: Value) -> Result<Post, ErrorKind> {
        let post = take_field(&mut data, "post")?;
        serde_json::from_value(post).map_err(|e| ErrorKind::Decode(format!("post: {}", e)))
    }

    fn fulfilled(&self, post: Post) -> Fulfilled {
        Fulfilled::FetchOne(post)
    }
}

/// `POST /posts` with `{"postData": {"content": ...}}`
#[derive(Debug, Clone)]
pub struct Publish {
    pub content: String,
    pub token: AuthToken,
}

impl Endpoint for Publish {
    type Output = Post;

    fn operation(&self) -> Operation {
        Operation::Publish
    }

    fn request(&self) -> Request {
        request_for(Operation::Publish, "/posts".to_string())
            .with_body(json!({ "postData": PostData::new(self.content.clone()) }))
            .with_authorization(self.token.clone())
    }

    /// The server answers with the whole list; the new post is last.
    fn payload(&self, mut data: Value) -> Result<Post, ErrorKind> {
        decode_posts(&mut data)?
            .pop()
            .ok_or_else(|| ErrorKind::MissingPayload("returned posts are empty".to_string()))
    }

    fn fulfilled(&self, post: Post) -> Fulfilled {
        Fulfilled::Publish(post)
    }
}

/// `POST /posts/edit/{id}` with `{"postData": ...}`
#[derive(Debug, Clone)]
pub struct Edit {
    pub post_id: PostId,
    pub post_data: PostData,
    pub token: AuthToken,
}

impl Endpoint for Edit {
    type Output = Post;

    fn operation(&self) -> Operation {
        Operation::Edit
    }

    fn request(&self) -> Request {
        request_for(Operation::Edit, format!("/posts/edit/{}", self.post_id))
            .with_body(json!({ "postData": self.post_data }))
            .with_authorization(self.token.clone())
    }

    fn payload(&self, mut data: Value) -> Result<Post, ErrorKind> {
        find_post(decode_posts(&mut data)?, &self.post_id)
    }

    fn fulfilled(&self, post: Post) -> Fulfilled {
        Fulfilled::Edit(post)
    }
}

/// `DELETE /posts/{id}`; the body is ignored
#[derive(Debug, Clone)]
pub struct Delete {
    pub post_id: PostId,
    pub token: AuthToken,
}

impl Endpoint for Delete {
    type Output = PostId;

    fn operation(&self) -> Operation {
        Operation::Delete
    }

    fn request(&self) -> Request {
        request_for(Operation::Delete, format!("/posts/{}", self.post_id))
            .with_authorization(self.token.clone())
    }

    fn payload(&self, _data: Value) -> Result<PostId, ErrorKind> {
        Ok(self.post_id.clone())
    }

    fn fulfilled(&self, post_id: PostId) -> Fulfilled {
        Fulfilled::Delete(post_id)
    }
}

/// `POST /posts/like/{id}` with `{}`
#[derive(Debug, Clone)]
pub struct Like {
    pub post_id: PostId,
    pub token: AuthToken,
}

impl Endpoint for Like {
    type Output = Post;

    fn operation(&self) -> Operation {
        Operation::Like
    }

    fn request(&self) -> Request {
        request_for(Operation::Like, format!("/posts/like/{}", self.post_id))
            .with_body(json!({}))
            .with_authorization(self.token.clone())
    }

    fn payload(&self, mut data: Value) -> Result<Post, ErrorKind> {
        find_post(decode_posts(&mut data)?, &self.post_id)
    }

    fn fulfilled(&self, post: Post) -> Fulfilled {
        Fulfilled::Like(post)
    }
}

/// `POST /posts/dislike/{id}` with `{}`
#[derive(Debug, Clone)]
pub struct Dislike {
    pub post_id: PostId,
    pub token: AuthToken,
}

impl Endpoint for Dislike {
    type Output = Post;

    fn operation(&self) -> Operation {
        Operation::Dislike
    }

    fn request(&self) -> Request {
        request_for(Operation::Dislike, format!("/posts/dislike/{}", self.post_id))
            .with_body(json!({}))
            .with_authorization(self.token.clone())
    }

    fn payload(&self, mut data: Value) -> Result<Post, ErrorKind> {
        find_post(decode_posts(&mut data)?, &self.post_id)
    }

    fn fulfilled(&self, post: Post) -> Fulfilled {
        Fulfilled::Dislike(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Method;

    fn created(data: Value) -> Response {
        Response {
            status: 201,
            status_text: "Created".to_string(),
            data,
        }
    }

    fn token() -> AuthToken {
        AuthToken::new("jwt")
    }

    #[test]
    fn test_fetch_all_request_has_no_auth() {
        let request = FetchAll.request();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/posts");
        assert!(request.body.is_none());
        assert!(request.authorization.is_none());
    }

    #[test]
    fn test_fetch_one_payload() {
        let endpoint = FetchOne { post_id: "p1".into() };
        let response = Response {
            status: 200,
            status_text: "OK".to_string(),
            data: json!({ "post": { "_id": "p1", "content": "hi" } }),
        };
        let post = endpoint.settle(response).unwrap();
        assert_eq!(post.content, "hi");
        assert_eq!(endpoint.request().path, "/posts/p1");
    }

    #[test]
    fn test_status_must_match_exactly() {
        let endpoint = Publish { content: "x".to_string(), token: token() };
        let response = Response {
            status: 200,
            status_text: "OK".to_string(),
            data: json!({ "posts": [{ "_id": "p1", "content": "x" }] }),
        };

        assert_eq!(
            endpoint.settle(response),
            Err(ErrorKind::ContractViolation {
                expected: 201,
                status: 200,
                status_text: "OK".to_string(),
            })
        );
    }

    #[test]
    fn test_publish_takes_last_post() {
        let endpoint = Publish { content: "new".to_string(), token: token() };
        let data = json!({ "posts": [
            { "_id": "old", "content": "old" },
            { "_id": "new", "content": "new" }
        ]});

        let post = endpoint.settle(created(data)).unwrap();
        assert_eq!(post.id, PostId::from("new"));
    }

    #[test]
    fn test_publish_request_body() {
        let request = Publish { content: "hello".to_string(), token: token() }.request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, Some(json!({ "postData": { "content": "hello" } })));
        assert!(request.authorization.is_some());
    }

    #[test]
    fn test_publish_with_empty_list_is_missing_payload() {
        let endpoint = Publish { content: "x".to_string(), token: token() };
        let result = endpoint.settle(created(json!({ "posts": [] })));
        assert!(matches!(result, Err(ErrorKind::MissingPayload(_))));
    }

    #[test]
    fn test_edit_finds_matching_post() {
        let endpoint = Edit {
            post_id: "p2".into(),
            post_data: PostData::new("changed"),
            token: token(),
        };
        let data = json!({ "posts": [
            { "_id": "p1", "content": "a" },
            { "_id": "p2", "content": "changed" }
        ]});

        assert_eq!(endpoint.settle(created(data)).unwrap().content, "changed");
        assert_eq!(endpoint.request().path, "/posts/edit/p2");
        assert_eq!(
            endpoint.request().body,
            Some(json!({ "postData": { "content": "changed" } }))
        );
    }

    #[test]
    fn test_like_missing_post_is_missing_payload() {
        let endpoint = Like { post_id: "gone".into(), token: token() };
        let result = endpoint.settle(created(json!({ "posts": [{ "_id": "p1", "content": "a" }] })));
        assert!(matches!(result, Err(ErrorKind::MissingPayload(_))));
    }

    #[test]
    fn test_dislike_request() {
        let request = Dislike { post_id: "p9".into(), token: token() }.request();
        assert_eq!(request.path, "/posts/dislike/p9");
        assert_eq!(request.body, Some(json!({})));
    }

    #[test]
    fn test_delete_payload_is_id_marker() {
        let endpoint = Delete { post_id: "p3".into(), token: token() };
        assert_eq!(endpoint.settle(created(Value::Null)).unwrap(), PostId::from("p3"));

        let request = endpoint.request();
        assert_eq!(request.method, Method::Delete);
        assert!(request.body.is_none());
    }

    #[test]
    fn test_malformed_posts_is_decode_error() {
        let result = FetchAll.settle(Response {
            status: 200,
            status_text: "OK".to_string(),
            data: json!({ "posts": [{ "content": "no id" }] }),
        });
        assert!(matches!(result, Err(ErrorKind::Decode(_))));
    }

    #[test]
    fn test_missing_posts_field() {
        let result = FetchAll.settle(Response {
            status: 200,
            status_text: "OK".to_string(),
            data: json!({ "users": [] }),
        });
        assert!(matches!(result, Err(ErrorKind::MissingPayload(_))));
    }
}
