//! Common data types used throughout the application

use serde::{Deserialize, Serialize};

/// Access/refresh token pair as seeded on login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Body sent to the refresh endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body returned by the refresh endpoint
///
/// `refresh_token` is only present when the server rotates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// A post as served by the `/posts` resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Author of the post
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// Posts view state: the list plus its loading/error flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsState {
    pub posts: Vec<Post>,
    /// A fetch is in progress
    pub loading: bool,
    /// Message from the last failed fetch
    pub error: Option<String>,
}

impl PostsState {
    /// Request started: set `loading`, clear any previous error
    pub fn pending(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Request succeeded: replace the list
    pub fn fulfilled(&mut self, posts: Vec<Post>) {
        self.loading = false;
        self.posts = posts;
    }

    /// Request failed: keep the previous list, record the message
    pub fn rejected(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: u64) -> Post {
        Post { user_id: 1, id, title: format!("title {id}"), body: "body".into() }
    }

    #[test]
    fn refresh_response_without_rotation() {
        let parsed: RefreshResponse = serde_json::from_str(r#"{"access_token":"NEW"}"#).unwrap();
        assert_eq!(parsed.access_token, "NEW");
        assert!(parsed.refresh_token.is_none());
    }

    #[test]
    fn refresh_response_requires_access_token() {
        let parsed = serde_json::from_str::<RefreshResponse>(r#"{"token":"NEW"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn post_uses_camel_case_fields() {
        let parsed: Post =
            serde_json::from_str(r#"{"userId":7,"id":1,"title":"t","body":"b"}"#).unwrap();
        assert_eq!(parsed.user_id, 7);
    }

    #[test]
    fn posts_state_transitions() {
        let mut state = PostsState::default();

        state.pending();
        assert!(state.loading);

        state.fulfilled(vec![post(1), post(2)]);
        assert!(!state.loading);
        assert_eq!(state.posts.len(), 2);

        state.pending();
        state.rejected("boom");
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert_eq!(state.posts.len(), 2);

        state.pending();
        assert!(state.error.is_none());
    }
}
