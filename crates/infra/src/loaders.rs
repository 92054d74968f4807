//! Data loaders
//!
//! Thin async functions over [`ApiClient`] for the resources the app reads.
//! Every call goes through the authenticated client, so token attachment and
//! refresh-on-401 apply to all of them.

use serde_json::Value;
use tokenline_domain::{Post, PostsState};
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};

/// `GET /data`, returning the raw JSON body.
///
/// # Errors
/// Any [`ApiError`] from the client.
pub async fn load_data(client: &ApiClient) -> Result<Value, ApiError> {
    client.get("/data").await
}

/// `GET /posts`
///
/// # Errors
/// Any [`ApiError`] from the client, or `ApiError::Decode` if the body is not
/// a list of posts.
pub async fn fetch_posts(client: &ApiClient) -> Result<Vec<Post>, ApiError> {
    let posts: Vec<Post> = client.get("/posts").await?;
    info!(count = posts.len(), "Fetched posts");
    Ok(posts)
}

/// `GET /posts/{id}`
///
/// # Errors
/// Any [`ApiError`] from the client.
pub async fn fetch_post(client: &ApiClient, id: u64) -> Result<Post, ApiError> {
    client.get(&format!("/posts/{id}")).await
}

/// Run [`fetch_posts`] and fold the outcome into `state`.
///
/// On failure the previous list is kept and the error message recorded.
pub async fn load_posts(client: &ApiClient, state: &mut PostsState) {
    state.pending();
    match fetch_posts(client).await {
        Ok(posts) => state.fulfilled(posts),
        Err(e) => {
            warn!(error = %e, "Failed to load posts");
            state.rejected(e.to_string());
        }
    }
}
