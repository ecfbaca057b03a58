//! HTTP client for the Agora REST API.
//!
//! Thin typed wrapper over `reqwest`: one method per endpoint, JSON in and
//! out. Any non-2xx status is surfaced as [`ClientError::Status`] with the
//! server's error body.

use agora_types::{Comment, Message, Post, SubReddit, User};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

/// Default API root used when `--base-url` is not given.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Errors returned by [`ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response body not decoded.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
}

/// Typed client for one API root.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// The API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -----------------------------------------------------------------------
    // Accounts and communities
    // -----------------------------------------------------------------------

    /// Log in as `username`, registering the account if it is new.
    pub async fn create_user(&self, username: &str) -> Result<User, ClientError> {
        self.post("user", &json!({ "username": username })).await
    }

    /// Create a subreddit.
    pub async fn create_subreddit(&self, name: &str) -> Result<SubReddit, ClientError> {
        self.post("subreddit", &json!({ "name": name })).await
    }

    /// All users.
    pub async fn get_all_users(&self) -> Result<Vec<User>, ClientError> {
        self.get("getusers").await
    }

    /// All subreddits.
    pub async fn get_all_subreddits(&self) -> Result<Vec<SubReddit>, ClientError> {
        self.get("getsubreddits").await
    }

    /// Every post.
    pub async fn get_all_posts(&self) -> Result<Vec<Post>, ClientError> {
        self.get("getposts").await
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    /// Submit a post to `subreddit` as `username`.
    pub async fn submit_post(
        &self,
        subreddit: &str,
        username: &str,
        title: &str,
        content: &str,
    ) -> Result<Post, ClientError> {
        let body = json!({ "title": title, "content": content, "username": username });
        self.post(&format!("{subreddit}/submit"), &body).await
    }

    /// Comment on the post with id `post_id` as `username`.
    pub async fn create_comment(
        &self,
        post_id: &str,
        username: &str,
        content: &str,
    ) -> Result<Comment, ClientError> {
        let body = json!({ "content": content, "username": username });
        self.post(&format!("{post_id}/comment"), &body).await
    }

    /// Vote on the post with id `post_id`.
    pub async fn vote(&self, post_id: &str, upvote: bool) -> Result<(), ClientError> {
        self.post_unit(&format!("{post_id}/vote"), &json!({ "upvote": upvote }))
            .await
    }

    // -----------------------------------------------------------------------
    // Membership and feeds
    // -----------------------------------------------------------------------

    /// Join `subreddit` as `username`.
    pub async fn join_subreddit(&self, subreddit: &str, username: &str) -> Result<(), ClientError> {
        self.post_unit(&format!("{subreddit}/join"), &json!({ "username": username }))
            .await
    }

    /// Leave `subreddit` as `username`.
    pub async fn leave_subreddit(
        &self,
        subreddit: &str,
        username: &str,
    ) -> Result<(), ClientError> {
        self.post_unit(&format!("{subreddit}/leave"), &json!({ "username": username }))
            .await
    }

    /// Posts of `subreddit`.
    pub async fn get_feed(&self, subreddit: &str) -> Result<Vec<Post>, ClientError> {
        self.get(&format!("{subreddit}/feed")).await
    }

    // -----------------------------------------------------------------------
    // Messaging
    // -----------------------------------------------------------------------

    /// Send a direct message.
    pub async fn send_message(
        &self,
        from: &str,
        to: &str,
        content: &str,
    ) -> Result<Message, ClientError> {
        let body = json!({ "from": from, "to": to, "content": content });
        self.post("message", &body).await
    }

    /// Inbox of `username`.
    pub async fn get_messages(&self, username: &str) -> Result<Vec<Message>, ClientError> {
        self.get(&format!("{username}/messages")).await
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.client.get(self.url(path)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn post_unit<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        check(response).await?;
        Ok(())
    }
}

/// Turn a non-success response into [`ClientError::Status`].
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_owned());
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}
