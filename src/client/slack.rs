//! Slack Web API client implementation

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::api::{AuthApi, ConversationScope, ConversationsApi, UsersApi};
use super::models::{AuthInfo, Conversation, User};
use super::pagination::{CursorPage, CursorParams, ResponseMetadata};
use super::rate_limit::{MethodTier, RateLimiterSet};
use crate::config::Config;
use crate::error::{ApiError, Result};

/// Conversation types requested from list methods
const CONVERSATION_TYPES: &str = "public_channel,private_channel,mpim,im";

/// Wait used when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Slack Web API client
pub struct SlackClient {
    http: HttpClient,
    base_url: String,
    token: String,
    cookie: Option<String>,
    rate_limiters: RateLimiterSet,
}

impl SlackClient {
    /// Create a client for the public Slack API.
    #[cfg(test)]
    pub fn new(token: impl Into<String>, cookie: Option<String>) -> Result<Self> {
        Self::with_base_url(token, cookie, crate::config::DEFAULT_API_URL)
    }

    /// Create a client against a custom API base URL (for testing or proxies).
    pub fn with_base_url(
        token: impl Into<String>,
        cookie: Option<String>,
        base_url: &str,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            cookie: cookie.filter(|c| !c.is_empty()),
            rate_limiters: RateLimiterSet::new(),
        })
    }

    /// Create a client from config. The token may be empty for offline use.
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config.token.clone().unwrap_or_default();
        Self::with_base_url(token, config.cookie.clone(), config.api_url())
    }

    /// Call a Web API method and decode its payload.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&'static str, String)],
    ) -> Result<T> {
        let tier = MethodTier::for_method(method);
        self.rate_limiters.wait_for(tier).await;

        let url = format!("{}/{}", self.base_url, method);
        debug!("GET {} {:?}", method, query);

        let mut request = self
            .http
            .get(&url)
            .query(query)
            .header("Authorization", format!("Bearer {}", self.token));
        if let Some(ref cookie) = self.cookie {
            request = request.header("Cookie", format!("d={}", cookie));
        }

        let response = request.send().await.map_err(ApiError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => {
                self.rate_limiters.activate(tier).await;
                return Err(ApiError::RateLimit(retry_after(response.headers())).into());
            }
            StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => return Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                return Err(ApiError::NotFound(format!("method {}", method)).into());
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                return Err(ApiError::ServerError(error_msg).into());
            }
            status if status.is_client_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                return Err(ApiError::BadRequest(error_msg).into());
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                return Err(ApiError::InvalidResponse(error_msg).into());
            }
        }

        let headers = response.headers().clone();
        let body: serde_json::Value = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        if !body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            let code = body
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown_error");
            if code == "ratelimited" {
                self.rate_limiters.activate(tier).await;
                return Err(ApiError::RateLimit(retry_after(&headers)).into());
            }
            return Err(slack_error(code, method).into());
        }

        serde_json::from_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", method, e)).into())
    }
}

/// Read `Retry-After` (whole seconds) from a response.
fn retry_after(headers: &reqwest::header::HeaderMap) -> Duration {
    let secs = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    Duration::from_secs(secs)
}

/// Map a Slack `error` code to an [`ApiError`].
fn slack_error(code: &str, method: &str) -> ApiError {
    match code {
        "invalid_auth" | "not_authed" | "token_revoked" | "token_expired" | "account_inactive" => {
            ApiError::Unauthorized
        }
        "missing_scope" | "no_permission" | "ekm_access_denied" => ApiError::Forbidden,
        "channel_not_found" | "user_not_found" => {
            ApiError::NotFound(format!("{} ({})", code, method))
        }
        "invalid_cursor" | "invalid_limit" | "invalid_types" | "invalid_arguments" => {
            ApiError::BadRequest(code.to_string())
        }
        "internal_error" | "fatal_error" | "service_unavailable" | "request_timeout" => {
            ApiError::ServerError(code.to_string())
        }
        other => ApiError::Slack(other.to_string()),
    }
}

#[derive(Deserialize)]
struct ConversationsResponse {
    #[serde(default)]
    channels: Vec<Conversation>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Deserialize)]
struct ConversationInfoResponse {
    channel: Conversation,
}

#[derive(Deserialize)]
struct UsersResponse {
    #[serde(default)]
    members: Vec<User>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[async_trait]
impl AuthApi for SlackClient {
    async fn auth_test(&self) -> Result<AuthInfo> {
        self.call("auth.test", &[]).await
    }
}

#[async_trait]
impl ConversationsApi for SlackClient {
    async fn list_conversations(
        &self,
        scope: ConversationScope,
        params: &CursorParams,
    ) -> Result<CursorPage<Conversation>> {
        let mut query = params.to_query_params();
        query.push(("types", CONVERSATION_TYPES.to_string()));

        let method = match scope {
            ConversationScope::MemberOnly => {
                query.push(("exclude_archived", "true".to_string()));
                "users.conversations"
            }
            ConversationScope::All => "conversations.list",
        };

        let response: ConversationsResponse = self.call(method, &query).await?;
        Ok(CursorPage {
            next_cursor: response.response_metadata.next_cursor(),
            items: response.channels,
        })
    }

    async fn get_conversation(&self, id: &str) -> Result<Conversation> {
        let query = [("channel", id.to_string())];
        let response: ConversationInfoResponse = self.call("conversations.info", &query).await?;
        Ok(response.channel)
    }
}

#[async_trait]
impl UsersApi for SlackClient {
    async fn list_users(&self, params: &CursorParams) -> Result<CursorPage<User>> {
        let query = params.to_query_params();
        let response: UsersResponse = self.call("users.list", &query).await?;
        Ok(CursorPage {
            next_cursor: response.response_metadata.next_cursor(),
            items: response.members,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> SlackClient {
        SlackClient::with_base_url("xoxb-test", None, &server.url()).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = SlackClient::new("xoxb-test", Some(String::new()));
        assert!(client.is_ok());
        assert!(client.unwrap().cookie.is_none());
    }

    #[test]
    fn test_slack_error_mapping() {
        assert!(matches!(
            slack_error("invalid_auth", "auth.test"),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            slack_error("missing_scope", "users.list"),
            ApiError::Forbidden
        ));
        assert!(matches!(
            slack_error("channel_not_found", "conversations.info"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            slack_error("internal_error", "conversations.list"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            slack_error("something_new", "conversations.list"),
            ApiError::Slack(_)
        ));
    }

    #[tokio::test]
    async fn test_list_member_conversations_uses_users_conversations() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users.conversations")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "100".into()),
                Matcher::UrlEncoded("exclude_archived".into(), "true".into()),
            ]))
            .match_header("authorization", "Bearer xoxb-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"ok":true,
                    "channels":[{"id":"C0000000001","name":"general","is_channel":true}],
                    "response_metadata":{"next_cursor":"dGVhbTpD"}}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client
            .list_conversations(
                ConversationScope::MemberOnly,
                &CursorParams::new().limit(100),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "general");
        assert_eq!(page.next_cursor.as_deref(), Some("dGVhbTpD"));
    }

    #[tokio::test]
    async fn test_list_all_conversations_last_page() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/conversations.list")
            .match_query(Matcher::UrlEncoded("cursor".into(), "abc".into()))
            .with_status(200)
            .with_body(r#"{"ok":true,"channels":[],"response_metadata":{"next_cursor":""}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client
            .list_conversations(ConversationScope::All, &CursorParams::new().cursor("abc"))
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert!(!page.has_next_page());
    }

    #[tokio::test]
    async fn test_http_429_maps_to_rate_limit_with_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/conversations.list")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_header("retry-after", "7")
            .with_body(r#"{"ok":false,"error":"ratelimited"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client
            .list_conversations(ConversationScope::All, &CursorParams::new())
            .await;

        match result {
            Err(Error::Api(ApiError::RateLimit(d))) => assert_eq!(d, Duration::from_secs(7)),
            other => panic!("expected rate limit, got {:?}", other.map(|p| p.items.len())),
        }
        assert!(client.rate_limiters.is_active(MethodTier::Tier2).await);
    }

    #[tokio::test]
    async fn test_ok_false_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/conversations.info")
            .match_query(Matcher::UrlEncoded("channel".into(), "C0000000404".into()))
            .with_status(200)
            .with_body(r#"{"ok":false,"error":"channel_not_found"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.get_conversation("C0000000404").await;

        assert!(matches!(result, Err(Error::Api(ApiError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_cookie_header_is_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth.test")
            .match_header("cookie", "d=xoxd-secret")
            .with_status(200)
            .with_body(r#"{"ok":true,"url":"https://acme.slack.com/","team":"Acme","user":"ada","team_id":"T1","user_id":"U1"}"#)
            .create_async()
            .await;

        let client =
            SlackClient::with_base_url("xoxc-test", Some("xoxd-secret".to_string()), &server.url())
                .unwrap();
        let info = client.auth_test().await.unwrap();

        mock.assert_async().await;
        assert_eq!(info.team, "Acme");
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/users.list")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.list_users(&CursorParams::new()).await.unwrap_err();

        assert_eq!(err.class(), crate::error::FailureClass::Transient);
    }
}
