//! HTTP client for the contact-center platform REST API.
//!
//! This module provides the [`PlatformApi`] trait used by the aggregator
//! and [`HttpPlatformClient`], which calls the platform with the bearer
//! token of an open [`Session`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use presence_auth::Session;
use presence_core::UserId;
use reqwest::header::AUTHORIZATION;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};

/// Trait for the platform calls the aggregator needs.
///
/// This trait abstracts the REST API, allowing for mock implementations
/// in tests.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Fetch one page of users.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    async fn list_users(&self, page_size: u32, page_number: u32) -> Result<Vec<PlatformUser>>;

    /// Fetch the presence of a single user from the given presence source.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    async fn get_user_presence(&self, user_id: &UserId, source_id: &str) -> Result<UserPresence>;
}

/// A user as returned by the listing endpoint.
///
/// Every field is optional on the wire; users missing an id, name or email
/// are skipped by the aggregator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformUser {
    /// Platform user id.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Department.
    #[serde(default)]
    pub department: Option<String>,
    /// Job title.
    #[serde(default)]
    pub title: Option<String>,
}

impl PlatformUser {
    /// Build a user with the three required fields set.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            email: Some(email.into()),
            department: None,
            title: None,
        }
    }

    /// Set the department.
    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

/// Paged user listing.
#[derive(Debug, Deserialize)]
struct UserListing {
    #[serde(default)]
    entities: Vec<PlatformUser>,
}

/// Presence of a single user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPresence {
    /// The presence definition, if any.
    #[serde(default)]
    pub presence_definition: Option<PresenceDefinition>,
    /// When the presence last changed.
    #[serde(default)]
    pub modified_date: Option<DateTime<Utc>>,
}

/// Platform presence definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceDefinition {
    /// System presence label (e.g. "Available", "OFFLINE").
    #[serde(default)]
    pub system_presence: Option<String>,
}

impl UserPresence {
    /// Presence with the given system label.
    #[must_use]
    pub fn with_system_presence(label: impl Into<String>) -> Self {
        Self {
            presence_definition: Some(PresenceDefinition {
                system_presence: Some(label.into()),
            }),
            modified_date: None,
        }
    }

    /// The raw system presence label, if present.
    #[must_use]
    pub fn system_presence(&self) -> Option<&str> {
        self.presence_definition
            .as_ref()
            .and_then(|d| d.system_presence.as_deref())
    }
}

/// HTTP client for the platform REST API, bound to one session.
#[derive(Debug, Clone)]
pub struct HttpPlatformClient {
    client: reqwest::Client,
    session: Session,
}

impl HttpPlatformClient {
    /// Create a new platform client for an open session.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created.
    #[must_use]
    pub fn new(session: Session, request_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, session }
    }

    /// Create a new platform client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, session: Session) -> Self {
        Self { client, session }
    }

    /// Get the API base path of the bound session.
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.session.base_path()
    }

    /// Endpoint URL under the base path, one encoded segment per entry.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(self.base_path())
            .map_err(|e| MonitorError::Internal(format!("invalid base path: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| MonitorError::Internal("base path cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, self.session.bearer_authorization())
            .send()
            .await
            .map_err(|e| MonitorError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MonitorError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MonitorError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl PlatformApi for HttpPlatformClient {
    async fn list_users(&self, page_size: u32, page_number: u32) -> Result<Vec<PlatformUser>> {
        let mut url = self.endpoint(&["users"])?;
        url.query_pairs_mut()
            .append_pair("pageSize", &page_size.to_string())
            .append_pair("pageNumber", &page_number.to_string());

        let listing: UserListing = self.get_json(url).await?;
        tracing::debug!(count = listing.entities.len(), "Fetched user page");
        Ok(listing.entities)
    }

    async fn get_user_presence(&self, user_id: &UserId, source_id: &str) -> Result<UserPresence> {
        let mut url = self.endpoint(&["presence", user_id.as_str()])?;
        url.query_pairs_mut().append_pair("sourceId", source_id);

        self.get_json(url).await
    }
}

/// An in-memory platform for tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// How the mock answers a presence lookup.
    #[derive(Debug, Clone)]
    pub enum PresenceReply {
        /// Return this presence.
        Ok(UserPresence),
        /// Fail with this error.
        Fail(MonitorError),
        /// Never answer.
        Hang,
    }

    /// A mock platform that serves users and presences from memory.
    #[derive(Default)]
    pub struct MockPlatform {
        users: Mutex<Vec<PlatformUser>>,
        presences: Mutex<HashMap<String, PresenceReply>>,
        list_error: Mutex<Option<MonitorError>>,
        list_delay: Mutex<Duration>,
        list_calls: AtomicUsize,
        presence_calls: AtomicUsize,
    }

    impl MockPlatform {
        /// Create a new, empty mock platform.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a user with the given presence label.
        pub fn add_user(&self, user: PlatformUser, presence: &str) {
            if let Some(id) = &user.id {
                self.presences.lock().insert(
                    id.clone(),
                    PresenceReply::Ok(UserPresence::with_system_presence(presence)),
                );
            }
            self.users.lock().push(user);
        }

        /// Override the presence reply for a user.
        pub fn set_presence(&self, user_id: &str, reply: PresenceReply) {
            self.presences.lock().insert(user_id.to_string(), reply);
        }

        /// Make the user listing fail (or succeed again with `None`).
        pub fn set_list_error(&self, error: Option<MonitorError>) {
            *self.list_error.lock() = error;
        }

        /// Delay every user listing by `delay`.
        pub fn set_list_delay(&self, delay: Duration) {
            *self.list_delay.lock() = delay;
        }

        /// Number of user listings served.
        #[must_use]
        pub fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        /// Number of presence lookups served.
        #[must_use]
        pub fn presence_calls(&self) -> usize {
            self.presence_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlatformApi for MockPlatform {
        async fn list_users(&self, page_size: u32, _page_number: u32) -> Result<Vec<PlatformUser>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);

            let delay = *self.list_delay.lock();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let list_error = self.list_error.lock().clone();
            if let Some(err) = list_error {
                return Err(err);
            }

            let limit = usize::try_from(page_size).unwrap_or(usize::MAX);
            Ok(self.users.lock().iter().take(limit).cloned().collect())
        }

        async fn get_user_presence(&self, user_id: &UserId, _source_id: &str) -> Result<UserPresence> {
            self.presence_calls.fetch_add(1, Ordering::SeqCst);

            let reply = self.presences.lock().get(user_id.as_str()).cloned();
            match reply {
                Some(PresenceReply::Ok(presence)) => Ok(presence),
                Some(PresenceReply::Fail(err)) => Err(err),
                Some(PresenceReply::Hang) => std::future::pending().await,
                None => Err(MonitorError::Http {
                    status: 404,
                    body: "presence not found".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpPlatformClient {
        HttpPlatformClient::new(Session::new("tok", server.uri()), Duration::from_secs(5))
    }

    #[test]
    fn presence_deserializes_camel_case() {
        let presence: UserPresence = serde_json::from_str(
            r#"{"presenceDefinition":{"id":"x","systemPresence":"Available"},"modifiedDate":"2024-05-01T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(presence.system_presence(), Some("Available"));
        assert!(presence.modified_date.is_some());

        let empty: UserPresence = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.system_presence(), None);
    }

    #[tokio::test]
    async fn list_users_sends_bearer_and_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .and(query_param("pageSize", "100"))
            .and(query_param("pageNumber", "1"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "entities": [
                    {"id": "u1", "name": "Ada", "email": "ada@x.com", "department": "Sales"},
                    {"id": "u2", "name": "Bo"}
                ],
                "pageSize": 100,
                "pageNumber": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let users = client_for(&server).list_users(100, 1).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].department.as_deref(), Some("Sales"));
        assert!(users[1].email.is_none());
    }

    #[tokio::test]
    async fn get_presence_uses_source_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/presence/u1"))
            .and(query_param("sourceId", "PURECLOUD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "presenceDefinition": {"systemPresence": "Busy"}
            })))
            .mount(&server)
            .await;

        let presence = client_for(&server)
            .get_user_presence(&UserId::new("u1"), "PURECLOUD")
            .await
            .unwrap();
        assert_eq!(presence.system_presence(), Some("Busy"));
    }

    #[tokio::test]
    async fn user_id_is_sent_as_one_encoded_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/presence/a%2Fb%3Fc%23d"))
            .and(query_param("sourceId", "SRC&x=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "presenceDefinition": {"systemPresence": "Away"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let presence = client_for(&server)
            .get_user_presence(&UserId::new("a/b?c#d"), "SRC&x=1")
            .await
            .unwrap();
        assert_eq!(presence.system_presence(), Some("Away"));
    }

    #[tokio::test]
    async fn error_status_maps_to_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_users(100, 1).await.unwrap_err();
        assert!(matches!(err, MonitorError::Http { status: 403, ref body } if body == "forbidden"));
    }

    #[tokio::test]
    async fn bad_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).list_users(100, 1).await.unwrap_err();
        assert!(matches!(err, MonitorError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_platform_is_network_error() {
        let client =
            HttpPlatformClient::new(Session::new("tok", "http://127.0.0.1:1"), Duration::from_secs(2));
        let err = client.list_users(100, 1).await.unwrap_err();
        assert!(matches!(err, MonitorError::Network(_)));
    }
}
