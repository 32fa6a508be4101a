//! HTTP client for the events-schedule API.
//!
//! The API answers `GET {url}` with `{"data": [{name, map, startTime, endTime, ...}]}`
//! where times are epoch milliseconds. Extra fields are ignored. Entries that
//! are incomplete or have `startTime >= endTime` are dropped with a warning
//! instead of failing the whole fetch.

use std::time::Duration;

use chrono::DateTime;
use raidwatch_core::Event;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::source::{BoxFuture, EventSource};

const PROVIDER_NAME: &str = "events-api";

/// Configuration for [`EventsApiClient`].
#[derive(Debug, Clone)]
pub struct EventsApiConfig {
    /// Endpoint returning the event schedule.
    pub url: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl EventsApiConfig {
    /// Default endpoint.
    pub const DEFAULT_URL: &'static str = "https://metaforge.app/api/arc-raiders/events-schedule";

    /// Default user agent.
    pub const DEFAULT_USER_AGENT: &'static str = "ARC-Raiders-TG-Bot/1.0";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Creates a configuration for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(url.as_ref())?,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches the event schedule over HTTP.
#[derive(Debug)]
pub struct EventsApiClient {
    http_client: Client,
    config: EventsApiConfig,
}

impl EventsApiClient {
    /// Creates a new client.
    pub fn new(config: EventsApiConfig) -> ProviderResult<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::network(format!("failed to create HTTP client: {}", e))
                    .with_provider(PROVIDER_NAME)
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &EventsApiConfig {
        &self.config
    }

    async fn fetch(&self) -> ProviderResult<Vec<Event>> {
        let response = self
            .http_client
            .get(self.config.url.clone())
            .send()
            .await
            .map_err(|e| request_error(&e).with_source(e))?;

        let status = response.status();
        if !status.is_success() {
            let err = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                ProviderError::rate_limited(format!("HTTP {}", status))
            } else if status.is_server_error() {
                ProviderError::server(format!("HTTP {}", status))
            } else {
                ProviderError::bad_request(format!("HTTP {}", status))
            };
            return Err(err.with_provider(PROVIDER_NAME));
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e))
                .with_provider(PROVIDER_NAME)
        })?;

        let events = parse_schedule(&body)?;
        debug!(event_count = events.len(), "parsed event schedule");
        Ok(events)
    }
}

impl EventSource for EventsApiClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn fetch_events(&self) -> BoxFuture<'_, ProviderResult<Vec<Event>>> {
        Box::pin(self.fetch())
    }
}

fn request_error(e: &reqwest::Error) -> ProviderError {
    let err = if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    };
    err.with_provider(PROVIDER_NAME)
}

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    data: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    name: Option<String>,
    map: Option<String>,
    start_time: Option<i64>,
    end_time: Option<i64>,
}

impl ApiEvent {
    fn into_event(self) -> Option<Event> {
        let name = self.name.filter(|n| !n.is_empty())?;
        let map = self.map.filter(|m| !m.is_empty())?;
        let start = DateTime::from_timestamp_millis(self.start_time?)?;
        let end = DateTime::from_timestamp_millis(self.end_time?)?;
        Some(Event::new(name, map, start, end))
    }
}

/// Parses an events-schedule response body.
///
/// Invalid entries are skipped; only a body that is not the expected JSON
/// shape is an error.
pub fn parse_schedule(body: &str) -> ProviderResult<Vec<Event>> {
    let response: ScheduleResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse response: {}", e))
            .with_provider(PROVIDER_NAME)
            .with_source(e)
    })?;

    let total = response.data.len();
    let events: Vec<Event> = response
        .data
        .into_iter()
        .filter_map(ApiEvent::into_event)
        .filter(Event::is_valid)
        .collect();

    let dropped = total - events.len();
    if dropped > 0 {
        warn!(dropped, "skipped invalid events in schedule");
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    #[test]
    fn parses_data_array() {
        let body = r#"{
            "data": [
                {"name": "Matriarch", "map": "Dam", "startTime": 1762192800000, "endTime": 1762196400000, "icon": "x"},
                {"name": "Harvester", "map": "Spaceport", "startTime": 1762196400000, "endTime": 1762200000000}
            ],
            "cachedAt": 1
        }"#;

        let events = parse_schedule(body).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "Matriarch");
        assert_eq!(events[0].map, "Dam");
        assert_eq!(events[0].start_time.timestamp_millis(), 1762192800000);
        assert_eq!(events[1].end_time.timestamp_millis(), 1762200000000);
    }

    #[test]
    fn drops_invalid_entries() {
        let body = r#"{"data": [
            {"name": "Backwards", "map": "Dam", "startTime": 2000, "endTime": 1000},
            {"name": "Empty", "map": "Dam", "startTime": 1000, "endTime": 1000},
            {"name": "NoMap", "startTime": 1000, "endTime": 2000},
            {"name": "NoEnd", "map": "Dam", "startTime": 1000},
            {"name": "Ok", "map": "Dam", "startTime": 1000, "endTime": 2000}
        ]}"#;

        let events = parse_schedule(body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Ok");
    }

    #[test]
    fn missing_data_is_empty() {
        assert!(parse_schedule("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_invalid_response() {
        let err = parse_schedule("<html>502</html>").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
        assert_eq!(err.provider(), Some(PROVIDER_NAME));
    }

    #[test]
    fn config_defaults() {
        let config = EventsApiConfig::new(EventsApiConfig::DEFAULT_URL).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.user_agent, "ARC-Raiders-TG-Bot/1.0");
        assert!(EventsApiConfig::new("not a url").is_err());
    }

    #[test]
    fn client_builds() {
        let config = EventsApiConfig::new("https://example.com/events")
            .unwrap()
            .with_timeout(Duration::from_secs(3))
            .with_user_agent("test/1.0");
        let client = EventsApiClient::new(config).unwrap();
        assert_eq!(client.name(), "events-api");
        assert_eq!(client.config().user_agent, "test/1.0");
    }

    mod http {
        use super::*;
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        const SCHEDULE: &str = r#"{"data": [
            {"name": "Matriarch", "map": "Dam", "startTime": 1762192800000, "endTime": 1762196400000}
        ]}"#;

        fn client_for(server: &MockServer) -> EventsApiClient {
            let config = EventsApiConfig::new(format!("{}/events", server.uri())).unwrap();
            EventsApiClient::new(config).unwrap()
        }

        #[tokio::test]
        async fn sends_user_agent_and_parses_schedule() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/events"))
                .and(header("user-agent", EventsApiConfig::DEFAULT_USER_AGENT))
                .respond_with(ResponseTemplate::new(200).set_body_string(SCHEDULE))
                .expect(1)
                .mount(&server)
                .await;

            let events = client_for(&server).fetch_events().await.unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].name, "Matriarch");
            assert_eq!(events[0].map, "Dam");
        }

        #[tokio::test]
        async fn custom_user_agent_is_sent() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(header("user-agent", "raidwatch-test/2.0"))
                .respond_with(ResponseTemplate::new(200).set_body_string(SCHEDULE))
                .expect(1)
                .mount(&server)
                .await;

            let config = EventsApiConfig::new(format!("{}/events", server.uri()))
                .unwrap()
                .with_user_agent("raidwatch-test/2.0");
            let client = EventsApiClient::new(config).unwrap();
            assert_eq!(client.fetch_events().await.unwrap().len(), 1);
        }

        #[tokio::test]
        async fn slow_response_times_out() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string(SCHEDULE)
                        .set_delay(Duration::from_secs(5)),
                )
                .mount(&server)
                .await;

            let config = EventsApiConfig::new(format!("{}/events", server.uri()))
                .unwrap()
                .with_timeout(Duration::from_millis(200));
            let client = EventsApiClient::new(config).unwrap();

            let err = client.fetch_events().await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::NetworkError);
            assert!(err.to_string().contains("timeout"));
            assert_eq!(err.provider(), Some(PROVIDER_NAME));
        }

        #[tokio::test]
        async fn status_codes_map_to_error_codes() {
            let cases = [
                (429, ProviderErrorCode::RateLimited),
                (500, ProviderErrorCode::ServerError),
                (503, ProviderErrorCode::ServerError),
                (400, ProviderErrorCode::BadRequest),
                (404, ProviderErrorCode::BadRequest),
            ];

            for (status, expected) in cases {
                let server = MockServer::start().await;
                Mock::given(method("GET"))
                    .and(path("/events"))
                    .respond_with(ResponseTemplate::new(status).set_body_string(SCHEDULE))
                    .expect(1)
                    .mount(&server)
                    .await;

                let err = client_for(&server).fetch_events().await.unwrap_err();
                assert_eq!(err.code(), expected, "HTTP {}", status);
                assert!(err.to_string().contains(&status.to_string()));
            }
        }

        #[tokio::test]
        async fn html_error_page_is_invalid_response() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
                .mount(&server)
                .await;

            let err = client_for(&server).fetch_events().await.unwrap_err();
            assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
        }
    }
}
