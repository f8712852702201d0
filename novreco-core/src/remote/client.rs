use crate::error::RecoError;
use log::debug;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use tokio::time::Duration;

const USER_AGENT: &str = "novreco-core/0.1";
const ACCEPT: &str = "application/json";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const MAX_API_HISTORY: usize = 100;

#[derive(Debug, Clone)]
pub struct ApiCall {
    pub url: String,
    pub timestamp: OffsetDateTime,
    pub status_code: u16,
    pub success: bool,
    pub call_type: ApiCallType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCallType {
    NetworkRequest,
    CacheHit,
    CacheMiss,
}

/// Bounded log of recent requests and cache lookups, shared by handle.
#[derive(Debug, Clone)]
pub struct CallHistory {
    calls: Arc<Mutex<Vec<ApiCall>>>,
    limit: usize,
}

impl Default for CallHistory {
    fn default() -> Self {
        Self::with_limit(MAX_API_HISTORY)
    }
}

impl CallHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            limit: limit.max(1),
        }
    }

    pub fn record(&self, call: ApiCall) {
        if let Ok(mut history) = self.calls.lock() {
            history.push(call);
            if history.len() > self.limit {
                let excess = history.len() - self.limit;
                history.drain(0..excess);
            }
        }
    }

    /// Cache lookups count as successful calls with status 200.
    pub fn record_cache_operation(&self, url: &str, call_type: ApiCallType) {
        self.record(ApiCall {
            url: url.to_string(),
            timestamp: OffsetDateTime::now_utc(),
            status_code: 200,
            success: true,
            call_type,
        });
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut history) = self.calls.lock() {
            history.clear();
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    /// Applied to the whole request, connect through body.
    pub timeout: Duration,
    pub history_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            history_limit: MAX_API_HISTORY,
        }
    }
}

#[derive(Debug)]
pub struct RecordClient {
    client: reqwest::Client,
    history: CallHistory,
}

impl RecordClient {
    pub fn new(config: ClientConfig) -> Result<Self, RecoError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(ACCEPT),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent)
            .timeout(config.timeout)
            .build()?;

        Ok(RecordClient {
            client,
            history: CallHistory::with_limit(config.history_limit),
        })
    }

    pub async fn call(&self, url: &str) -> Result<reqwest::Response, RecoError> {
        debug!("GET {}", url);

        let timestamp = OffsetDateTime::now_utc();
        match self.client.get(url).send().await {
            Ok(response) => {
                let status_code = response.status().as_u16();
                let success = response.status().is_success();
                self.history.record(ApiCall {
                    url: url.to_string(),
                    timestamp,
                    status_code,
                    success,
                    call_type: ApiCallType::NetworkRequest,
                });

                if !success {
                    return Err(RecoError::Status {
                        url: url.to_string(),
                        status: status_code,
                    });
                }
                Ok(response)
            }
            Err(e) => {
                self.history.record(ApiCall {
                    url: url.to_string(),
                    timestamp,
                    // Unknown status for transport errors
                    status_code: 0,
                    success: false,
                    call_type: ApiCallType::NetworkRequest,
                });
                Err(RecoError::Network(e))
            }
        }
    }

    pub fn history(&self) -> &CallHistory {
        &self.history
    }

    pub fn call_history(&self) -> Vec<ApiCall> {
        self.history.calls()
    }

    pub fn clear_call_history(&self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let history = CallHistory::with_limit(3);
        for i in 0..5 {
            history.record_cache_operation(&format!("https://example.com/{}", i), ApiCallType::CacheHit);
        }
        let calls = history.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].url, "https://example.com/2");
        assert_eq!(calls[2].url, "https://example.com/4");
    }

    #[test]
    fn test_history_shared_between_handles() {
        let history = CallHistory::default();
        let other = history.clone();
        other.record_cache_operation("https://example.com/a", ApiCallType::CacheMiss);
        assert_eq!(history.calls().len(), 1);
        assert_eq!(history.calls()[0].call_type, ApiCallType::CacheMiss);
        history.clear();
        assert!(other.calls().is_empty());
    }

    #[test]
    fn test_client_builds_with_defaults() {
        let client = RecordClient::new(ClientConfig::default()).unwrap();
        assert!(client.call_history().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = RecordClient::new(ClientConfig {
            timeout: Duration::from_secs(2),
            ..ClientConfig::default()
        })
        .unwrap();

        // Port 9 on localhost is the discard service, normally closed.
        let err = client.call("http://127.0.0.1:9/api/checkins").await.unwrap_err();
        assert!(err.is_network());
        let calls = client.call_history();
        assert_eq!(calls.len(), 1);
        assert!(!calls[0].success);
        assert_eq!(calls[0].status_code, 0);
    }
}
