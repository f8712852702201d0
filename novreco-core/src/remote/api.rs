use super::{RecordSource, client::RecordClient, models::parse_records};
use crate::error::RecoError;
use crate::record::Record;
use log::info;
use serde_json::Value;

impl RecordClient {
    /// Fetches a list endpoint and returns its rows.
    pub async fn fetch_records(&self, url: &str) -> Result<Vec<Record>, RecoError> {
        let response = self.call(url).await?;
        let bytes = response.bytes().await?;
        // decode here so a malformed body is a Json error, not a transport one
        let body: Value = serde_json::from_slice(&bytes)?;
        let records = parse_records(body)?;
        info!("Fetched {} records from {}", records.len(), url);
        Ok(records)
    }
}

impl RecordSource for RecordClient {
    async fn fetch(&self, url: &str) -> Result<Vec<Record>, RecoError> {
        self.fetch_records(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ClientConfig;
    use crate::remote::test_server::serve_bodies;

    #[tokio::test]
    async fn test_fetch_records_from_server() {
        let url = serve_bodies(vec![r#"{"results": [{"id": 1}, {"id": 2}]}"#]);
        let client = RecordClient::new(ClientConfig::default()).unwrap();
        let records = client.fetch_records(&url).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(client.call_history()[0].success);
    }

    #[tokio::test]
    async fn test_html_body_is_not_a_network_error() {
        let url = serve_bodies(vec!["<html>oops</html>"]);
        let client = RecordClient::new(ClientConfig::default()).unwrap();
        let err = client.fetch_records(&url).await.unwrap_err();
        assert!(matches!(err, RecoError::Json(_)));
        assert!(!err.is_network());
    }
}
