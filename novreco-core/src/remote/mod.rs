pub mod api;
pub mod client;
pub mod models;
#[cfg(test)]
pub(crate) mod test_server;

pub use client::{ApiCall, ApiCallType, CallHistory, ClientConfig, RecordClient};
pub use models::parse_records;

use crate::error::RecoError;
use crate::record::Record;
use std::future::Future;

/// Anything that can produce the records behind a list URL.
pub trait RecordSource: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<Record>, RecoError>> + Send;
}
