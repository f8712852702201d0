//! Applies fetched list data to a controller, newest request wins.
//!
//! Typing a new filter or reopening a screen can start a fetch while an older
//! one is still in flight. Every fetch takes a `LoadTicket`; starting a new one
//! cancels the previous ticket, and only a completion carrying the current
//! ticket reaches `set_data`.

use crate::error::RecoError;
use crate::pagination::ListController;
use crate::record::Record;
use crate::remote::RecordSource;
use log::{debug, warn};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    cancel_token: CancellationToken,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once a newer load has started or the loader was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Resolves when this ticket is superseded.
    pub async fn cancelled(&self) {
        self.cancel_token.cancelled().await
    }

    /// Fetches `url` for this ticket, giving up as soon as the ticket is
    /// superseded. Returns `None` when the fetch was abandoned.
    ///
    /// Only borrows the ticket, so the host can keep calling `begin` and
    /// `cancel` on the loader while the fetch is in flight.
    pub async fn fetch<S: RecordSource>(
        &self,
        source: &S,
        url: &str,
    ) -> Option<Result<Vec<Record>, RecoError>> {
        tokio::select! {
            result = source.fetch(url) => Some(result),
            _ = self.cancelled() => {
                debug!("Abandoning fetch for load #{}", self.generation);
                None
            }
        }
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    /// The records replaced the controller's data.
    Applied(usize),
    /// A newer load had started; the result was dropped.
    Superseded,
    /// The current load failed; the controller was left unchanged.
    Failed(RecoError),
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied(_))
    }
}

#[derive(Debug, Default)]
pub struct ListLoader {
    generation: u64,
    current: Option<CancellationToken>,
}

impl ListLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a load, superseding any earlier ticket.
    pub fn begin(&mut self) -> LoadTicket {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
        self.generation += 1;
        let cancel_token = CancellationToken::new();
        self.current = Some(cancel_token.clone());
        debug!("Starting list load #{}", self.generation);
        LoadTicket {
            generation: self.generation,
            cancel_token,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation && self.current.is_some() && !ticket.is_cancelled()
    }

    /// Cancels whatever load is in flight, e.g. when the view is closed.
    pub fn cancel(&mut self) {
        if let Some(current) = self.current.take() {
            current.cancel();
        }
    }

    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Record>, RecoError>,
        list: &mut ListController,
    ) -> LoadOutcome {
        if !self.is_current(&ticket) {
            debug!(
                "Dropping result of load #{} (current #{})",
                ticket.generation, self.generation
            );
            return LoadOutcome::Superseded;
        }
        self.current = None;

        match result {
            Ok(records) => {
                let count = records.len();
                list.set_data(records);
                LoadOutcome::Applied(count)
            }
            Err(e) => {
                warn!("List load #{} failed: {}", ticket.generation, e);
                LoadOutcome::Failed(e)
            }
        }
    }

    /// Begins a load, fetches `url` from `source` and applies the result.
    ///
    /// For loads that may overlap, use `begin`, `LoadTicket::fetch` and
    /// `complete` instead so a newer load can supersede this one mid-fetch.
    pub async fn load<S: RecordSource>(
        &mut self,
        source: &S,
        url: &str,
        list: &mut ListController,
    ) -> LoadOutcome {
        let ticket = self.begin();
        match ticket.fetch(source, url).await {
            Some(result) => self.complete(ticket, result, list),
            None => LoadOutcome::Superseded,
        }
    }
}
