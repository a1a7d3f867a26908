//! Background resolution of raw query text through the parse service.
//!
//! Requests run on worker threads; results come back over a channel and are
//! merged by whoever owns the store, on its own thread.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

use crate::model::{DraftId, QueryConfig, Template, selected_template_values};
use crate::remote::{ParseService, RawQuery};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("parse service failed: {0:#}")]
    Service(anyhow::Error),

    #[error("parse service returned no result for {id}")]
    MissingResult { id: String },
}

/// Outcome of one submitted raw text, tagged with the draft revision it was
/// issued against.
#[derive(Debug)]
pub struct Resolution {
    pub draft: DraftId,
    pub revision: u64,
    pub result: Result<QueryConfig, ResolveError>,
}

pub struct RawTextResolver {
    service: Arc<dyn ParseService>,
    tx: Sender<Resolution>,
    rx: Receiver<Resolution>,
    in_flight: usize,
}

impl RawTextResolver {
    pub fn new(service: Arc<dyn ParseService>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Send `text` for `draft` to `endpoint` without blocking the caller.
    pub fn submit(
        &mut self,
        endpoint: &str,
        draft: DraftId,
        revision: u64,
        text: String,
        templates: &[Template],
    ) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let endpoint = endpoint.to_string();
        let templates = selected_template_values(templates);
        self.in_flight += 1;

        tracing::debug!(draft = %draft, revision, endpoint = %endpoint, "submitting raw text");
        std::thread::spawn(move || {
            let result = resolve_one(service.as_ref(), &endpoint, &draft, text, &templates);
            // The receiver is gone once the editor closes; nothing to deliver.
            let _ = tx.send(Resolution {
                draft,
                revision,
                result,
            });
        });
    }

    /// Every resolution that has completed so far.
    pub fn drain(&mut self) -> Vec<Resolution> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(r) => out.push(r),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        self.in_flight = self.in_flight.saturating_sub(out.len());
        out
    }

    /// Block until the next resolution arrives or `timeout` passes.
    pub fn wait(&mut self, timeout: Duration) -> Option<Resolution> {
        match self.rx.recv_timeout(timeout) {
            Ok(r) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(r)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

fn resolve_one(
    service: &dyn ParseService,
    endpoint: &str,
    draft: &DraftId,
    text: String,
    templates: &[Template],
) -> Result<QueryConfig, ResolveError> {
    let request = [RawQuery {
        query: text,
        id: draft.as_str().to_string(),
    }];
    let parsed = service
        .parse(endpoint, &request, templates)
        .map_err(ResolveError::Service)?;
    parsed
        .into_iter()
        .find(|p| p.id == draft.as_str())
        .map(|p| p.query_config)
        .ok_or_else(|| ResolveError::MissingResult {
            id: draft.as_str().to_string(),
        })
}
