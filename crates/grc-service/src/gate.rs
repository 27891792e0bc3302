//! Request sequencing for list views.
//!
//! A list view fires a new search on every filter change. Responses can
//! arrive out of order, so each request is numbered and only the latest one
//! may deliver a result: starting a request cancels the one before it, and a
//! response whose number is no longer the latest is discarded.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use grc_core::error::AppError;
use grc_core::result::AppResult;
use grc_core::types::{Page, SearchRequest};
use grc_entity::entity::Entity;

use crate::repository::EntityRepository;

/// Lets only the most recent of overlapping requests complete.
#[derive(Debug)]
pub struct LatestRequestGate {
    sequence: AtomicU64,
    current: Mutex<Option<CancellationToken>>,
    timeout: Duration,
}

impl LatestRequestGate {
    /// Create a gate that bounds each request by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            sequence: AtomicU64::new(0),
            current: Mutex::new(None),
            timeout,
        }
    }

    /// Sequence number of the most recently started request.
    pub fn latest(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Cancel the in-flight request, if any.
    pub fn cancel(&self) {
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = previous {
            token.cancel();
        }
    }

    /// Run `request` as the newest request.
    ///
    /// Fails with `Cancelled` when a newer request starts before this one
    /// delivers, and with `Timeout` when it exceeds the bound.
    pub async fn run<T, F>(&self, request: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.run_then(request, |_| {}).await
    }

    /// Like [`run`](Self::run), handing a successful result to `deliver`
    /// before returning. `deliver` runs while no newer request can start, so
    /// a result it stores is never older than one stored before it.
    pub async fn run_then<T, F, D>(&self, request: F, deliver: D) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
        D: FnOnce(&T),
    {
        let (ticket, token) = self.begin();

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(AppError::cancelled(format!(
                "request {ticket} was superseded by a newer request"
            ))),
            result = tokio::time::timeout(self.timeout, request) => match result {
                Ok(result) => result,
                Err(_) => Err(AppError::timeout(format!(
                    "request {ticket} exceeded {} ms",
                    self.timeout.as_millis()
                ))),
            },
        };

        self.finish(ticket, outcome, deliver)
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let (ticket, previous) = {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
            let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            (ticket, current.replace(token.clone()))
        };
        if let Some(previous) = previous {
            debug!(ticket, "Cancelling superseded request");
            previous.cancel();
        }
        (ticket, token)
    }

    fn finish<T>(
        &self,
        ticket: u64,
        outcome: AppResult<T>,
        deliver: impl FnOnce(&T),
    ) -> AppResult<T> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let latest = self.latest();
        if latest != ticket {
            debug!(ticket, latest, "Discarding stale response");
            return Err(AppError::cancelled(format!(
                "response to request {ticket} arrived after a newer request"
            )));
        }
        if let Ok(value) = &outcome {
            deliver(value);
        }
        current.take();
        outcome
    }
}

/// Decrements the in-flight counter however the request ends.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// View state of one entity list: the page on screen, a loading flag and
/// the gates that keep stale responses off the screen.
#[derive(Debug)]
pub struct SearchSession<E: Entity> {
    repository: EntityRepository<E>,
    list_gate: LatestRequestGate,
    detail_gate: LatestRequestGate,
    in_flight: AtomicUsize,
    current: Mutex<Option<Page<E>>>,
}

impl<E: Entity> SearchSession<E> {
    /// Create a session over a repository, bounded by its timeout.
    pub fn new(repository: EntityRepository<E>) -> Self {
        let timeout = repository.timeout();
        Self {
            repository,
            list_gate: LatestRequestGate::new(timeout),
            detail_gate: LatestRequestGate::new(timeout),
            in_flight: AtomicUsize::new(0),
            current: Mutex::new(None),
        }
    }

    /// Whether any request of this session is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// The page most recently delivered by a non-stale search.
    pub fn current_page(&self) -> Option<Page<E>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Search, superseding any search still in flight. On success the page
    /// becomes the current page.
    pub async fn search(&self, request: SearchRequest) -> AppResult<Page<E>> {
        let _loading = InFlight::enter(&self.in_flight);
        self.list_gate
            .run_then(self.repository.list(&request), |page| {
                *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(page.clone());
            })
            .await
    }

    /// Load one record, superseding any detail load still in flight.
    pub async fn open(&self, id: Uuid) -> AppResult<E> {
        let _loading = InFlight::enter(&self.in_flight);
        self.detail_gate.run(self.repository.get_by_id(id)).await
    }

    /// Cancel every outstanding request of this session.
    pub fn cancel(&self) {
        self.list_gate.cancel();
        self.detail_gate.cancel();
    }
}
