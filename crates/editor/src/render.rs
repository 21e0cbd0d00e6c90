//! Render and load generations
//!
//! A page re-render (zoom change) or a new document load supersedes any
//! request still in flight. Each request gets a ticket; only the newest,
//! uncancelled ticket may commit its result.

use crate::model::PageDimensions;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use tracing::debug;

/// Cancellation token for cooperative cancellation
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel this token and all of its clones (idempotent)
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Handle for one render attempt
#[derive(Debug, Clone)]
pub struct RenderTicket {
    generation: u64,
    /// Render scale requested for this attempt
    pub scale: f64,
    token: CancellationToken,
}

impl RenderTicket {
    /// Token for the renderer to poll
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Per-page render slot
#[derive(Debug, Default)]
pub struct RenderSlot {
    page_index: usize,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl RenderSlot {
    pub fn new(page_index: usize) -> Self {
        Self {
            page_index,
            ..Self::default()
        }
    }

    /// Start a render at `scale`, cancelling the previous one if still running
    pub fn begin(&mut self, scale: f64) -> RenderTicket {
        if let Some(previous) = self.in_flight.take() {
            debug!(page = self.page_index, "cancelling superseded render");
            previous.cancel();
        }
        self.generation += 1;
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        RenderTicket {
            generation: self.generation,
            scale,
            token,
        }
    }

    /// Accept a finished render
    ///
    /// Returns the dimensions to record only if `ticket` is the newest
    /// request and was not cancelled; stale completions yield `None`.
    pub fn commit(&mut self, ticket: &RenderTicket, width: f64, height: f64) -> Option<PageDimensions> {
        if ticket.generation != self.generation || ticket.token.is_cancelled() {
            debug!(
                page = self.page_index,
                generation = ticket.generation,
                current = self.generation,
                "discarding stale render"
            );
            return None;
        }
        self.in_flight = None;
        Some(PageDimensions {
            width,
            height,
            scale: ticket.scale,
        })
    }

    /// Cancel whatever is in flight
    pub fn cancel(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

/// Generation counter for document loads
///
/// Shared between the loader and whoever applies results.
#[derive(Debug, Clone, Default)]
pub struct LoadGeneration {
    current: Arc<AtomicU64>,
}

impl LoadGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, invalidating all earlier ones
    pub fn begin(&self) -> u64 {
        self.current.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Whether a load started at `generation` is still the newest
    pub fn is_current(&self, generation: u64) -> bool {
        self.current.load(Ordering::Acquire) == generation
    }
}
