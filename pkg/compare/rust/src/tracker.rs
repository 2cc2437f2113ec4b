// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! In-flight request tracking.
//!
//! Only one comparison load is live at a time. Starting a new one marks the
//! previous one as cancelling and aborts its pending fetches.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{Error, Result};

/// Handle for one tracked request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    pub id: u64,
    token: CancellationToken,
}

impl RequestTicket {
    /// True once a newer request has superseded this one.
    pub fn is_cancelling(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` to completion unless the ticket is cancelled first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    next_id: AtomicU64,
    current: Mutex<Option<RequestTicket>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a new request, cancelling the one in flight.
    pub fn begin(&self) -> RequestTicket {
        let ticket = RequestTicket {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            token: CancellationToken::new(),
        };
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(ticket.clone());
        if let Some(previous) = previous {
            if !previous.token.is_cancelled() {
                debug!(superseded = previous.id, by = ticket.id, "Cancelling in-flight request");
                previous.token.cancel();
            }
        }
        ticket
    }

    /// Stop tracking `ticket` if it is still the current request.
    pub fn finish(&self, ticket: &RequestTicket) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().is_some_and(|t| t.id == ticket.id) {
            *current = None;
        }
    }
}
