//! In-memory gateways for tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::launch::{LaunchAck, LaunchGateway};
use super::listing::{ListingPage, ObjectListing};
use crate::dispatch::LaunchRequest;
use crate::error::{MigrationError, Result};

/// Records every submitted request; rejects submissions at the given positions
#[derive(Default)]
pub struct RecordingLauncher {
    submitted: Mutex<Vec<LaunchRequest>>,
    fail_at: HashSet<usize>,
    calls: AtomicUsize,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the submissions with these call positions (0-based, in call order)
    pub fn failing_at(positions: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fail_at: positions.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests that were accepted, in call order
    pub fn accepted(&self) -> Vec<LaunchRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl LaunchGateway for RecordingLauncher {
    async fn submit(&self, request: &LaunchRequest) -> Result<LaunchAck> {
        let position = self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if self.fail_at.contains(&position) {
            return Err(MigrationError::gateway(
                "ecs:RunTask",
                format!("simulated rejection of call {position}"),
            ));
        }

        self.submitted.lock().unwrap().push(request.clone());
        Ok(LaunchAck {
            task_arns: vec![format!("arn:aws:ecs:test:task/{position}")],
        })
    }
}

/// Serves a fixed sequence of pages; a cursor selects the page after the one that issued it
pub struct PagedListing {
    pages: Vec<ListingPage>,
    requests: Mutex<Vec<Option<String>>>,
}

impl PagedListing {
    pub fn new(pages: Vec<ListingPage>) -> Self {
        Self {
            pages,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Split `keys` into pages of `page_size` keys each
    pub fn paginate(keys: &[&str], page_size: usize) -> Self {
        let chunks: Vec<&[&str]> = keys.chunks(page_size.max(1)).collect();
        let last = chunks.len().saturating_sub(1);
        let pages = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| ListingPage {
                keys: chunk.iter().map(|k| k.to_string()).collect(),
                next_cursor: (i < last).then(|| (i + 1).to_string()),
                truncated: i < last,
            })
            .collect();
        Self::new(pages)
    }

    /// Cursors received so far, in request order
    pub fn cursors(&self) -> Vec<Option<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectListing for PagedListing {
    async fn list_page(
        &self,
        _bucket: &str,
        _prefix: &str,
        cursor: Option<&str>,
    ) -> Result<ListingPage> {
        self.requests.lock().unwrap().push(cursor.map(String::from));

        let index = match cursor {
            None => 0,
            Some(c) => self
                .pages
                .iter()
                .position(|page| page.next_cursor.as_deref() == Some(c))
                .map(|issuer| issuer + 1)
                .ok_or_else(|| MigrationError::gateway("s3:ListObjectsV2", "unknown cursor"))?,
        };

        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

/// Listing that always fails
pub struct FailingListing;

#[async_trait]
impl ObjectListing for FailingListing {
    async fn list_page(&self, _: &str, _: &str, _: Option<&str>) -> Result<ListingPage> {
        Err(MigrationError::gateway("s3:ListObjectsV2", "access denied"))
    }
}
