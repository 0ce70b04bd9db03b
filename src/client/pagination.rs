//! Numbered-page walking for RingCentral listing endpoints.
//!
//! Listing endpoints take `page` (1-based) and `perPage` query parameters and
//! answer with a [`PageEnvelope`]. Whether another page follows is decided by
//! a [`TerminationPolicy`], chosen per endpoint in configuration.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::models::PageEnvelope;
use super::RingCentralClient;
use crate::error::ApiError;

/// Largest page the API serves; also the default.
pub const MAX_PAGE_SIZE: u32 = 100;

/// The `(page, perPage)` pair sent to a listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u32,
    per_page: u32,
}

impl PageWindow {
    /// Build a window, normalising out-of-range values.
    ///
    /// Page 0 means the first page. A page size of 0 or above
    /// [`MAX_PAGE_SIZE`] means [`MAX_PAGE_SIZE`].
    pub fn new(page: u32, per_page: u32) -> Self {
        let page = if page == 0 { 1 } else { page };
        let per_page = if per_page == 0 || per_page > MAX_PAGE_SIZE {
            MAX_PAGE_SIZE
        } else {
            per_page
        };
        Self { page, per_page }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    fn query(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("perPage", self.per_page.to_string()),
        ]
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(1, MAX_PAGE_SIZE)
    }
}

/// Rule deciding whether a listing has more pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationPolicy {
    /// Continue while `paging.page < paging.totalPages`.
    #[default]
    Counter,
    /// Continue while the page's own `uri` differs from `navigation.lastPage.uri`.
    LastPageUri,
}

impl TerminationPolicy {
    /// Page number to request next, or `None` when the listing is exhausted.
    ///
    /// The returned page is always greater than the requested one, and an
    /// empty page never continues. A walk at `u32::MAX` cannot advance and
    /// ends there.
    pub fn next_page<T>(&self, window: &PageWindow, envelope: &PageEnvelope<T>) -> Option<u32> {
        if envelope.records.is_empty() {
            return None;
        }

        let current = envelope
            .paging
            .page
            .map_or(window.page(), |reported| reported.max(window.page()));

        let more = match self {
            Self::Counter => envelope
                .paging
                .total_pages
                .is_some_and(|total| current < total),
            Self::LastPageUri => {
                match (
                    envelope.uri.as_deref(),
                    envelope.navigation.last_page.as_ref(),
                ) {
                    (Some(uri), Some(last)) => !last.uri.is_empty() && uri != last.uri,
                    _ => false,
                }
            }
        };

        if more {
            current.checked_add(1)
        } else {
            None
        }
    }
}

/// One decoded page plus the continuation signal.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub next_page: Option<u32>,
}

/// Walks a numbered-page listing endpoint one page per call.
///
/// The walk is lazy: nothing is fetched until [`next_page`](Self::next_page)
/// is awaited, and it can be restarted at any page with
/// [`starting_at`](Self::starting_at).
pub struct PaginatedFetcher<'a, T> {
    client: &'a RingCentralClient,
    path: &'static str,
    policy: TerminationPolicy,
    per_page: u32,
    next: Option<u32>,
    _records: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> PaginatedFetcher<'a, T> {
    pub fn new(
        client: &'a RingCentralClient,
        path: &'static str,
        policy: TerminationPolicy,
        per_page: u32,
    ) -> Self {
        Self {
            client,
            path,
            policy,
            per_page,
            next: Some(1),
            _records: PhantomData,
        }
    }

    /// Resume the walk at `page`.
    pub fn starting_at(mut self, page: u32) -> Self {
        self.next = Some(PageWindow::new(page, self.per_page).page());
        self
    }

    /// Fetch exactly one page.
    pub async fn fetch(&self, window: PageWindow) -> Result<Page<T>, ApiError> {
        let mut url = self.client.endpoint(self.path)?;
        url.query_pairs_mut().extend_pairs(window.query());

        let envelope: PageEnvelope<T> = self.client.get_json(url).await?;
        let next_page = self.policy.next_page(&window, &envelope);

        debug!(
            "Fetched {} page {} ({} records, next: {:?})",
            self.path,
            window.page(),
            envelope.records.len(),
            next_page
        );

        Ok(Page {
            records: envelope.records,
            next_page,
        })
    }

    /// Fetch the next page of the walk, or `None` once it is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<T>>, ApiError> {
        let Some(page) = self.next else {
            return Ok(None);
        };

        let result = self.fetch(PageWindow::new(page, self.per_page)).await?;
        self.next = result.next_page;
        Ok(Some(result.records))
    }

    /// Page number the next call will request.
    pub fn pending_page(&self) -> Option<u32> {
        self.next
    }
}
