//! Pagination Aggregator
//!
//! Drives a paged endpoint one page at a time, appending each tracked
//! category's items to its bucket until every tracked category is exhausted
//! (per the totals reported by the first page) or has reached the limit.
//!
//! The result is all-or-nothing: a failed page aborts the aggregation and no
//! partial buckets are returned.

use crate::normalize::RawRejection;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::future::Future;
use tracing::{debug, warn};

/// Longest display text kept before trimming.
pub const MAX_DISPLAY_CHARS: usize = 80;
const ELLIPSIS: &str = "...";

/// Position in a paged query. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
}

impl PageCursor {
    pub fn first() -> Self {
        Self { page: 1 }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    fn next(self) -> Self {
        Self {
            page: self.page + 1,
        }
    }
}

/// One fetched page: items per category plus the service's declared totals.
#[derive(Debug, Clone)]
pub struct Page<C, T> {
    pub items: BTreeMap<C, Vec<T>>,
    pub totals: BTreeMap<C, usize>,
}

/// Append-only accumulator for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultBucket<T> {
    items: Vec<T>,
}

impl<T> Default for ResultBucket<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ResultBucket<T> {
    fn extend(&mut self, items: Vec<T>) {
        self.items.extend(items);
    }

    fn truncate(&mut self, limit: usize) {
        self.items.truncate(limit);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Finalized result of an aggregation.
#[derive(Debug, Clone)]
pub struct Aggregation<C, T> {
    pub buckets: BTreeMap<C, ResultBucket<T>>,
    /// Totals as reported by the first page.
    pub totals: BTreeMap<C, usize>,
    pub pages_fetched: u32,
}

impl<C: Ord, T> Aggregation<C, T> {
    /// Take a category's items, empty when the category was not tracked.
    pub fn take(&mut self, category: &C) -> Vec<T> {
        self.buckets
            .remove(category)
            .map(ResultBucket::into_items)
            .unwrap_or_default()
    }

    pub fn total(&self, category: &C) -> usize {
        self.totals.get(category).copied().unwrap_or(0)
    }
}

pub struct Aggregator<C> {
    tracked: Vec<C>,
    limit: Option<usize>,
}

impl<C> Aggregator<C>
where
    C: Ord + Copy + Debug,
{
    /// Track the given categories; an empty list fetches the first page only.
    pub fn new(tracked: impl IntoIterator<Item = C>) -> Self {
        Self {
            tracked: tracked.into_iter().collect(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub async fn aggregate<T, F, Fut>(&self, mut fetch: F) -> Result<Aggregation<C, T>, RawRejection>
    where
        F: FnMut(PageCursor) -> Fut,
        Fut: Future<Output = Result<Page<C, T>, RawRejection>>,
    {
        let mut buckets: BTreeMap<C, ResultBucket<T>> = self
            .tracked
            .iter()
            .map(|c| (*c, ResultBucket::default()))
            .collect();
        let mut totals: Option<BTreeMap<C, usize>> = None;
        let mut cursor = PageCursor::first();
        let mut pages_fetched = 0;

        loop {
            let page = fetch(cursor).await.map_err(|source| RawRejection::Page {
                page: cursor.page(),
                source: Box::new(source),
            })?;
            pages_fetched += 1;

            let Page { mut items, totals: page_totals } = page;
            let totals = totals.get_or_insert(page_totals);

            let mut progressed = false;
            for category in &self.tracked {
                let fresh = items.remove(category).unwrap_or_default();
                let Some(bucket) = buckets.get_mut(category) else {
                    continue;
                };
                let declared = totals.get(category).copied().unwrap_or(0);
                if !fresh.is_empty() && !self.is_done(bucket.len(), declared) {
                    progressed = true;
                }
                bucket.extend(fresh);
            }

            let remaining: Vec<C> = self
                .tracked
                .iter()
                .filter(|c| {
                    let fetched = buckets.get(*c).map_or(0, ResultBucket::len);
                    !self.is_done(fetched, totals.get(*c).copied().unwrap_or(0))
                })
                .copied()
                .collect();

            debug!(
                page = cursor.page(),
                remaining = ?remaining,
                "Folded page into result buckets"
            );

            if remaining.is_empty() {
                break;
            }
            if !progressed {
                warn!(
                    page = cursor.page(),
                    remaining = ?remaining,
                    "Page added no items for unfinished categories; stopping"
                );
                break;
            }
            cursor = cursor.next();
        }

        if let Some(limit) = self.limit {
            for bucket in buckets.values_mut() {
                bucket.truncate(limit);
            }
        }

        Ok(Aggregation {
            buckets,
            totals: totals.unwrap_or_default(),
            pages_fetched,
        })
    }

    fn is_done(&self, fetched: usize, declared: usize) -> bool {
        fetched >= declared || self.limit.is_some_and(|limit| fetched >= limit)
    }
}

/// Cut display text to [`MAX_DISPLAY_CHARS`] plus an ellipsis. Absent text
/// stays absent.
pub fn trim_display_text(text: Option<&str>) -> Option<String> {
    let text = text?;
    if text.chars().count() <= MAX_DISPLAY_CHARS {
        return Some(text.to_string());
    }
    let mut trimmed: String = text.chars().take(MAX_DISPLAY_CHARS).collect();
    trimmed.push_str(ELLIPSIS);
    Some(trimmed)
}
