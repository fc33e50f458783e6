//! # Page Buffer
//!
//! Turns a lazy, possibly slow item stream into random-access pages.
//!
//! ```text
//! source ──next()──▶ cache [I0 I1 I2 I3 I4 ...]   has_more
//!                          └─page 1─┘ ▲
//!                                     └─ one item past the window is always
//!                                        fetched, so `is_last_page` is exact
//! ```
//!
//! The cache only grows, and once the source reports exhaustion (or fails)
//! `has_more` stays false. Fetches are sequential: callers must not request
//! two pages from the same buffer at once, which `&mut self` enforces.

use futures::StreamExt;
use futures::stream::BoxStream;
use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use crate::core::error::{BoxError, MenuError, Result};

/// A lazy sequence of items. Each element is produced on demand.
pub type Source<T> = BoxStream<'static, std::result::Result<T, BoxError>>;

/// An immutable view of at most `page_size` items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    is_first_page: bool,
    is_last_page: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, is_first_page: bool, is_last_page: bool) -> Self {
        Self {
            items,
            is_first_page,
            is_last_page,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_first_page(&self) -> bool {
        self.is_first_page
    }

    pub fn is_last_page(&self) -> bool {
        self.is_last_page
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

pub struct PageBuffer<T> {
    /// `None` once released.
    source: Option<Source<T>>,
    cache: Vec<T>,
    has_more: bool,
}

impl<T: Clone> PageBuffer<T> {
    pub fn new(source: Source<T>) -> Self {
        Self {
            source: Some(source),
            cache: Vec::new(),
            has_more: true,
        }
    }

    /// Number of items pulled from the source so far.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Returns page `page_number` of size `page_size`, pulling from the source
    /// only as far as `start + page_size` (inclusive).
    ///
    /// Fails with `Cancelled` if `cancel` fires while the source is being read;
    /// items pulled before that stay cached. A source failure marks the buffer
    /// exhausted and is returned as `MenuError::Source`.
    pub async fn get_page(
        &mut self,
        page_number: usize,
        page_size: usize,
        cancel: &CancellationToken,
    ) -> Result<Page<T>> {
        if page_size == 0 {
            return Err(MenuError::InvalidArgument(
                "page size must be greater than zero".to_string(),
            ));
        }
        let start = page_number.checked_mul(page_size).ok_or_else(|| {
            MenuError::InvalidArgument(format!("page number {page_number} is out of range"))
        })?;
        let end = start.checked_add(page_size).ok_or_else(|| {
            MenuError::InvalidArgument(format!("page number {page_number} is out of range"))
        })?;

        while self.cache.len() <= end && self.has_more {
            if cancel.is_cancelled() {
                return Err(MenuError::Cancelled);
            }

            let Some(source) = self.source.as_mut() else {
                self.has_more = false;
                break;
            };

            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(MenuError::Cancelled),
                next = source.next() => next,
            };

            match next {
                Some(Ok(item)) => self.cache.push(item),
                Some(Err(e)) => {
                    warn!(
                        "Item source failed after {} items, treating it as exhausted: {}",
                        self.cache.len(),
                        e
                    );
                    self.has_more = false;
                    return Err(MenuError::Source(e));
                }
                None => {
                    debug!("Item source exhausted after {} items", self.cache.len());
                    self.has_more = false;
                }
            }
        }

        let available_end = end.min(self.cache.len());
        let items = if start < available_end {
            self.cache[start..available_end].to_vec()
        } else {
            Vec::new()
        };

        Ok(Page::new(items, page_number == 0, end >= self.cache.len()))
    }
}

impl<T> PageBuffer<T> {
    /// Frees the underlying source. Later calls are no-ops, and pages already
    /// cached remain readable.
    pub fn release(&mut self) {
        if self.source.take().is_some() {
            debug!("Released item source ({} items cached)", self.cache.len());
        }
    }
}

impl<T> Drop for PageBuffer<T> {
    fn drop(&mut self) {
        self.release();
    }
}
