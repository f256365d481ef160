use serde::{Deserialize, Serialize};

/// Page bookkeeping over an already-filtered result list.
///
/// The cursor never owns the results; callers hand the same list back on every
/// `next_page` call until the criteria change, at which point they `reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationCursor {
    page_size: usize,
    current_page: usize,
    has_more: bool,
}

impl PaginationCursor {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 0,
            has_more: true,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages delivered so far.
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn reset(&mut self) {
        self.current_page = 0;
        self.has_more = true;
    }

    pub fn next_page<'a, T>(&mut self, results: &'a [T]) -> &'a [T] {
        let start = self.current_page.saturating_mul(self.page_size);
        if start >= results.len() {
            self.has_more = false;
            return &[];
        }

        let end = (start + self.page_size).min(results.len());
        self.has_more = end < results.len();
        self.current_page += 1;
        &results[start..end]
    }
}
