use serde::{Deserialize, Serialize};

use super::Movie;

/// A zero-based (page index, page size) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Resolves a raw request against the configured bounds.
    ///
    /// A missing or zero size falls back to `default_size`; anything larger
    /// than `max_size` is clamped.
    pub fn bounded(page: Option<u32>, size: Option<u32>, default_size: u32, max_size: u32) -> Self {
        let size = match size {
            None | Some(0) => default_size,
            Some(size) => size,
        };
        Self {
            page: page.unwrap_or(0),
            size: size.clamp(1, max_size.max(1)),
        }
    }

    /// Index of the first element on this page
    pub fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }
}

/// One page of ranked suggestions plus its paging metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionPage {
    pub content: Vec<Movie>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl SuggestionPage {
    /// Slices `ranked` down to the requested page
    pub fn from_ranked(ranked: Vec<Movie>, request: PageRequest) -> Self {
        let total_elements = ranked.len() as u64;
        let content = ranked
            .into_iter()
            .skip(request.offset())
            .take(request.size as usize)
            .collect();

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size as u64)
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64) + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}
