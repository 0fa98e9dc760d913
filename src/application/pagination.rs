//! Page-number pagination translated into index result windows.

use serde::Serialize;
use thiserror::Error;

/// Largest `from + size` the search index will serve without a scroll context.
pub const MAX_RESULT_WINDOW: u64 = 10_000;

pub const DEFAULT_PAGE_NUMBER: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page number must be at least 1, got {0}")]
    PageNumber(u32),
    #[error("page size must be at least 1, got {0}")]
    PageSize(u32),
    #[error("page {number} of size {size} lies beyond the {max} result window")]
    WindowTooLarge { number: u32, size: u32, max: u64 },
}

/// A validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
    size: u32,
}

/// Half-open slice `[from, from + size)` of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ResultWindow {
    pub from: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(number: u32, size: u32) -> Result<Self, PaginationError> {
        if number < 1 {
            return Err(PaginationError::PageNumber(number));
        }
        if size < 1 {
            return Err(PaginationError::PageSize(size));
        }

        let end = u64::from(number) * u64::from(size);
        if end > MAX_RESULT_WINDOW {
            return Err(PaginationError::WindowTooLarge {
                number,
                size,
                max: MAX_RESULT_WINDOW,
            });
        }

        Ok(Self { number, size })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn window(&self) -> ResultWindow {
        let size = u64::from(self.size);
        ResultWindow {
            from: u64::from(self.number - 1) * size,
            size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: DEFAULT_PAGE_NUMBER,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ResultWindow {
    /// Window starting at zero; used for bounded full listings.
    pub fn first(size: u64) -> Self {
        Self { from: 0, size }
    }

    pub fn end(&self) -> u64 {
        self.from + self.size
    }
}
