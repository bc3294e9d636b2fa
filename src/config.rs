use clap::ValueEnum;

use crate::error::{DbError, Result};
use crate::{ROWS_PER_PAGE, TABLE_MAX_PAGES};

/// Largest accepted `max_pages`: 4 GiB of pages.
pub const MAX_PAGES_LIMIT: usize = 1 << 20;

/// How a row write reaches the backing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SyncMode {
    /// Seek to the row's offset and overwrite `ROW_SIZE` bytes in place.
    /// Not crash-safe: a torn write can leave a half-written row.
    #[default]
    InPlace,
    /// Rewrite the whole file through a temp file and an atomic rename.
    Atomic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerConfig {
    pub max_pages: usize,
    pub sync_mode: SyncMode,
}

impl PagerConfig {
    pub fn max_rows(&self) -> usize {
        self.max_pages.saturating_mul(ROWS_PER_PAGE)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 || self.max_pages > MAX_PAGES_LIMIT {
            return Err(DbError::InvalidConfig {
                max_pages: self.max_pages,
                limit: MAX_PAGES_LIMIT,
            });
        }
        Ok(())
    }
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            max_pages: TABLE_MAX_PAGES,
            sync_mode: SyncMode::InPlace,
        }
    }
}
