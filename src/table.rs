use std::path::PathBuf;

use tracing::{debug, info};

use crate::addressing::{pages_for_rows, rows_in_file, rows_in_page};
use crate::config::PagerConfig;
use crate::error::{DbError, Result};
use crate::pager::Pager;
use crate::row::Row;

/// Append-only collection of rows backed by a [`Pager`].
///
/// `num_rows` is the only authority on which rows are valid; bytes past it
/// in a page are never handed out.
#[derive(Debug)]
pub struct Table {
    num_rows: usize,
    pager: Pager,
}

impl Table {
    /// Wraps a pager over an empty table.
    pub fn new(pager: Pager) -> Self {
        Self { num_rows: 0, pager }
    }

    /// Opens the table stored at `path`, recovering the row count from the
    /// file length.
    pub fn open(path: impl Into<PathBuf>, config: PagerConfig) -> Result<Self> {
        config.validate()?;
        let pager = Pager::new(path, config);
        let file_len = pager.file_len()?;
        let num_rows = rows_in_file(file_len).min(config.max_rows());
        info!(path = %pager.path().display(), file_len, num_rows, "opened table");
        Ok(Self { num_rows, pager })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn max_rows(&self) -> usize {
        self.pager.config().max_rows()
    }

    /// Pages holding at least one valid row.
    pub fn pages_in_use(&self) -> usize {
        pages_for_rows(self.num_rows)
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    pub fn insert(&mut self, row: &Row) -> Result<()> {
        let max_rows = self.max_rows();
        if self.num_rows >= max_rows {
            return Err(DbError::TableFull { max_rows });
        }

        self.pager.set_row(self.num_rows, row)?;
        self.num_rows += 1;
        debug!(id = row.id, num_rows = self.num_rows, "inserted row");
        Ok(())
    }

    /// Raw row slices of the 1-based `page_number`, limited to valid rows.
    /// The last slice is short if the resident page buffer is.
    pub fn select(&mut self, page_number: usize) -> Result<Vec<&[u8]>> {
        let ranges = rows_in_page(page_number, self.num_rows, self.pager.config().max_pages)?;
        let page = self.pager.get_page(page_number - 1)?;

        Ok(ranges
            .into_iter()
            .take_while(|range| range.start < page.len())
            .map(|range| &page[range.start..range.end.min(page.len())])
            .collect())
    }

    pub fn select_rows(&mut self, page_number: usize) -> Result<Vec<Row>> {
        self.select(page_number)?
            .into_iter()
            .map(Row::deserialize)
            .collect()
    }

    /// Every valid row, page by page.
    pub fn select_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(self.num_rows);
        for page_number in 1..=self.pages_in_use() {
            rows.extend(self.select_rows(page_number)?);
        }
        Ok(rows)
    }
}
