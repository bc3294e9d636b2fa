//! Write-through page cache over a single data file.
//!
//! Pages become resident on first write or on a read miss and stay resident
//! until [`Pager::flush_pages`]. Every row write goes to disk before
//! [`Pager::set_row`] returns; the file is opened per call and never held
//! across calls.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::addressing::{file_offset, pages_in_file, row_location};
use crate::config::{PagerConfig, SyncMode};
use crate::error::{DbError, Result};
use crate::persist::save_data;
use crate::row::Row;
use crate::{PAGE_SIZE, ROW_SIZE};

#[derive(Debug)]
pub struct Pager {
    path: PathBuf,
    config: PagerConfig,
    // Loaded tail pages may be shorter than PAGE_SIZE until topped up.
    pages: BTreeMap<usize, Vec<u8>>,
}

impl Pager {
    pub fn new(path: impl Into<PathBuf>, config: PagerConfig) -> Self {
        Self {
            path: path.into(),
            config,
            pages: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    /// Length of the backing file, 0 if it does not exist yet.
    pub fn file_len(&self) -> Result<u64> {
        match fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    pub fn is_resident(&self, page_index: usize) -> bool {
        self.pages.contains_key(&page_index)
    }

    pub fn resident_pages(&self) -> impl Iterator<Item = usize> + '_ {
        self.pages.keys().copied()
    }

    /// Returns the resident buffer of `page_index`, loading it from the file
    /// on a miss. The tail page of a file may come back shorter than
    /// `PAGE_SIZE`.
    pub fn get_page(&mut self, page_index: usize) -> Result<&[u8]> {
        if page_index >= self.config.max_pages {
            return Err(DbError::PageOutOfBounds {
                page: page_index,
                max: self.config.max_pages,
            });
        }

        if !self.pages.contains_key(&page_index) {
            self.populate_from_file(page_index)?;
        }

        let available = self.pages.len();
        self.pages
            .get(&page_index)
            .map(Vec::as_slice)
            .ok_or(DbError::PageNotFound {
                page: page_index,
                available,
            })
    }

    /// Loads every absent or short page the file currently holds, as long as
    /// `page_index` is one of them.
    fn populate_from_file(&mut self, page_index: usize) -> Result<()> {
        let mut file = File::open(&self.path)?;
        let file_len = file.metadata()?.len();
        if file_len == 0 {
            return Err(DbError::PageEmpty { page: page_index });
        }

        let available = pages_in_file(file_len).min(self.config.max_pages);
        if page_index >= available {
            return Err(DbError::PageNotFound {
                page: page_index,
                available,
            });
        }

        for index in 0..available {
            let page_start = file_offset(index, 0);
            let on_disk = (file_len - page_start).min(PAGE_SIZE as u64) as usize;
            let cached = self.pages.get(&index).map_or(0, Vec::len);
            if cached >= on_disk {
                continue;
            }

            let missing = on_disk - cached;
            let mut buf = Vec::with_capacity(missing);
            file.seek(SeekFrom::Start(page_start + cached as u64))?;
            (&mut file).take(missing as u64).read_to_end(&mut buf)?;
            if buf.len() != missing {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("page {index}: read {} of {missing} bytes", buf.len()),
                )
                .into());
            }

            debug!(page = index, from = cached, bytes = missing, "loaded page bytes");
            self.pages.entry(index).or_default().extend_from_slice(&buf);
        }

        Ok(())
    }

    /// Stores `row` at `row_number` in the cache and writes it through to the
    /// file before returning.
    pub fn set_row(&mut self, row_number: usize, row: &Row) -> Result<()> {
        let max_rows = self.config.max_rows();
        if row_number >= max_rows {
            return Err(DbError::RowOutOfBounds {
                row: row_number,
                max: max_rows,
            });
        }

        let (page_index, byte_offset) = row_location(row_number, self.config.max_pages)?;
        let bytes = row.to_bytes()?;

        // Rows already on disk must survive in the cached copy of the page.
        if !self.pages.contains_key(&page_index) && page_index < pages_in_file(self.file_len()?) {
            self.populate_from_file(page_index)?;
        }

        let page = self.pages.entry(page_index).or_default();
        if page.len() < PAGE_SIZE {
            page.resize(PAGE_SIZE, 0);
        }
        page[byte_offset..byte_offset + ROW_SIZE].copy_from_slice(&bytes);

        let offset = file_offset(page_index, byte_offset);
        match self.config.sync_mode {
            SyncMode::InPlace => self.write_in_place(offset, &bytes)?,
            SyncMode::Atomic => self.write_atomic(offset, &bytes)?,
        }

        debug!(row = row_number, page = page_index, offset, mode = ?self.config.sync_mode, "wrote row");
        Ok(())
    }

    fn write_in_place(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        write_at(&mut file, offset, bytes)
    }

    fn write_atomic(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        let mut image = match fs::read(&self.path) {
            Ok(image) => image,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        let start = offset as usize;
        let end = start + bytes.len();
        if image.len() < end {
            image.resize(end, 0);
        }
        image[start..end].copy_from_slice(bytes);

        save_data(&self.path, &image)
    }

    /// Drops every resident page so the next read goes back to the file.
    pub fn flush_pages(&mut self) {
        debug!(resident = self.pages.len(), "flushing page cache");
        self.pages.clear();
    }
}

/// One positional write call; a short count is an error, not a retry.
fn write_at<W: Write + Seek>(writer: &mut W, offset: u64, bytes: &[u8]) -> Result<()> {
    writer.seek(SeekFrom::Start(offset))?;

    let written = writer.write(bytes)?;
    if written != bytes.len() {
        return Err(DbError::ShortWrite {
            written,
            expected: bytes.len(),
        });
    }
    Ok(())
}
