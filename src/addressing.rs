//! Row and page address arithmetic. Pure functions, no I/O.

use std::ops::Range;

use crate::error::{DbError, Result};
use crate::{PAGE_SIZE, ROW_SIZE, ROWS_PER_PAGE};

/// Maps a row number to `(page_index, byte_offset)` inside that page.
pub fn row_location(row_number: usize, max_pages: usize) -> Result<(usize, usize)> {
    let page_index = row_number / ROWS_PER_PAGE;
    if page_index >= max_pages {
        return Err(DbError::RowOutOfBounds {
            row: row_number,
            max: max_pages.saturating_mul(ROWS_PER_PAGE),
        });
    }
    Ok((page_index, ROW_SIZE * (row_number % ROWS_PER_PAGE)))
}

/// Absolute file offset of a row.
pub fn file_offset(page_index: usize, byte_offset: usize) -> u64 {
    (page_index * PAGE_SIZE + byte_offset) as u64
}

/// Byte ranges of the populated row slots of a 1-based `page_number`,
/// given the table's current row count.
///
/// Valid page numbers are `1..=max_pages`; page `max_pages` maps to the last
/// page index, so a full table keeps its final rows readable.
pub fn rows_in_page(
    page_number: usize,
    total_rows: usize,
    max_pages: usize,
) -> Result<Vec<Range<usize>>> {
    if page_number == 0 || page_number > max_pages {
        return Err(DbError::PageOutOfBounds {
            page: page_number,
            max: max_pages,
        });
    }
    if total_rows == 0 {
        return Err(DbError::TableEmpty);
    }

    let first_row = (page_number - 1) * ROWS_PER_PAGE;
    if first_row >= total_rows {
        return Err(DbError::PageNotFound {
            page: page_number - 1,
            available: pages_for_rows(total_rows),
        });
    }

    let count = (total_rows - first_row).min(ROWS_PER_PAGE);
    Ok((0..count)
        .map(|slot| slot * ROW_SIZE..(slot + 1) * ROW_SIZE)
        .collect())
}

/// Number of pages touched by `num_rows` rows.
pub fn pages_for_rows(num_rows: usize) -> usize {
    num_rows.div_ceil(ROWS_PER_PAGE)
}

/// Number of pages present in a file of `file_len` bytes, counting a
/// trailing partial page.
pub fn pages_in_file(file_len: u64) -> usize {
    (file_len as usize).div_ceil(PAGE_SIZE)
}

/// Recovers the row count from the length of a data file. Rows are only
/// ever appended, so every full page holds `ROWS_PER_PAGE` rows and the tail
/// page holds as many whole rows as fit in its length.
pub fn rows_in_file(file_len: u64) -> usize {
    let len = file_len as usize;
    let full_pages = len / PAGE_SIZE;
    let tail_rows = ((len % PAGE_SIZE) / ROW_SIZE).min(ROWS_PER_PAGE);
    full_pages * ROWS_PER_PAGE + tail_rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TABLE_MAX_PAGES, TABLE_MAX_ROWS};

    #[test]
    fn locates_rows() {
        assert_eq!(row_location(0, TABLE_MAX_PAGES).unwrap(), (0, 0));
        assert_eq!(row_location(1, TABLE_MAX_PAGES).unwrap(), (0, ROW_SIZE));
        assert_eq!(
            row_location(ROWS_PER_PAGE, TABLE_MAX_PAGES).unwrap(),
            (1, 0)
        );
        assert_eq!(
            row_location(ROWS_PER_PAGE * 3 + 5, TABLE_MAX_PAGES).unwrap(),
            (3, 5 * ROW_SIZE)
        );
        assert_eq!(
            row_location(TABLE_MAX_ROWS - 1, TABLE_MAX_PAGES).unwrap(),
            (TABLE_MAX_PAGES - 1, (ROWS_PER_PAGE - 1) * ROW_SIZE)
        );
    }

    #[test]
    fn row_location_fails_past_last_page() {
        assert!(matches!(
            row_location(TABLE_MAX_ROWS, TABLE_MAX_PAGES),
            Err(DbError::RowOutOfBounds { .. })
        ));
        assert!(row_location(usize::MAX / 2, TABLE_MAX_PAGES).is_err());
    }

    #[test]
    fn full_page_yields_every_slot() {
        let ranges = rows_in_page(1, ROWS_PER_PAGE, TABLE_MAX_PAGES).unwrap();
        assert_eq!(ranges.len(), ROWS_PER_PAGE);
        assert_eq!(ranges[0], 0..ROW_SIZE);
        assert_eq!(
            ranges[ROWS_PER_PAGE - 1],
            (ROWS_PER_PAGE - 1) * ROW_SIZE..ROWS_PER_PAGE * ROW_SIZE
        );
    }

    #[test]
    fn tail_page_is_bounded_by_row_count() {
        let total = ROWS_PER_PAGE + ROWS_PER_PAGE / 2;
        assert_eq!(
            rows_in_page(1, total, TABLE_MAX_PAGES).unwrap().len(),
            ROWS_PER_PAGE
        );
        assert_eq!(
            rows_in_page(2, total, TABLE_MAX_PAGES).unwrap().len(),
            ROWS_PER_PAGE / 2
        );
    }

    #[test]
    fn last_page_of_full_table_is_readable() {
        let ranges = rows_in_page(TABLE_MAX_PAGES, TABLE_MAX_ROWS, TABLE_MAX_PAGES).unwrap();
        assert_eq!(ranges.len(), ROWS_PER_PAGE);

        let partial = rows_in_page(TABLE_MAX_PAGES, TABLE_MAX_ROWS - 4, TABLE_MAX_PAGES).unwrap();
        assert_eq!(partial.len(), ROWS_PER_PAGE - 4);
    }

    #[test]
    fn rows_in_page_rejects_bad_requests() {
        assert!(matches!(
            rows_in_page(0, 10, TABLE_MAX_PAGES),
            Err(DbError::PageOutOfBounds { .. })
        ));
        assert!(matches!(
            rows_in_page(TABLE_MAX_PAGES + 1, 10, TABLE_MAX_PAGES),
            Err(DbError::PageOutOfBounds { .. })
        ));
        assert!(matches!(
            rows_in_page(1, 0, TABLE_MAX_PAGES),
            Err(DbError::TableEmpty)
        ));
        assert!(matches!(
            rows_in_page(30, 10, TABLE_MAX_PAGES),
            Err(DbError::PageNotFound { page: 29, available: 1 })
        ));
    }

    #[test]
    fn recovers_row_count_from_file_length() {
        assert_eq!(rows_in_file(0), 0);
        assert_eq!(rows_in_file(ROW_SIZE as u64), 1);
        assert_eq!(rows_in_file(ROW_SIZE as u64 - 1), 0);
        assert_eq!(rows_in_file((ROWS_PER_PAGE * ROW_SIZE) as u64), ROWS_PER_PAGE);
        assert_eq!(
            rows_in_file((PAGE_SIZE + 2 * ROW_SIZE) as u64),
            ROWS_PER_PAGE + 2
        );
        assert_eq!(pages_in_file(0), 0);
        assert_eq!(pages_in_file(1), 1);
        assert_eq!(pages_in_file(PAGE_SIZE as u64), 1);
        assert_eq!(pages_in_file(PAGE_SIZE as u64 + 1), 2);
    }
}
