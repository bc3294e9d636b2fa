use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("row {row} is out of bounds (max {max})")]
    RowOutOfBounds { row: usize, max: usize },

    #[error("page {page} is out of bounds (max {max})")]
    PageOutOfBounds { page: usize, max: usize },

    #[error("table is full ({max_rows} rows)")]
    TableFull { max_rows: usize },

    #[error("buffer of {len} bytes is too small to contain a row of {need} bytes")]
    BufferTooSmall { len: usize, need: usize },

    #[error("{field} is {len} bytes long, max is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row wasn't fully written: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("fetched page {page} is empty")]
    PageEmpty { page: usize },

    #[error("file doesn't contain enough pages for index {page} ({available} available)")]
    PageNotFound { page: usize, available: usize },

    #[error("max pages must be between 1 and {limit}, got {max_pages}")]
    InvalidConfig { max_pages: usize, limit: usize },

    #[error("table has no rows")]
    TableEmpty,
}
