use thiserror::Error;

use crate::error::{DbError, Result};
use crate::row::Row;
use crate::table::Table;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PrepareError {
    #[error("ID must be positive.")]
    NegativeId,

    #[error("Page must be positive.")]
    NegativePage,

    #[error("String is too long.")]
    StringTooLong,

    #[error("Syntax error. Could not parse statement.")]
    Syntax,

    #[error("Unrecognized command: {0}")]
    Unrecognized(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    /// `None` selects every row, `Some(n)` the 1-based page `n`.
    Select(Option<usize>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteResult {
    Inserted,
    Rows(Vec<Row>),
}

impl Statement {
    pub fn prepare(input: &str) -> std::result::Result<Statement, PrepareError> {
        let mut tokens = input.split_whitespace();
        let keyword = tokens.next().unwrap_or_default().to_ascii_lowercase();
        let args: Vec<&str> = tokens.collect();

        match keyword.as_str() {
            "insert" => Self::prepare_insert(&args),
            "select" => Self::prepare_select(&args),
            _ => Err(PrepareError::Unrecognized(input.to_string())),
        }
    }

    fn prepare_insert(args: &[&str]) -> std::result::Result<Statement, PrepareError> {
        let [id, username, email] = args else {
            return Err(PrepareError::Syntax);
        };

        let id: i64 = id.parse().map_err(|_| PrepareError::Syntax)?;
        if id < 0 {
            return Err(PrepareError::NegativeId);
        }
        let id = u32::try_from(id).map_err(|_| PrepareError::Syntax)?;

        match Row::new(id, *username, *email) {
            Ok(row) => Ok(Statement::Insert(row)),
            Err(DbError::FieldTooLong { .. }) => Err(PrepareError::StringTooLong),
            Err(_) => Err(PrepareError::Syntax),
        }
    }

    fn prepare_select(args: &[&str]) -> std::result::Result<Statement, PrepareError> {
        match args {
            [] => Ok(Statement::Select(None)),
            [page] => {
                let page: i64 = page.parse().map_err(|_| PrepareError::Syntax)?;
                if page < 0 {
                    return Err(PrepareError::NegativePage);
                }
                let page = usize::try_from(page).map_err(|_| PrepareError::Syntax)?;
                Ok(Statement::Select(Some(page)))
            }
            _ => Err(PrepareError::Syntax),
        }
    }

    pub fn execute(&self, table: &mut Table) -> Result<ExecuteResult> {
        match self {
            Statement::Insert(row) => {
                table.insert(row)?;
                Ok(ExecuteResult::Inserted)
            }
            Statement::Select(Some(page)) => Ok(ExecuteResult::Rows(table.select_rows(*page)?)),
            Statement::Select(None) => Ok(ExecuteResult::Rows(table.select_all()?)),
        }
    }
}
