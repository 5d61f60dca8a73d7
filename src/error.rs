use thiserror::Error;

/// Failure to apply a statement to the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    #[error("Error: Table full.")]
    TableFull,
}

/// Failure to turn a line of input into a statement.
///
/// The `Display` text of each variant is what the prompt prints back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrepareError {
    #[error("Syntax error. Could not parse statement.")]
    SyntaxError,

    #[error("String is too long.")]
    StringTooLong,

    #[error("ID must be positive.")]
    NegativeId,

    #[error("Unrecognized command: {0}")]
    Unrecognized(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Page size {page_size} cannot hold a single row of {row_size} bytes")]
    PageTooSmall { page_size: usize, row_size: usize },

    #[error("Page size {page_size} exceeds the limit of {max} bytes")]
    PageTooLarge { page_size: usize, max: usize },

    #[error("Table must have at least one page")]
    NoPages,

    #[error("Table of {max_pages} pages exceeds the limit of {max} pages")]
    TooManyPages { max_pages: usize, max: usize },
}
