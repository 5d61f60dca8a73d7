use tracing::debug;

use crate::error::ExecuteError;
use crate::row::Row;
use crate::store::PagedStore;

/// A statement that has already passed input validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    Rows(Vec<Row>),
}

pub fn execute(statement: &Statement, store: &mut PagedStore) -> Result<Outcome, ExecuteError> {
    match statement {
        Statement::Insert(row) => execute_insert(row, store),
        Statement::Select => Ok(execute_select(store)),
    }
}

fn execute_insert(row: &Row, store: &mut PagedStore) -> Result<Outcome, ExecuteError> {
    store.append(row)?;
    debug!(id = row.id, rows = store.num_rows(), "insert executed");
    Ok(Outcome::Inserted)
}

fn execute_select(store: &PagedStore) -> Outcome {
    let rows = store.scan();
    debug!(rows = rows.len(), "select executed");
    Outcome::Rows(rows)
}
