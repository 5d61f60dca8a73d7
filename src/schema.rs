//! Layout description of the single table the store holds.
//!
//! Offsets are computed from the declared widths when the schema is built,
//! so the byte layout never depends on how the compiler lays out `Row`.

use crate::{EMAIL_SIZE, ID_SIZE, USERNAME_SIZE};

/// The fields a row is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Username,
    Email,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Username => "username",
            Field::Email => "email",
        }
    }

    pub fn width(self) -> usize {
        match self {
            Field::Id => ID_SIZE,
            Field::Username => USERNAME_SIZE,
            Field::Email => EMAIL_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub field: Field,
    pub name: &'static str,
    pub width: usize,
    pub offset: usize,
}

impl Column {
    /// Byte range of this column inside an encoded row.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.width
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
    row_size: usize,
}

impl Schema {
    /// Builds a schema from fields laid out back to back in the given order.
    pub fn new(fields: &[Field]) -> Self {
        let mut offset = 0;
        let columns = fields
            .iter()
            .map(|&field| {
                let column = Column {
                    field,
                    name: field.name(),
                    width: field.width(),
                    offset,
                };
                offset += column.width;
                column
            })
            .collect();

        Self {
            columns,
            row_size: offset,
        }
    }

    /// The `(id, username, email)` table.
    pub fn users() -> Self {
        Self::new(&[Field::Id, Field::Username, Field::Email])
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }
}
