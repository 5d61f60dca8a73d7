use std::fmt;

use crate::ROW_SIZE;
use crate::schema::{Column, Field, Schema};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub username: String,
    pub email: String,
}

impl Row {
    pub fn new(id: u32, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.id, self.username, self.email)
    }
}

/// Converts rows to and from their fixed-width byte form.
///
/// The codec trusts its input: string fields are expected to already fit
/// their column with room for the terminator. Unused bytes are zeroed, so
/// equal rows always encode to equal bytes.
#[derive(Debug, Clone)]
pub struct RowCodec {
    schema: Schema,
}

impl Default for RowCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl RowCodec {
    pub fn new() -> Self {
        Self {
            schema: Schema::users(),
        }
    }

    pub fn encode(&self, row: &Row) -> [u8; ROW_SIZE] {
        let mut buf = [0u8; ROW_SIZE];
        self.encode_into(row, &mut buf);
        buf
    }

    /// Writes `row` into `dst`, which must be exactly one row wide.
    pub fn encode_into(&self, row: &Row, dst: &mut [u8]) {
        debug_assert_eq!(dst.len(), self.schema.row_size());

        for column in self.schema.columns() {
            let field = &mut dst[column.range()];
            match column.field {
                Field::Id => field.copy_from_slice(&row.id.to_le_bytes()),
                Field::Username => write_padded(field, row.username.as_bytes()),
                Field::Email => write_padded(field, row.email.as_bytes()),
            }
        }
    }

    pub fn decode(&self, src: &[u8]) -> Row {
        debug_assert_eq!(src.len(), self.schema.row_size());

        let mut row = Row::new(0, String::new(), String::new());
        for column in self.schema.columns() {
            let field = &src[column.range()];
            match column.field {
                Field::Id => row.id = read_u32(field),
                Field::Username => row.username = read_str(column, field),
                Field::Email => row.email = read_str(column, field),
            }
        }
        row
    }
}

fn write_padded(field: &mut [u8], content: &[u8]) {
    let len = content.len().min(field.len());
    field[..len].copy_from_slice(&content[..len]);
    field[len..].fill(0);
}

fn read_u32(field: &[u8]) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&field[..4]);
    u32::from_le_bytes(bytes)
}

fn read_str(column: &Column, field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(column.width);
    String::from_utf8_lossy(&field[..end]).into_owned()
}
