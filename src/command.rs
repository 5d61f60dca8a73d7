//! Turns a line typed at the prompt into something the executor understands.

use crate::error::PrepareError;
use crate::executor::Statement;
use crate::row::Row;
use crate::{EMAIL_SIZE, USERNAME_SIZE};

// Non-SQL statements like .exit are called “meta-commands”.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommands {
    Exit,
    Constants,
    Unrecognized,
}

impl MetaCommands {
    pub fn parse(input: &str) -> Option<MetaCommands> {
        match input {
            ".exit" => Some(MetaCommands::Exit),
            ".constants" => Some(MetaCommands::Constants),
            _ => {
                if input.starts_with('.') {
                    Some(MetaCommands::Unrecognized)
                } else {
                    None
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    Meta(MetaCommands),
    Statement(Result<Statement, PrepareError>),
}

impl InputType {
    pub fn parse(input: &str) -> InputType {
        if let Some(meta) = MetaCommands::parse(input) {
            InputType::Meta(meta)
        } else {
            InputType::Statement(prepare(input))
        }
    }
}

pub fn prepare(input: &str) -> Result<Statement, PrepareError> {
    let mut tokens = input.split_whitespace();
    match tokens.next() {
        Some("insert") => prepare_insert(tokens),
        Some("select") => Ok(Statement::Select),
        _ => Err(PrepareError::Unrecognized(input.to_string())),
    }
}

fn prepare_insert<'a>(
    mut args: impl Iterator<Item = &'a str>,
) -> Result<Statement, PrepareError> {
    let (Some(id), Some(username), Some(email), None) =
        (args.next(), args.next(), args.next(), args.next())
    else {
        return Err(PrepareError::SyntaxError);
    };

    // Stored strings end at the first NUL byte.
    if username.contains('\0') || email.contains('\0') {
        return Err(PrepareError::SyntaxError);
    }

    let id: i64 = id.parse().map_err(|_| PrepareError::SyntaxError)?;
    if id < 0 {
        return Err(PrepareError::NegativeId);
    }
    let id = u32::try_from(id).map_err(|_| PrepareError::SyntaxError)?;

    // The last byte of each string column is reserved for the terminator.
    if username.len() >= USERNAME_SIZE || email.len() >= EMAIL_SIZE {
        return Err(PrepareError::StringTooLong);
    }

    Ok(Statement::Insert(Row::new(id, username, email)))
}
