//! CLI output: error mapping from pipeline errors to the CLI surface.

use crate::error::CommandError;

/// A terminal failure prints exactly its message.
pub fn map_error(e: &CommandError) -> String {
    e.to_string()
}
