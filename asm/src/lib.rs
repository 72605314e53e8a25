pub mod block;
pub mod error;
pub mod inst;
pub mod label;
pub mod lexer;
pub mod listing;
pub mod parser;
pub mod program;
pub mod table;
pub mod token;

pub use error::{Diag, Error};
pub use program::Program;

use arch::profile::Profile;

/// Parses `source` and runs every completion pass. `file` only names the
/// script in diagnostics.
pub fn compile(source: &str, file: &str, profile: Profile) -> Result<Program, Diag> {
    let mut program = parser::parse(file, source, profile)?;
    program.complete()?;
    Ok(program)
}
