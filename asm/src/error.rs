use crate::{block::BlockKind, token::Pos};
use color_print::cprintln;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Lexical
    #[error("`{0}` is not a valid number")]
    InvalidNumber(String),

    #[error("Value {0} must be an integer")]
    NotAnInteger(String),

    #[error("Value {0} is not in the allowed range of {1} to {2}")]
    OutOfRange(String, i32, i32),

    // Structure
    #[error("WHILE must be inside a BEGIN...REPEAT block")]
    WhileOutsideBegin,

    #[error("Found REPEAT without a corresponding BEGIN")]
    RepeatWithoutBegin,

    #[error("Found ENDIF without a corresponding IF")]
    EndifWithoutIf,

    #[error("Found ELSE without a corresponding IF")]
    ElseWithoutIf,

    #[error("{0} block was never closed")]
    BlockNeverClosed(BlockKind),

    #[error("{0} expects a name")]
    MissingName(&'static str),

    // Symbols
    #[error("The label {0} has already been used at {1}")]
    LabelAlreadyUsed(String, Pos),

    #[error("The label {0} was not found")]
    LabelNotFound(String),

    #[error("Did not understand `{0}`")]
    NotUnderstood(String),

    #[error("The subroutine {0} has already been defined")]
    SubroutineRedefined(String),

    #[error("The name {0} is not valid as a subroutine name (it looks like a number)")]
    SubroutineLooksNumeric(String),

    #[error("The name {0} is not valid as a subroutine name (it is a built-in command)")]
    SubroutineIsCommand(String),

    #[error("The name {0} is not valid as a subroutine name (it is a keyword)")]
    SubroutineIsKeyword(String),

    // Capacity
    #[error("Too many literals (> {0}) in a row: this will overflow the stack")]
    TooManyLiterals(usize),

    #[error("Too many subroutines: the limit for the {1} Maestro is {0}")]
    TooManySubroutines(usize, arch::profile::Profile),

    #[error("Program too large: offset {0} does not fit in 16 bits")]
    ProgramTooLarge(usize),

    // Semantics
    #[error("Literal commands may not be used directly in a program; integers should be entered directly")]
    LiteralCommand,

    #[error("Jumps may not be used directly in a program")]
    JumpCommand,

    #[error("Calls may not be used directly in a program; call a subroutine by its name")]
    CallCommand,

    #[error("{0} is only available on the Mini Maestro 12, 18, and 24")]
    MiniOnly(String),

    #[error("The opcode has already been set")]
    OpcodeAlreadySet,

    // Files
    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read file: {0}")]
    FileRead(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),

    #[error("Failed to encode subroutine table")]
    TableEncode(#[source] serde_yaml::Error),
}

impl Error {
    pub fn at(self, pos: &Pos) -> Diag {
        Diag {
            pos: pos.clone(),
            error: self,
        }
    }
}

/// An error bound to the source position it was raised at.
#[derive(Error, Debug)]
#[error("{pos}: {error}")]
pub struct Diag {
    pub pos: Pos,
    #[source]
    pub error: Error,
}

impl Diag {
    /// Print error with diagnostic information showing file location and line content
    pub fn print_diag(&self, lines: &[String]) {
        cprintln!("<red,bold>error</>: {}", self.error);
        cprintln!("     <blue>--></> <underline>{}</>", self.pos);
        cprintln!("      <blue>|</>");

        let line_content = self.source_of(lines);

        cprintln!(" <blue>{:>4} |</> {}", self.pos.line, line_content);
        cprintln!(
            "      <blue>|</> {}<red,bold>^</>",
            " ".repeat(self.pos.col.saturating_sub(1))
        );
    }

    /// The source line the diagnostic points into, empty when out of range.
    pub fn source_of<'a>(&self, lines: &'a [String]) -> &'a str {
        self.pos
            .line
            .checked_sub(1)
            .and_then(|idx| lines.get(idx))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines() -> Vec<String> {
        vec!["begin".to_string(), "  1 frob".to_string()]
    }

    #[test]
    fn display_has_location() {
        let diag = Error::NotUnderstood("FROB".into()).at(&Pos::new("main.txt", 2, 5));
        assert_eq!(diag.to_string(), "main.txt:2:5: Did not understand `FROB`");
    }

    #[test]
    fn source_of_picks_the_line() {
        let diag = Error::LabelNotFound("USER_X".into()).at(&Pos::new("main.txt", 2, 5));
        assert_eq!(diag.source_of(&lines()), "  1 frob");
        let past = Error::LabelNotFound("USER_X".into()).at(&Pos::new("main.txt", 9, 1));
        assert_eq!(past.source_of(&lines()), "");
        let zero = Error::LabelNotFound("USER_X".into()).at(&Pos::new("main.txt", 0, 1));
        assert_eq!(zero.source_of(&lines()), "");
    }

    #[test]
    fn print_diag_handles_any_position() {
        Error::WhileOutsideBegin.at(&Pos::new("main.txt", 1, 1)).print_diag(&lines());
        Error::WhileOutsideBegin.at(&Pos::new("main.txt", 40, 0)).print_diag(&[]);
    }
}
