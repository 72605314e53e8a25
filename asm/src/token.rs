use arch::op::Opcode;
use std::fmt;
use strum::{Display, EnumString};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Upper-cased spelling.
    pub text: String,
    pub kind: TokenKind,
    pub pos: Pos,
}

impl Token {
    pub fn new(text: String, pos: Pos) -> Self {
        let kind = TokenKind::classify(&text);
        Token { text, kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Anything shaped like a literal; the value is checked by the parser.
    Number,
    Keyword(Keyword),
    /// `name:` (the name without its colon)
    Label(String),
    Op(Opcode),
    /// Subroutine name, or the operand of GOTO / SUB.
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum Keyword {
    GOTO,
    SUB,
    BEGIN,
    WHILE,
    REPEAT,
    IF,
    ELSE,
    ENDIF,
}

impl TokenKind {
    pub fn classify(text: &str) -> Self {
        if looks_like_number(text) {
            return TokenKind::Number;
        }
        if let Ok(kw @ (Keyword::GOTO | Keyword::SUB)) = text.parse::<Keyword>() {
            return TokenKind::Keyword(kw);
        }
        if let Some(name) = text.strip_suffix(':') {
            return TokenKind::Label(name.to_string());
        }
        if let Ok(kw) = text.parse::<Keyword>() {
            return TokenKind::Keyword(kw);
        }
        match text.parse::<Opcode>() {
            Ok(op) => TokenKind::Op(op),
            Err(_) => TokenKind::Name,
        }
    }
}

/// `-?[0-9.]+` or `0x[0-9a-f.]+`
pub fn looks_like_number(s: &str) -> bool {
    let decimal = s.strip_prefix('-').unwrap_or(s);
    if !decimal.is_empty() && decimal.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return true;
    }
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit() || c == '.'),
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    pub file: String,
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(file: &str, line: usize, col: usize) -> Self {
        Pos {
            file: file.to_string(),
            line,
            col,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers() {
        for s in ["0", "-12", "1.5", "..", "0X1F", "0x.", "007"] {
            assert!(looks_like_number(s), "{s}");
        }
        for s in ["-", "0X", "1A", "0XG", "X10", "--1", ""] {
            assert!(!looks_like_number(s), "{s}");
        }
    }

    #[test]
    fn classify() {
        use TokenKind::*;
        assert_eq!(TokenKind::classify("100"), Number);
        assert_eq!(TokenKind::classify("GOTO"), Keyword(super::Keyword::GOTO));
        assert_eq!(TokenKind::classify("ENDIF"), Keyword(super::Keyword::ENDIF));
        assert_eq!(TokenKind::classify("LOOP:"), Label("LOOP".to_string()));
        assert_eq!(TokenKind::classify("BEGIN:"), Label("BEGIN".to_string()));
        assert_eq!(TokenKind::classify("SERVO"), Op(Opcode::SERVO));
        assert_eq!(TokenKind::classify("FROB"), Name);
    }
}
