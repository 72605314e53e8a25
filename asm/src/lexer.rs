use crate::token::{Pos, Token};

pub struct Lexer<'a> {
    file: &'a str,
    code: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a str, code: &'a str) -> Self {
        Self { file, code }
    }

    /// Raw source lines with their tokens. `\r\n` and `\n` both end a line.
    pub fn parse(self) -> Vec<(&'a str, Vec<Token>)> {
        self.code
            .split('\n')
            .enumerate()
            .map(|(idx, raw)| {
                let line = raw.strip_suffix('\r').unwrap_or(raw);
                (line, LineLexer::new(line, self.file, idx + 1).parse())
            })
            .collect()
    }
}

pub struct LineLexer<'a> {
    line: &'a str,
    file: &'a str,
    row: usize,
}

impl<'a> LineLexer<'a> {
    pub fn new(line: &'a str, file: &'a str, row: usize) -> Self {
        Self { line, file, row }
    }

    /// Splits on single spaces and tabs after dropping the `#` comment.
    /// Every separator counts as one column.
    pub fn parse(self) -> Vec<Token> {
        let code = match self.line.split_once('#') {
            Some((code, _comment)) => code,
            None => self.line,
        };

        let mut tokens = vec![];
        let mut col = 1;
        for word in code.split([' ', '\t']) {
            if word.is_empty() {
                col += 1;
                continue;
            }
            let text = word.to_uppercase();
            let pos = Pos::new(self.file, self.row, col);
            col += word.chars().count() + 1;
            tokens.push(Token::new(text, pos));
        }
        tokens
    }
}
