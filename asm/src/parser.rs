use crate::{
    block::BlockKind,
    error::{Diag, Error},
    inst::Instruction,
    lexer::Lexer,
    program::Program,
    token::{Keyword, Pos, Token, TokenKind},
};
use arch::{op::Opcode, profile::Profile};
use std::num::IntErrorKind;

/// What the next token will be read as. GOTO and SUB keep their own
/// position so a name missing at end of input can be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    Goto(Pos),
    Sub(Pos),
}

pub struct Parser {
    program: Program,
    mode: Mode,
}

/// Parses a whole script into an uncompleted program.
pub fn parse(file: &str, source: &str, profile: Profile) -> Result<Program, Diag> {
    let mut parser = Parser::new(profile);
    for (line, tokens) in Lexer::new(file, source).parse() {
        parser.parse_line(line, tokens)?;
    }
    parser.finish()
}

impl Parser {
    pub fn new(profile: Profile) -> Self {
        Parser {
            program: Program::new(profile),
            mode: Mode::Normal,
        }
    }

    pub fn parse_line(&mut self, raw: &str, tokens: Vec<Token>) -> Result<(), Diag> {
        self.program.add_source_line(raw);
        for token in tokens {
            self.token(token)?;
        }
        Ok(())
    }

    /// Rejects dangling GOTO / SUB and unclosed blocks.
    pub fn finish(self) -> Result<Program, Diag> {
        match self.mode {
            Mode::Goto(pos) => return Err(Error::MissingName("GOTO").at(&pos)),
            Mode::Sub(pos) => return Err(Error::MissingName("SUB").at(&pos)),
            Mode::Normal => {}
        }
        if let Some(block) = self.program.blocks().current() {
            return Err(Error::BlockNeverClosed(block.kind).at(&block.pos));
        }
        Ok(self.program)
    }

    fn token(&mut self, token: Token) -> Result<(), Diag> {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => self.normal(token),
            Mode::Goto(_) => {
                self.program
                    .push(Instruction::jump(user_label(&token.text), token.pos));
                Ok(())
            }
            Mode::Sub(_) => self.subroutine(token),
        }
    }

    fn subroutine(&mut self, token: Token) -> Result<(), Diag> {
        let Token { text, kind, pos } = token;
        match kind {
            TokenKind::Number => Err(Error::SubroutineLooksNumeric(text).at(&pos)),
            TokenKind::Op(_) => Err(Error::SubroutineIsCommand(text).at(&pos)),
            TokenKind::Keyword(_) => Err(Error::SubroutineIsKeyword(text).at(&pos)),
            TokenKind::Label(_) | TokenKind::Name => {
                self.program.push(Instruction::subroutine(text, pos));
                Ok(())
            }
        }
    }

    fn normal(&mut self, token: Token) -> Result<(), Diag> {
        let Token { text, kind, pos } = token;
        let program = &mut self.program;
        match kind {
            TokenKind::Number => {
                let value = parse_number(&text).map_err(|e| e.at(&pos))?;
                program.add_literal(value, &pos)?;
            }
            TokenKind::Keyword(Keyword::GOTO) => self.mode = Mode::Goto(pos),
            TokenKind::Keyword(Keyword::SUB) => self.mode = Mode::Sub(pos),
            TokenKind::Label(name) => program.push(Instruction::label(user_label(&name), pos)),
            TokenKind::Keyword(Keyword::BEGIN) => {
                program.open_block(BlockKind::Begin, &pos);
            }
            TokenKind::Keyword(Keyword::WHILE) => {
                let end = match program.blocks().current() {
                    Some(block) if block.kind == BlockKind::Begin => block.end_label(),
                    _ => return Err(Error::WhileOutsideBegin.at(&pos)),
                };
                program.push(Instruction::jump_if_zero(end, pos));
            }
            TokenKind::Keyword(Keyword::REPEAT) => {
                let start = match program.blocks().current() {
                    Some(block) if block.kind == BlockKind::Begin => block.start_label(),
                    _ => return Err(Error::RepeatWithoutBegin.at(&pos)),
                };
                program.push(Instruction::jump(start, pos.clone()));
                program.close_block(&pos);
            }
            TokenKind::Keyword(Keyword::IF) => {
                let end = program.open_block(BlockKind::If, &pos).end_label();
                program.push(Instruction::jump_if_zero(end, pos));
            }
            TokenKind::Keyword(Keyword::ENDIF) => match program.blocks().current_kind() {
                Some(BlockKind::If | BlockKind::Else) => {
                    program.close_block(&pos);
                }
                _ => return Err(Error::EndifWithoutIf.at(&pos)),
            },
            TokenKind::Keyword(Keyword::ELSE) => {
                if program.blocks().current_kind() != Some(BlockKind::If) {
                    return Err(Error::ElseWithoutIf.at(&pos));
                }
                // The ELSE block opened below takes the next id, so the jump
                // over it targets that block's end.
                let end = program.blocks().next_end_label();
                program.push(Instruction::jump(end, pos.clone()));
                program.close_block(&pos);
                program.open_block(BlockKind::Else, &pos);
            }
            TokenKind::Op(op) => {
                if op.is_literal() {
                    return Err(Error::LiteralCommand.at(&pos));
                }
                if op.is_jump() {
                    return Err(Error::JumpCommand.at(&pos));
                }
                if op == Opcode::CALL {
                    return Err(Error::CallCommand.at(&pos));
                }
                if !program.profile().supports(op) {
                    return Err(Error::MiniOnly(op.to_string()).at(&pos));
                }
                program.push(Instruction::op(op, pos));
            }
            TokenKind::Name => program.push(Instruction::call(text, pos)),
        }
        Ok(())
    }
}

fn user_label(name: &str) -> String {
    format!("USER_{name}")
}

/// Decimal in -32768..=32767 or hex in 0..=0xFFFF, as a 16-bit word.
pub fn parse_number(s: &str) -> Result<u16, Error> {
    if let Some(hex) = s.strip_prefix("0X").or_else(|| s.strip_prefix("0x")) {
        return match u64::from_str_radix(hex, 16) {
            Ok(v) if v <= u16::MAX as u64 => Ok(v as u16),
            Ok(_) => Err(Error::OutOfRange(s.to_string(), 0, u16::MAX as i32)),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                Err(Error::OutOfRange(s.to_string(), 0, u16::MAX as i32))
            }
            Err(_) => Err(Error::InvalidNumber(s.to_string())),
        };
    }

    // Decimal is checked digit by digit, never through a float
    let out_of_range = || Error::OutOfRange(s.to_string(), i16::MIN as i32, i16::MAX as i32);
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(Error::InvalidNumber(s.to_string()));
    }

    let magnitude = match whole {
        "" => 0,
        _ => whole.parse::<i64>().map_err(|_| out_of_range())?,
    };
    let value = if negative { -magnitude } else { magnitude };
    if value < i16::MIN as i64 || value > i16::MAX as i64 {
        return Err(out_of_range());
    }
    if fraction.bytes().any(|b| b != b'0') {
        let at_bound = if negative {
            value == i16::MIN as i64
        } else {
            value == i16::MAX as i64
        };
        if at_bound {
            return Err(out_of_range());
        }
        return Err(Error::NotAnInteger(s.to_string()));
    }
    Ok(value as i16 as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! number {
        ($($name:ident: $text:expr => $expect:pat,)*) => {
            $(
                #[test]
                fn $name() {
                    assert!(matches!(parse_number($text), $expect), "{:?}", parse_number($text));
                }
            )*
        }
    }

    number! {
        decimal: "1000" => Ok(1000),
        negative: "-1" => Ok(0xFFFF),
        min: "-32768" => Ok(0x8000),
        max: "32767" => Ok(0x7FFF),
        too_big: "32768" => Err(Error::OutOfRange(_, -32768, 32767)),
        too_small: "-32769" => Err(Error::OutOfRange(_, -32768, 32767)),
        huge: "99999999999999999999" => Err(Error::OutOfRange(..)),
        hex: "0XFFFF" => Ok(0xFFFF),
        hex_lower: "0x1f" => Ok(0x1F),
        hex_too_big: "0X10000" => Err(Error::OutOfRange(_, 0, 65535)),
        hex_dot: "0X1.0" => Err(Error::InvalidNumber(_)),
        whole_float: "12.0" => Ok(12),
        fraction: "1.5" => Err(Error::NotAnInteger(_)),
        big_fraction: "40000.5" => Err(Error::OutOfRange(..)),
        dots: "1..2" => Err(Error::InvalidNumber(_)),
        lone_dot: "." => Err(Error::InvalidNumber(_)),
        trailing_dot: "5." => Ok(5),
        leading_dot: ".5" => Err(Error::NotAnInteger(_)),
        negative_zero_fraction: "-0.5" => Err(Error::NotAnInteger(_)),
        zeros_after_dot: "-7.000" => Ok(0xFFF9),
        tiny_fraction: "0.99999999999999999999" => Err(Error::NotAnInteger(_)),
        tiny_excess: "2.00000000000000001" => Err(Error::NotAnInteger(_)),
        below_min_by_a_hair: "-32768.0000000000000001" => Err(Error::OutOfRange(_, -32768, 32767)),
        above_max_by_a_hair: "32767.000000000000000001" => Err(Error::OutOfRange(_, -32768, 32767)),
        min_exact: "-32768.000" => Ok(0x8000),
    }

    fn parse_ok(source: &str) -> Program {
        parse("script", source, Profile::Mini).unwrap()
    }

    fn names(program: &Program) -> Vec<String> {
        program
            .instructions()
            .iter()
            .map(|inst| match inst.name() {
                Some(name) => format!("{:?}:{}", inst.slot(), name),
                None => format!("{:?}", inst.slot()),
            })
            .collect()
    }

    #[test]
    fn mode_survives_line_end() {
        let program = parse_ok("goto\nthere\nsub\nthere");
        assert_eq!(
            names(&program),
            vec!["Set(Op(JUMP)):USER_THERE", "Unset:THERE"]
        );
    }

    #[test]
    fn goto_takes_numbers_as_names() {
        let program = parse_ok("goto 5 5:");
        assert_eq!(program.instructions()[0].name(), Some("USER_5"));
        assert_eq!(program.instructions()[1].name(), Some("USER_5"));
    }

    #[test]
    fn else_jumps_to_the_next_block_end() {
        let program = parse_ok("if 1 else 2 endif");
        assert_eq!(
            names(&program),
            vec![
                "Unset:block_start_0",
                "Set(Op(JUMP_Z)):block_end_0",
                "Literal",
                "Set(Op(JUMP)):block_end_1",
                "Unset:block_end_0",
                "Unset:block_start_1",
                "Literal",
                "Unset:block_end_1",
            ]
        );
    }

    #[test]
    fn begin_while_repeat() {
        let program = parse_ok("begin while repeat");
        assert_eq!(
            names(&program),
            vec![
                "Unset:block_start_0",
                "Set(Op(JUMP_Z)):block_end_0",
                "Set(Op(JUMP)):block_start_0",
                "Unset:block_end_0",
            ]
        );
    }

    #[test]
    fn literal_run_breaks_at_markers() {
        let program = parse_ok("1 2 x: 3");
        assert_eq!(program.instructions().len(), 3);
        assert_eq!(program.instructions()[0].args(), &[1, 2]);
    }

    #[test]
    fn dangling_keywords() {
        let diag = parse("script", "1\n  goto", Profile::Mini).unwrap_err();
        assert_eq!(diag.pos, Pos::new("script", 2, 3));
        assert!(matches!(diag.error, Error::MissingName("GOTO")));
        let diag = parse("script", "sub", Profile::Mini).unwrap_err();
        assert!(matches!(diag.error, Error::MissingName("SUB")));
    }

    #[test]
    fn sub_rejects_reserved_names() {
        let err = |src| parse("script", src, Profile::Mini).unwrap_err().error;
        assert!(matches!(err("sub 12"), Error::SubroutineLooksNumeric(_)));
        assert!(matches!(err("sub 1.5"), Error::SubroutineLooksNumeric(_)));
        assert!(matches!(err("sub servo"), Error::SubroutineIsCommand(_)));
        assert!(matches!(err("sub repeat"), Error::SubroutineIsKeyword(_)));
        assert!(matches!(err("sub goto"), Error::SubroutineIsKeyword(_)));
    }
}
