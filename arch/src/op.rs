use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[allow(non_camel_case_types)]
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    EnumString,
    EnumIter,
    Display,
)]
#[repr(u8)]
pub enum Opcode {
    QUIT = 0,
    LITERAL = 1,
    LITERAL8 = 2,
    LITERAL_N = 3,
    LITERAL8_N = 4,
    RETURN = 5,
    JUMP = 6,
    JUMP_Z = 7,
    DELAY = 8,
    GET_MS = 9,
    DEPTH = 10,
    DROP = 11,
    DUP = 12,
    OVER = 13,
    PICK = 14,
    SWAP = 15,
    ROT = 16,
    ROLL = 17,
    BITWISE_NOT = 18,
    BITWISE_AND = 19,
    BITWISE_OR = 20,
    BITWISE_XOR = 21,
    SHIFT_RIGHT = 22,
    SHIFT_LEFT = 23,
    LOGICAL_NOT = 24,
    LOGICAL_AND = 25,
    LOGICAL_OR = 26,
    NEGATE = 27,
    PLUS = 28,
    MINUS = 29,
    TIMES = 30,
    DIVIDE = 31,
    MOD = 32,
    POSITIVE = 33,
    NEGATIVE = 34,
    NONZERO = 35,
    EQUALS = 36,
    NOT_EQUALS = 37,
    MIN = 38,
    MAX = 39,
    LESS_THAN = 40,
    GREATER_THAN = 41,
    SERVO = 42,
    SERVO_8BIT = 43,
    SPEED = 44,
    ACCELERATION = 45,
    GET_POSITION = 46,
    GET_MOVING_STATE = 47,
    LED_ON = 48,
    LED_OFF = 49,
    PWM = 50,
    PEEK = 51,
    POKE = 52,
    SERIAL_SEND_BYTE = 53,
    CALL = 54,
}

impl Opcode {
    /// Looks up an opcode by its script spelling, ignoring case.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_uppercase().parse::<Self>() {
            Ok(op) => Ok(op),
            Err(_) => Err(format!("Undefined Op: {s}")),
        }
    }

    pub fn byte(self) -> u8 {
        self.into()
    }

    pub fn is_literal(self) -> bool {
        use Opcode::*;
        matches!(self, LITERAL | LITERAL8 | LITERAL_N | LITERAL8_N)
    }

    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::JUMP | Opcode::JUMP_Z)
    }
}

/// Layout of the argument bytes that follow an opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    None,
    Byte,
    Word,
    ByteRun,
    WordRun,
}

impl Opcode {
    pub fn shape(&self) -> Shape {
        use Opcode::*;
        match self {
            LITERAL | JUMP | JUMP_Z | CALL => Shape::Word,
            LITERAL8 => Shape::Byte,
            LITERAL_N => Shape::WordRun,
            LITERAL8_N => Shape::ByteRun,
            _ => Shape::None,
        }
    }
}
