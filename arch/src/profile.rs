use crate::op::Opcode;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Hardware variant a script is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum Profile {
    /// Micro Maestro 6: shallow stack, 128 subroutines, no opcodes from PWM on.
    #[default]
    Micro,
    /// Mini Maestro 12/18/24.
    Mini,
}

impl Profile {
    /// Consecutive literals that always overflow the stack.
    pub const LITERAL_CEILING: usize = 126;

    /// Subroutines reachable through a one byte command (128..=255).
    pub const DIRECT_SUBROUTINES: usize = 128;

    /// First opcode only the larger variant implements.
    pub const MINI_ONLY_FROM: u8 = 50;

    pub fn from_mini(is_mini: bool) -> Self {
        if is_mini {
            Profile::Mini
        } else {
            Profile::Micro
        }
    }

    pub fn is_mini(self) -> bool {
        self == Profile::Mini
    }

    pub fn literal_limit(self) -> Option<usize> {
        match self {
            Profile::Micro => Some(32),
            Profile::Mini => None,
        }
    }

    pub fn subroutine_limit(self) -> Option<usize> {
        match self {
            Profile::Micro => Some(Self::DIRECT_SUBROUTINES),
            Profile::Mini => None,
        }
    }

    pub fn supports(self, op: Opcode) -> bool {
        self.is_mini() || op.byte() < Self::MINI_ONLY_FROM
    }
}
