use crate::{error::Error, token::Pos};
use arch::{
    inst::{encode, Command},
    op::Opcode,
    profile::Profile,
};

/// What an instruction stands for besides its bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Code,
    Label(String),
    Jump(String),
    Subroutine(String),
    Call(String),
}

/// Opcode field of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Markers and calls not resolved yet.
    Unset,
    /// Literal run whose width is chosen once the run is complete.
    Literal,
    Set(Command),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    role: Role,
    slot: Slot,
    args: Vec<u16>,
    pos: Pos,
}

impl Instruction {
    fn new(role: Role, slot: Slot, pos: Pos) -> Self {
        Instruction {
            role,
            slot,
            args: vec![],
            pos,
        }
    }

    pub fn op(op: Opcode, pos: Pos) -> Self {
        Self::new(Role::Code, Slot::Set(Command::Op(op)), pos)
    }

    /// An empty literal run.
    pub fn literal(pos: Pos) -> Self {
        Self::new(Role::Code, Slot::Literal, pos)
    }

    pub fn label(name: String, pos: Pos) -> Self {
        Self::new(Role::Label(name), Slot::Unset, pos)
    }

    pub fn jump(name: String, pos: Pos) -> Self {
        Self::new(Role::Jump(name), Slot::Set(Command::Op(Opcode::JUMP)), pos)
    }

    pub fn jump_if_zero(name: String, pos: Pos) -> Self {
        Self::new(Role::Jump(name), Slot::Set(Command::Op(Opcode::JUMP_Z)), pos)
    }

    pub fn subroutine(name: String, pos: Pos) -> Self {
        Self::new(Role::Subroutine(name), Slot::Unset, pos)
    }

    pub fn call(name: String, pos: Pos) -> Self {
        Self::new(Role::Call(name), Slot::Unset, pos)
    }
}

impl Instruction {
    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn args(&self) -> &[u16] {
        &self.args
    }

    pub fn pos(&self) -> &Pos {
        &self.pos
    }

    /// Symbol carried by a label, jump, subroutine or call.
    pub fn name(&self) -> Option<&str> {
        match &self.role {
            Role::Code => None,
            Role::Label(name) | Role::Jump(name) | Role::Subroutine(name) | Role::Call(name) => {
                Some(name)
            }
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self.role, Role::Label(_))
    }

    pub fn is_literal_run(&self) -> bool {
        self.slot == Slot::Literal
    }

    pub fn command(&self) -> Option<Command> {
        match self.slot {
            Slot::Set(cmd) => Some(cmd),
            Slot::Literal => Some(Command::Op(self.literal_opcode())),
            Slot::Unset => None,
        }
    }
}

impl Instruction {
    /// Queues one more literal, failing once the run would overflow the stack.
    pub fn push_literal(&mut self, value: u16, profile: Profile) -> Result<(), Error> {
        self.args.push(value);
        if let Some(limit) = profile.literal_limit() {
            if self.args.len() > limit {
                return Err(Error::TooManyLiterals(limit));
            }
        }
        if self.args.len() > Profile::LITERAL_CEILING {
            return Err(Error::TooManyLiterals(Profile::LITERAL_CEILING));
        }
        Ok(())
    }

    /// Appends a resolved jump or call target.
    pub fn push_address(&mut self, addr: u16) {
        self.args.push(addr);
    }

    pub fn set_command(&mut self, cmd: Command) -> Result<(), Error> {
        match self.slot {
            Slot::Unset => {
                self.slot = Slot::Set(cmd);
                Ok(())
            }
            _ => Err(Error::OpcodeAlreadySet),
        }
    }

    fn literal_opcode(&self) -> Opcode {
        let wide = self.args.iter().any(|&v| v > u8::MAX as u16);
        match (self.args.len() > 1, wide) {
            (false, false) => Opcode::LITERAL8,
            (false, true) => Opcode::LITERAL,
            (true, false) => Opcode::LITERAL8_N,
            (true, true) => Opcode::LITERAL_N,
        }
    }

    /// Settles the width of a literal run. Other instructions are left alone.
    pub fn complete_literal(&mut self) {
        if self.slot == Slot::Literal {
            self.slot = Slot::Set(Command::Op(self.literal_opcode()));
        }
    }

    /// Markers emit nothing, nor does a call that has not been resolved.
    pub fn to_bytes(&self) -> Vec<u8> {
        match (&self.role, self.command()) {
            (Role::Label(_) | Role::Subroutine(_), _) => vec![],
            (_, Some(cmd)) => encode(cmd, &self.args),
            (_, None) => vec![],
        }
    }

    pub fn len(&self) -> usize {
        self.to_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Pos {
        Pos::new("script", 1, 1)
    }

    fn run(values: &[u16]) -> Instruction {
        let mut inst = Instruction::literal(pos());
        for &v in values {
            inst.push_literal(v, Profile::Mini).unwrap();
        }
        inst.complete_literal();
        inst
    }

    #[test]
    fn literal_width() {
        assert_eq!(run(&[200]).command(), Some(Command::Op(Opcode::LITERAL8)));
        assert_eq!(run(&[256]).command(), Some(Command::Op(Opcode::LITERAL)));
        assert_eq!(run(&[1, 255]).command(), Some(Command::Op(Opcode::LITERAL8_N)));
        assert_eq!(run(&[200, 300]).command(), Some(Command::Op(Opcode::LITERAL_N)));
        assert_eq!(run(&[-1i16 as u16]).command(), Some(Command::Op(Opcode::LITERAL)));
    }

    #[test]
    fn literal_bytes() {
        assert_eq!(run(&[200]).to_bytes(), vec![2, 200]);
        assert_eq!(run(&[1000]).to_bytes(), vec![1, 0xE8, 0x03]);
        assert_eq!(run(&[200, 300]).to_bytes(), vec![3, 4, 200, 0, 0x2C, 0x01]);
        assert_eq!(run(&[1, 2]).to_bytes(), vec![4, 2, 1, 2]);
    }

    #[test]
    fn completion_is_idempotent() {
        let mut inst = run(&[1000]);
        inst.complete_literal();
        assert_eq!(inst.command(), Some(Command::Op(Opcode::LITERAL)));
        assert!(!inst.is_literal_run());
    }

    #[test]
    fn micro_overflows_after_32() {
        let mut inst = Instruction::literal(pos());
        for v in 0..32 {
            inst.push_literal(v, Profile::Micro).unwrap();
        }
        assert!(matches!(
            inst.push_literal(32, Profile::Micro),
            Err(Error::TooManyLiterals(32))
        ));
    }

    #[test]
    fn every_profile_overflows_after_126() {
        let mut inst = Instruction::literal(pos());
        for v in 0..126 {
            inst.push_literal(v, Profile::Mini).unwrap();
        }
        assert!(matches!(
            inst.push_literal(126, Profile::Mini),
            Err(Error::TooManyLiterals(126))
        ));
    }

    #[test]
    fn markers_are_empty() {
        assert!(Instruction::label("USER_A".into(), pos()).is_empty());
        assert!(Instruction::subroutine("A".into(), pos()).is_empty());
        assert_eq!(Instruction::jump("USER_A".into(), pos()).len(), 3);
        assert_eq!(Instruction::op(Opcode::SERVO, pos()).to_bytes(), vec![42]);
    }

    #[test]
    fn command_is_set_once() {
        let mut call = Instruction::call("FOO".into(), pos());
        assert!(call.is_empty());
        call.set_command(Command::Sub(128)).unwrap();
        assert_eq!(call.to_bytes(), vec![128]);
        assert!(matches!(
            call.set_command(Command::Sub(129)),
            Err(Error::OpcodeAlreadySet)
        ));
        let mut servo = Instruction::op(Opcode::SERVO, pos());
        assert!(servo.set_command(Command::Sub(128)).is_err());
    }

    #[test]
    fn names() {
        assert_eq!(Instruction::call("FOO".into(), pos()).name(), Some("FOO"));
        assert_eq!(Instruction::literal(pos()).name(), None);
    }
}
