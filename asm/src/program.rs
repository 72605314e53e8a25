use crate::{
    block::{Block, BlockKind, Blocks},
    error::{Diag, Error},
    inst::{Instruction, Role},
    label::Labels,
    token::Pos,
};
use arch::{
    crc::crc16,
    inst::{Command, SUB_BASE},
    op::Opcode,
    profile::Profile,
};
use indexmap::IndexMap;

/// One compilation unit: the instruction list in program order plus the
/// symbol tables filled in by the completion passes.
#[derive(Debug)]
pub struct Program {
    profile: Profile,
    lines: Vec<String>,
    insts: Vec<Instruction>,
    blocks: Blocks,
    labels: Labels,
    commands: IndexMap<String, u8>,
    addresses: IndexMap<String, u16>,
}

impl Program {
    pub fn new(profile: Profile) -> Self {
        Program {
            profile,
            lines: vec![],
            insts: vec![],
            blocks: Blocks::new(),
            labels: Labels::new(),
            commands: IndexMap::new(),
            addresses: IndexMap::new(),
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn add_source_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    /// 1-based, like the positions in diagnostics.
    pub fn source_line(&self, line: usize) -> Option<&str> {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(|s| s.as_str())
    }

    pub fn source_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn source_line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.insts
    }

    pub fn push(&mut self, inst: Instruction) {
        self.insts.push(inst);
    }

    /// Extends the literal run at the end of the program, or starts one.
    pub fn add_literal(&mut self, value: u16, pos: &Pos) -> Result<(), Diag> {
        let profile = self.profile;
        match self.insts.last_mut() {
            Some(run) if run.is_literal_run() => {
                run.push_literal(value, profile).map_err(|e| e.at(run.pos()))
            }
            _ => {
                let mut run = Instruction::literal(pos.clone());
                run.push_literal(value, profile).map_err(|e| e.at(pos))?;
                self.push(run);
                Ok(())
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Blocks

impl Program {
    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    /// Opens a block and places its start label at `pos`.
    pub fn open_block(&mut self, kind: BlockKind, pos: &Pos) -> Block {
        let block = self.blocks.open(kind, pos.clone()).clone();
        self.push(Instruction::label(block.start_label(), pos.clone()));
        block
    }

    /// Closes the innermost block, placing its end label at `pos`.
    pub fn close_block(&mut self, pos: &Pos) -> Option<Block> {
        let block = self.blocks.close()?;
        self.push(Instruction::label(block.end_label(), pos.clone()));
        Some(block)
    }
}

// ----------------------------------------------------------------------------
// Completion passes

impl Program {
    /// Runs the three passes in the only order that is valid.
    pub fn complete(&mut self) -> Result<(), Diag> {
        self.complete_literals();
        self.complete_calls()?;
        self.complete_jumps()
    }

    pub fn complete_literals(&mut self) {
        for inst in &mut self.insts {
            inst.complete_literal();
        }
    }

    pub fn complete_calls(&mut self) -> Result<(), Diag> {
        // Command bytes, in declaration order
        let mut count = 0;
        for inst in &self.insts {
            let Role::Subroutine(name) = inst.role() else {
                continue;
            };
            if self.commands.contains_key(name) {
                return Err(Error::SubroutineRedefined(name.clone()).at(inst.pos()));
            }
            let cmd = if count < Profile::DIRECT_SUBROUTINES {
                SUB_BASE + count as u8
            } else if let Some(limit) = self.profile.subroutine_limit() {
                return Err(Error::TooManySubroutines(limit, self.profile).at(inst.pos()));
            } else {
                Opcode::CALL.byte()
            };
            self.commands.insert(name.clone(), cmd);
            count += 1;
        }

        // Calls take the command byte of their target
        for inst in &mut self.insts {
            let Role::Call(name) = inst.role() else {
                continue;
            };
            let cmd = match self.commands.get(name) {
                Some(&cmd) if cmd == Opcode::CALL.byte() => Command::Op(Opcode::CALL),
                Some(&cmd) => Command::Sub(cmd),
                None => return Err(Error::NotUnderstood(name.clone()).at(inst.pos())),
            };
            let pos = inst.pos().clone();
            inst.set_command(cmd).map_err(|e| e.at(&pos))?;
        }

        // Addresses, now that every size is final
        let offsets = self.offsets()?;
        for (inst, &offset) in self.insts.iter().zip(&offsets) {
            if let Role::Subroutine(name) = inst.role() {
                self.addresses.insert(name.clone(), offset);
            }
        }

        // Overflowed subroutines are called through CALL with their address
        for inst in &mut self.insts {
            if inst.command() != Some(Command::Op(Opcode::CALL)) {
                continue;
            }
            if let Some(&addr) = inst.name().and_then(|name| self.addresses.get(name)) {
                inst.push_address(addr);
            }
        }
        Ok(())
    }

    pub fn complete_jumps(&mut self) -> Result<(), Diag> {
        let offsets = self.offsets()?;
        for (inst, &offset) in self.insts.iter().zip(&offsets) {
            if let Role::Label(name) = inst.role() {
                let prev = self.labels.insert(name.clone(), inst.pos().clone(), offset);
                if let Some((first, _)) = prev {
                    return Err(Error::LabelAlreadyUsed(name.clone(), first).at(inst.pos()));
                }
            }
        }

        for inst in &mut self.insts {
            let Role::Jump(name) = inst.role() else {
                continue;
            };
            let Some(addr) = self.labels.get_val(name) else {
                return Err(Error::LabelNotFound(name.clone()).at(inst.pos()));
            };
            inst.push_address(addr);
        }
        Ok(())
    }

    /// Byte offset at which each instruction starts.
    fn offsets(&self) -> Result<Vec<u16>, Diag> {
        let mut offsets = Vec::with_capacity(self.insts.len());
        let mut pc: usize = 0;
        for inst in &self.insts {
            let offset = u16::try_from(pc).map_err(|_| Error::ProgramTooLarge(pc).at(inst.pos()))?;
            offsets.push(offset);
            pc += inst.len();
        }
        Ok(offsets)
    }
}

// ----------------------------------------------------------------------------
// Results

impl Program {
    pub fn byte_list(&self) -> Vec<u8> {
        self.insts.iter().flat_map(|inst| inst.to_bytes()).collect()
    }

    /// Subroutine name -> command byte (128..=255, or CALL once the table is full).
    pub fn subroutine_commands(&self) -> &IndexMap<String, u8> {
        &self.commands
    }

    /// Subroutine name -> byte offset in the image.
    pub fn subroutine_addresses(&self) -> &IndexMap<String, u16> {
        &self.addresses
    }

    pub fn label_address(&self, name: &str) -> Option<u16> {
        self.labels.get_val(name)
    }

    /// Subroutine addresses by command slot; unused and CALL-only slots stay 0.
    pub fn subroutine_table(&self) -> [u16; Profile::DIRECT_SUBROUTINES] {
        let mut table = [0; Profile::DIRECT_SUBROUTINES];
        for (name, &cmd) in &self.commands {
            if cmd >= SUB_BASE {
                table[(cmd - SUB_BASE) as usize] = self.addresses.get(name).copied().unwrap_or(0);
            }
        }
        table
    }

    /// Checksum over the subroutine table followed by the image.
    pub fn crc(&self) -> u16 {
        let mut message: Vec<u8> = self
            .subroutine_table()
            .iter()
            .flat_map(|addr| addr.to_le_bytes())
            .collect();
        message.extend(self.byte_list());
        crc16(&message)
    }

    /// First instruction emitting bytes at or after `pc`.
    pub fn instruction_at(&self, pc: u16) -> Option<&Instruction> {
        let mut offset = 0;
        for inst in &self.insts {
            let len = inst.len();
            if offset >= pc as usize && len != 0 {
                return Some(inst);
            }
            offset += len;
        }
        None
    }

    pub fn find_label(&self, name: &str) -> Option<&Instruction> {
        self.insts
            .iter()
            .find(|inst| inst.is_label() && inst.name() == Some(name))
    }
}
