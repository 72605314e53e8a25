use crate::op::{Opcode, Shape};
use color_print::cformat;

/// First byte value that names a subroutine instead of an opcode.
pub const SUB_BASE: u8 = 128;

/// What the leading byte of an encoded instruction stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Op(Opcode),
    /// Direct subroutine call through the command table (128..=255).
    Sub(u8),
}

impl Command {
    pub fn byte(&self) -> u8 {
        match self {
            Command::Op(op) => op.byte(),
            Command::Sub(cmd) => *cmd,
        }
    }

    pub fn from_byte(b: u8) -> Result<Self, String> {
        if b >= SUB_BASE {
            return Ok(Command::Sub(b));
        }
        Opcode::try_from(b)
            .map(Command::Op)
            .map_err(|_| format!("Undefined opcode: 0x{b:02X}"))
    }

    pub fn shape(&self) -> Shape {
        match self {
            Command::Op(op) => op.shape(),
            Command::Sub(_) => Shape::None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            Command::Op(op) => op.to_string(),
            Command::Sub(cmd) => format!("SUB#{:02X}", cmd - SUB_BASE),
        }
    }
}

/// A machine instruction with its argument words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inst {
    pub cmd: Command,
    pub args: Vec<u16>,
}

/// Encodes one instruction. A word shaped instruction without its word yet
/// is padded with zeros so it keeps its final size.
pub fn encode(cmd: Command, args: &[u16]) -> Vec<u8> {
    let mut bytes = vec![cmd.byte()];
    match cmd.shape() {
        Shape::None => {}
        Shape::Byte => bytes.push(args.first().copied().unwrap_or(0) as u8),
        Shape::Word => {
            bytes.extend_from_slice(&args.first().copied().unwrap_or(0).to_le_bytes())
        }
        Shape::ByteRun => {
            bytes.push(args.len() as u8);
            bytes.extend(args.iter().map(|&v| v as u8));
        }
        Shape::WordRun => {
            bytes.push((args.len() * 2) as u8);
            for v in args {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
        }
    }
    bytes
}

fn take(body: &[u8], n: usize, cmd: Command) -> Result<&[u8], String> {
    body.get(..n)
        .ok_or_else(|| format!("Truncated {}: needs {} more bytes", cmd.name(), n))
}

impl Inst {
    pub fn new(cmd: Command, args: Vec<u16>) -> Self {
        Inst { cmd, args }
    }

    pub fn encode(&self) -> Vec<u8> {
        encode(self.cmd, &self.args)
    }

    /// Decodes the instruction at the head of `bytes`, returning it with its size.
    pub fn decode(bytes: &[u8]) -> Result<(Inst, usize), String> {
        let head = *bytes.first().ok_or("Unexpected end of image")?;
        let cmd = Command::from_byte(head)?;
        let body = &bytes[1..];
        let need = |n: usize| take(body, n, cmd);
        let word = |b: &[u8]| u16::from_le_bytes([b[0], b[1]]);

        let (args, size) = match cmd.shape() {
            Shape::None => (vec![], 1),
            Shape::Byte => (vec![need(1)?[0] as u16], 2),
            Shape::Word => (vec![word(need(2)?)], 3),
            Shape::ByteRun => {
                let n = need(1)?[0] as usize;
                let run = &need(1 + n)?[1..];
                (run.iter().map(|&b| b as u16).collect(), 2 + n)
            }
            Shape::WordRun => {
                let n = need(1)?[0] as usize;
                if n % 2 != 0 {
                    return Err(format!("Odd length {n} in {}", cmd.name()));
                }
                let run = &need(1 + n)?[1..];
                (run.chunks(2).map(word).collect(), 2 + n)
            }
        };
        Ok((Inst { cmd, args }, size))
    }

    /// Splits a whole image into instructions keyed by byte offset.
    pub fn disassemble(image: &[u8]) -> Result<Vec<(u16, Inst)>, String> {
        let mut insts = vec![];
        let mut pc = 0;
        while pc < image.len() {
            let (inst, size) = Inst::decode(&image[pc..]).map_err(|e| format!("0x{pc:04X}: {e}"))?;
            insts.push((pc as u16, inst));
            pc += size;
        }
        Ok(insts)
    }

    pub fn cformat(&self) -> String {
        let args = self
            .args
            .iter()
            .map(|v| cformat!("<y>0x{:04X}</>", v))
            .collect::<Vec<_>>()
            .join(" ");
        match self.cmd {
            Command::Op(_) => cformat!("<r>{:<18}</>{}", self.cmd.name(), args),
            Command::Sub(_) => cformat!("<g>{:<18}</>{}", self.cmd.name(), args),
        }
    }
}
