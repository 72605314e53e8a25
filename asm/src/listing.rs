use crate::program::Program;
use arch::{
    inst::{Inst, SUB_BASE},
    op::Opcode,
};
use color_print::cformat;
use std::fmt::Write;

/// Plain text listing: every source line with the bytes it produced, then
/// the subroutine table.
pub fn render(program: &Program) -> String {
    let mut out = String::new();
    let mut insts = program.instructions().iter().peekable();
    let mut addr: usize = 0;

    for (idx, source) in program.source_lines().iter().enumerate() {
        let line = idx + 1;
        let mut hex = String::new();
        let start = addr;
        while let Some(inst) = insts.next_if(|inst| inst.pos().line == line) {
            for byte in inst.to_bytes() {
                let _ = write!(hex, "{byte:02X}");
                addr += 1;
            }
        }
        let _ = writeln!(out, "{start:04X}: {hex:<20} -- {source}");
    }

    out.push('\n');
    out.push_str("Subroutines:\n");
    out.push_str("Hex Decimal Address Name\n");

    let mut slots: Vec<(u8, u16, &str)> = vec![];
    let mut overflowed: Vec<(u16, &str)> = vec![];
    for (name, &cmd) in program.subroutine_commands() {
        let addr = program.subroutine_addresses().get(name).copied().unwrap_or(0);
        if cmd == Opcode::CALL.byte() {
            overflowed.push((addr, name.as_str()));
        } else {
            slots.push((cmd - SUB_BASE, addr, name.as_str()));
        }
    }
    slots.sort_by_key(|(slot, _, _)| *slot);
    for (slot, addr, name) in slots {
        let _ = writeln!(out, "{slot:02X}  {slot:03}     {addr:04X}    {name}");
    }
    for (addr, name) in overflowed {
        let _ = writeln!(out, "--  ---     {addr:04X}    {name}");
    }
    out
}

/// Colored disassembly of the image, each instruction next to the source
/// line it came from.
pub fn print_dump(program: &Program) {
    let image = program.byte_list();
    let insts = match Inst::disassemble(&image) {
        Ok(insts) => insts,
        Err(msg) => {
            println!("{}", cformat!("<r,s>Cannot disassemble</>: {}", msg));
            return;
        }
    };
    println!("-------+----------------------------+-------------------------------");
    for (pc, inst) in insts {
        let source = program
            .instruction_at(pc)
            .and_then(|i| {
                let line = i.pos().line;
                program.source_line(line).map(|s| (line, s.trim()))
            })
            .map(|(line, s)| format!("{line:>4}: {s}"))
            .unwrap_or_default();
        println!("[{:04X}] | {} | {}", pc, inst.cformat(), source);
    }
    println!("-------+----------------------------+-------------------------------");
}
