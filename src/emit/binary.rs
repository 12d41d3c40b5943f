//! The bit-exact binary encoder (`spec.md` §4.4/§6).
//!
//! Grounded in `original_source/instruction/instruction.h`'s operand-width
//! table (reused here via [`crate::instruction::Operation::operand_widths`])
//! and `spec.md`'s exact byte layout, hand-verified against its worked
//! Scenario 6.
use crate::instruction::Instruction;
use crate::program::Program;

const MAGIC: [u8; 4] = [0x43, 0x30, 0x3A, 0x29];
const VERSION: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

fn push_u16(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&(value as u16).to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: i64) {
    out.extend_from_slice(&(value as i32).to_be_bytes());
}

fn push_instruction(out: &mut Vec<u8>, instr: &Instruction) {
    out.push(instr.op.opcode());
    let widths = instr.op.operand_widths();
    if let Some(&w) = widths.first() {
        push_operand(out, w, instr.x);
    }
    if let Some(&w) = widths.get(1) {
        push_operand(out, w, instr.y);
    }
}

fn push_operand(out: &mut Vec<u8>, width: u8, value: i64) {
    match width {
        1 => out.push(value as u8),
        2 => push_u16(out, value as usize),
        4 => push_u32(out, value),
        _ => unreachable!("no operation declares an operand wider than 4 bytes"),
    }
}

fn push_instructions(out: &mut Vec<u8>, instructions: &[Instruction]) {
    push_u16(out, instructions.len());
    for instr in instructions {
        push_instruction(out, instr);
    }
}

/// Encodes `program` into the fixed binary object format.
pub fn emit(program: &Program) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION);

    // Every constant-pool entry, whether a function name or a string literal,
    // is encoded as a string-kind entry (tag `0x00`); the int/double tags are
    // reserved for constant kinds this compiler never actually pools.
    let symbols = program.constants.symbols();
    push_u16(&mut out, symbols.len());
    for symbol in symbols {
        out.push(0x00);
        push_u16(&mut out, symbol.bytes.len());
        out.extend_from_slice(&symbol.bytes);
    }

    push_instructions(&mut out, &program.start_code);

    push_u16(&mut out, program.functions.len());
    for func in &program.functions {
        push_u16(&mut out, func.name_index);
        push_u16(&mut out, func.param_count);
        push_u16(&mut out, 1); // level is always 1 (spec.md §4.4/§8 scenario 6)
        push_instructions(&mut out, &func.instructions);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analyser, lexer};

    #[test]
    fn scenario_6_matches_the_worked_byte_sequence() {
        let tokens = lexer::tokenize("int main(){return 0;}").expect("lex");
        let program = analyser::analyse(tokens).expect("analyse");
        let bytes = emit(&program);

        let expected: Vec<u8> = vec![
            0x43, 0x30, 0x3A, 0x29, // magic
            0x00, 0x00, 0x00, 0x01, // version
            0x00, 0x01, // constant count
            0x00, 0x00, 0x04, b'm', b'a', b'i', b'n', // "main"
            0x00, 0x00, // start count
            0x00, 0x01, // function count
            0x00, 0x00, // name index
            0x00, 0x00, // param count
            0x00, 0x01, // level
            0x00, 0x02, // instr count
            0x02, 0x00, 0x00, 0x00, 0x00, // ipush 0
            0x89, // iret
        ];
        assert_eq!(bytes, expected);
    }
}
