//! The textual assembly pretty-printer (`spec.md` §4.4).
//!
//! Grounded in `spec.md`'s described layout (`.constants:`/`.start:`/
//! `.functions:`/`.Fi:` sections); there is no reference textual format to
//! match byte-for-byte, unlike the binary encoder, so the column layout below
//! is this crate's own, kept close to `y-lang`'s `asm/mod.rs` `Display`-per-
//! instruction style.
use std::fmt::Write as _;

use crate::instruction::Instruction;
use crate::program::Program;

fn write_instruction(out: &mut String, index: usize, instr: &Instruction) {
    let widths = instr.op.operand_widths();
    match widths.len() {
        0 => {
            let _ = writeln!(out, "    {index}: {}", instr.op);
        }
        1 => {
            let _ = writeln!(out, "    {index}: {} {}", instr.op, instr.x);
        }
        _ => {
            let _ = writeln!(out, "    {index}: {} {}, {}", instr.op, instr.x, instr.y);
        }
    }
}

/// Renders a complete textual assembly listing for `program`.
pub fn emit(program: &Program) -> String {
    let mut out = String::new();

    let _ = writeln!(out, ".constants:");
    for (index, symbol) in program.constants.symbols().iter().enumerate() {
        let _ = writeln!(out, "    {index} S \"{}\"", symbol.name);
    }

    let _ = writeln!(out, ".start:");
    for (index, instr) in program.start_code.iter().enumerate() {
        write_instruction(&mut out, index, instr);
    }

    let _ = writeln!(out, ".functions:");
    for (order, func) in program.functions.iter().enumerate() {
        let _ = writeln!(
            out,
            "    {order} {} {} 1",
            func.name_index, func.param_count
        );
    }

    for (order, func) in program.functions.iter().enumerate() {
        let _ = writeln!(out, ".F{order}:");
        for (index, instr) in func.instructions.iter().enumerate() {
            write_instruction(&mut out, index, instr);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analyser, lexer};

    fn compile(src: &str) -> Program {
        let tokens = lexer::tokenize(src).expect("lex");
        analyser::analyse(tokens).expect("analyse")
    }

    #[test]
    fn simple_main_renders_expected_sections() {
        let program = compile("int main(){return 0;}");
        let text = emit(&program);
        assert!(text.contains(".constants:"));
        assert!(text.contains(".start:"));
        assert!(text.contains(".functions:"));
        assert!(text.contains(".F0:"));
        assert!(text.contains("ipush 0"));
        assert!(text.contains("iret"));
    }

    #[test]
    fn string_literal_is_interned_and_listed_as_constant() {
        let program = compile("int main(){print(\"hi\"); return 0;}");
        let text = emit(&program);
        assert!(text.contains("S \"hi\""));
        assert!(text.contains("S \"main\""));
    }
}
