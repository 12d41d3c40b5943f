//! Shared helpers for the integration tests (included per-file via `#[path]`,
//! matching the single-crate, no-separate-test-utils shape of this project —
//! unlike the teacher, which links a dedicated `test_utils` crate around an
//! actual VM run, this compiler has no runtime VM to execute against
//! (`spec.md` §1, Non-goals), so these tests assert directly on the emitted
//! instruction sequences.
#![allow(dead_code)]

use c0c::error::CompileError;
use c0c::instruction::{Instruction, Operation};
use c0c::program::{FunctionCode, Program};

pub fn compile(src: &str) -> Program {
    let tokens = c0c::tokenize(src).expect("tokenize");
    c0c::analyse(tokens).expect("analyse")
}

pub fn compile_err(src: &str) -> CompileError {
    let tokens = c0c::tokenize(src).expect("tokenize");
    c0c::analyse(tokens).expect_err("expected a compile error")
}

pub fn func<'a>(program: &'a Program, order: usize) -> &'a FunctionCode {
    &program.functions[order]
}

/// Reduces an instruction sequence to `(mnemonic, x, y)` triples for
/// compact comparison; non-operand instructions carry `(0, 0)`.
pub fn ops(instrs: &[Instruction]) -> Vec<(&'static str, i64, i64)> {
    instrs.iter().map(|i| (i.op.mnemonic(), i.x, i.y)).collect()
}

pub fn op(mnemonic: &'static str, x: i64, y: i64) -> (&'static str, i64, i64) {
    (mnemonic, x, y)
}

pub fn bare(op: Operation) -> (&'static str, i64, i64) {
    (op.mnemonic(), 0, 0)
}
