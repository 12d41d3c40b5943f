//! The single-pass recursive-descent analyser (`spec.md` §4.3): parses,
//! builds and scopes the symbol tables, and emits stack-machine code in one
//! walk over the token stream.
//!
//! Grounded in `original_source/analyser/analyser.h`/`.cpp` for the field
//! layout and algorithms, and in `y-lang`'s `lexer::tokens::Tokens<T>` for the
//! cursor this module's [`crate::cursor::Cursor`] generalises.
mod decl;
mod expr;
mod stmt;

use std::collections::HashMap;

use log::debug;

use crate::cursor::Cursor;
use crate::error::{CompileError, CompileResult, ErrorKind};
use crate::instruction::{Instruction, Operation};
use crate::position::Position;
use crate::program::{FunctionCode, Program};
use crate::symbol::{ConstantTable, SymType, VarTable};
use crate::token::{Token, TokenKind};

/// Identifies the scope an analyser operation runs in: global-initialisation
/// code, or a function body keyed by that function's constant-table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Global,
    Function(usize),
}

pub struct Analyser {
    cursor: Cursor<Token>,
    constants: ConstantTable,
    globals: VarTable,
    locals: HashMap<usize, VarTable>,
    /// Function-order-indexed code, finalised as each function body closes.
    functions: Vec<FunctionCode>,
    start_code: Option<Vec<Instruction>>,
    /// The instruction buffer currently being appended to.
    code: Vec<Instruction>,
    scope: Scope,
}

impl Analyser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            cursor: Cursor::new(tokens),
            constants: ConstantTable::new(),
            globals: VarTable::new(),
            locals: HashMap::new(),
            functions: Vec::new(),
            start_code: None,
            code: Vec::new(),
            scope: Scope::Global,
        }
    }

    // -- token stream helpers -------------------------------------------------

    pub(crate) fn peek(&self) -> &TokenKind {
        &self.cursor.peek().kind
    }

    pub(crate) fn peek_at(&self, offset: usize) -> &TokenKind {
        &self.cursor.peek_at(offset).kind
    }

    pub(crate) fn pos(&self) -> Position {
        self.cursor.peek().start
    }

    pub(crate) fn advance(&mut self) -> Token {
        self.cursor.advance()
    }

    pub(crate) fn at_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    pub(crate) fn err(&self, kind: ErrorKind) -> CompileError {
        CompileError::new(kind, self.pos())
    }

    /// Consumes the next token if it matches `kind` exactly (for tokens with
    /// no payload), otherwise raises `err`.
    pub(crate) fn expect(&mut self, kind: TokenKind, err: ErrorKind) -> CompileResult<()> {
        if *self.peek() == kind {
            self.advance();
            Ok(())
        } else {
            Err(self.err(err))
        }
    }

    pub(crate) fn expect_identifier(&mut self, err: ErrorKind) -> CompileResult<String> {
        match self.peek().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.err(err)),
        }
    }

    // -- code emission ---------------------------------------------------------

    pub(crate) fn here(&self) -> usize {
        self.code.len()
    }

    pub(crate) fn emit(&mut self, op: Operation) -> usize {
        let at = self.here();
        self.code.push(Instruction::new(op));
        at
    }

    pub(crate) fn emit1(&mut self, op: Operation, x: i64) -> usize {
        let at = self.here();
        self.code.push(Instruction::with_operand(op, x));
        at
    }

    pub(crate) fn emit2(&mut self, op: Operation, x: i64, y: i64) -> usize {
        let at = self.here();
        self.code.push(Instruction::with_operands(op, x, y));
        at
    }

    /// Inserts an instruction at `at`, pushing every later instruction back
    /// one slot. Only used for the left-operand promotion rule (`spec.md`
    /// §4.3), which is the only place an instruction needs to land somewhere
    /// other than the end of the buffer.
    pub(crate) fn insert(&mut self, at: usize, op: Operation) {
        self.code.insert(at, Instruction::new(op));
    }

    pub(crate) fn set_x(&mut self, at: usize, x: i64) {
        self.code[at].set_x(x as i64);
    }

    // -- symbol table access, scoped ------------------------------------------

    pub(crate) fn locals_mut(&mut self, func: usize) -> &mut VarTable {
        self.locals.entry(func).or_default()
    }

    /// Declared in the current scope's own table (locals for a function,
    /// globals at top level) — not counting the other table.
    pub(crate) fn is_declared_here(&self, name: &str) -> bool {
        match self.scope {
            Scope::Global => self.globals.is_declared(name),
            Scope::Function(f) => self.locals.get(&f).map(|t| t.is_declared(name)).unwrap_or(false),
        }
    }

    /// Resolves a variable by name using the lookup order from `spec.md`
    /// §4.3 ("Variable references in expressions"): local table first, then
    /// global. Returns the table it was found in and its level-diff.
    pub(crate) fn resolve_var(&self, name: &str) -> Option<(SymType, bool, bool, usize, u16)> {
        if let Scope::Function(f) = self.scope {
            if let Some(sym) = self.locals.get(&f).and_then(|t| t.get(name)) {
                return Some((sym.ty, sym.is_const, sym.is_initialised, sym.index, 0));
            }
        }
        if let Some(sym) = self.globals.get(name) {
            let level_diff = if matches!(self.scope, Scope::Function(_)) { 1 } else { 0 };
            return Some((sym.ty, sym.is_const, sym.is_initialised, sym.index, level_diff));
        }
        None
    }

    /// The enclosing function's declared return type. Only valid while
    /// inside a function body.
    pub(crate) fn current_function_type(&self) -> SymType {
        match self.scope {
            Scope::Function(slot) => self.constants.get_by_index(slot).ty,
            Scope::Global => SymType::Void,
        }
    }

    pub(crate) fn mark_initialised(&mut self, name: &str) {
        match self.scope {
            Scope::Global => self.globals.mark_initialised(name),
            Scope::Function(f) => {
                if self.locals.get(&f).map(|t| t.is_declared(name)).unwrap_or(false) {
                    self.locals.get_mut(&f).unwrap().mark_initialised(name);
                } else {
                    self.globals.mark_initialised(name);
                }
            }
        }
    }

    // -- implicit conversions (spec.md §4.3) -----------------------------------

    /// Converts a value of `from` on top of the stack to `to`, emitting at the
    /// end of the current buffer. Returns the resulting type.
    pub(crate) fn convert_to(&mut self, from: SymType, to: SymType) -> SymType {
        match to {
            SymType::Int => {
                if from == SymType::Double {
                    self.emit(Operation::D2i);
                }
                SymType::Int
            }
            SymType::Char => {
                match from {
                    SymType::Double => {
                        self.emit(Operation::D2i);
                        self.emit(Operation::I2c);
                    }
                    SymType::Int => {
                        self.emit(Operation::I2c);
                    }
                    _ => {}
                }
                SymType::Char
            }
            SymType::Double => {
                if from != SymType::Double {
                    self.emit(Operation::I2d);
                }
                SymType::Double
            }
            other => other,
        }
    }

    /// Implicit promotion for a pair of operands sharing one instruction
    /// (`addop`/`mulop`/`relop` — `spec.md` §4.3): if either side is `double`,
    /// the other is promoted to `double`; otherwise the result is `int`. The
    /// first operand was already compiled when this runs, so promoting it
    /// means inserting at `left_end` (the left-operand promotion rule);
    /// promoting the second operand is a plain append since it was just
    /// compiled.
    pub(crate) fn promote_pair(&mut self, first: SymType, second: SymType, left_end: usize) -> SymType {
        match (first, second) {
            (SymType::Double, SymType::Double) => SymType::Double,
            (SymType::Double, _) => {
                self.emit(Operation::I2d);
                SymType::Double
            }
            (_, SymType::Double) => {
                self.insert(left_end, Operation::I2d);
                SymType::Double
            }
            _ => SymType::Int,
        }
    }

    // -- top-level driver -------------------------------------------------------

    /// `C0-program := {var-decl}{func-def}` (`spec.md` §4.3).
    fn analyse(&mut self) -> CompileResult<()> {
        while !self.at_eof() && !self.is_function_def_ahead() {
            self.analyse_var_decl()?;
        }
        self.start_code = Some(std::mem::take(&mut self.code));

        while !self.at_eof() {
            self.analyse_function_def()?;
        }

        if !self.constants.has_main() {
            return Err(self.err(ErrorKind::MissingMain));
        }
        Ok(())
    }

    fn into_program(self) -> Program {
        Program {
            constants: self.constants,
            start_code: self.start_code.unwrap_or_default(),
            functions: self.functions,
        }
    }
}

/// Runs the analyser to completion over an already-lexed token stream.
pub fn analyse(tokens: Vec<Token>) -> CompileResult<Program> {
    debug!("analysing {} tokens", tokens.len());
    let mut analyser = Analyser::new(tokens);
    analyser.analyse()?;
    Ok(analyser.into_program())
}
