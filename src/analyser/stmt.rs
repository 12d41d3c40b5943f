//! Statements (`spec.md` §4.3): compound statements, `if`/`while`, `return`,
//! `print`/`scan`, assignment, and function calls used as statements.
//!
//! Grounded in `original_source/analyser/analyser.cpp`'s
//! `analyseCompoundStatement`, `analyseStatementSeq`, `analyseStatement`,
//! `analyseConditionStatement`, `analyseLoopStatement`, `analyseJumpStatement`,
//! `analysePrintStatement`, `analyseScanStatement`, `analyseAssignmentExpression`.
use log::debug;

use super::Analyser;
use crate::error::{CompileResult, ErrorKind};
use crate::instruction::Operation;
use crate::symbol::SymType;
use crate::token::TokenKind;

/// `if`/`while`'s conditional-jump selection table (`spec.md` §4.3). `relop`
/// is `None` for a bare condition.
fn jump_for(relop: Option<TokenKind>, for_if: bool) -> Operation {
    use Operation::*;
    use TokenKind::*;
    match (relop, for_if) {
        (None, true) => Je,
        (None, false) => Jne,
        (Some(Lt), true) => Jge,
        (Some(Lt), false) => Jl,
        (Some(Le), true) => Jg,
        (Some(Le), false) => Jle,
        (Some(Gt), true) => Jle,
        (Some(Gt), false) => Jg,
        (Some(Ge), true) => Jl,
        (Some(Ge), false) => Jge,
        (Some(Eq), true) => Jne,
        (Some(Eq), false) => Je,
        (Some(Neq), true) => Je,
        (Some(Neq), false) => Jne,
        _ => unreachable!("condition relop is always a relational token"),
    }
}

impl Analyser {
    /// `compound-stmt := '{' {var-decl} statement-seq '}'`, the function-body
    /// form. If the body's statements don't provably return, a zero-valued
    /// return matching `ty` is synthesised (`spec.md` §4.3, "Return").
    pub(super) fn analyse_function_body(&mut self, ty: SymType) -> CompileResult<()> {
        self.expect(TokenKind::LBrace, ErrorKind::InvalidCompoundStatement)?;
        self.analyse_var_decls()?;
        let returns = self.analyse_statement_seq()?;
        self.expect(TokenKind::RBrace, ErrorKind::InvalidCompoundStatement)?;

        if !returns {
            match ty {
                SymType::Int | SymType::Char => {
                    self.emit1(Operation::Ipush, 0);
                    self.emit(Operation::Iret);
                }
                SymType::Double => {
                    self.emit1(Operation::Ipush, 0);
                    self.emit(Operation::I2d);
                    self.emit(Operation::Dret);
                }
                _ => {
                    self.emit(Operation::Ret);
                }
            }
        }
        Ok(())
    }

    /// `'{' statement-seq '}'`, the nested-block form used inside a
    /// statement. No variable declarations are allowed here (`spec.md` §9,
    /// "Scope model").
    fn analyse_block(&mut self) -> CompileResult<bool> {
        self.expect(TokenKind::LBrace, ErrorKind::InvalidCompoundStatement)?;
        let returns = self.analyse_statement_seq()?;
        self.expect(TokenKind::RBrace, ErrorKind::InvalidCompoundStatement)?;
        Ok(returns)
    }

    fn statement_starts_here(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::LBrace
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return
                | TokenKind::Print
                | TokenKind::Scan
                | TokenKind::Identifier(_)
                | TokenKind::Semicolon
        )
    }

    /// `statement-seq := {statement}`. Returns whether the sequence provably
    /// returns on every path reached through it — true once any statement in
    /// it does, since nothing after an unconditional return is reachable.
    fn analyse_statement_seq(&mut self) -> CompileResult<bool> {
        let mut returns = false;
        while self.statement_starts_here() {
            returns |= self.analyse_statement()?;
        }
        Ok(returns)
    }

    /// Returns whether this statement provably returns.
    fn analyse_statement(&mut self) -> CompileResult<bool> {
        match self.peek().clone() {
            TokenKind::LBrace => self.analyse_block(),
            TokenKind::If => self.analyse_if_stmt(),
            TokenKind::While => {
                self.analyse_while_stmt()?;
                // A while body may run zero times, so the loop alone never
                // provably returns, even if its body always does — unlike
                // the reference source, which propagates the body's
                // return-ness upward regardless of whether the loop runs.
                Ok(false)
            }
            TokenKind::Return => {
                self.analyse_return_stmt()?;
                Ok(true)
            }
            TokenKind::Print => {
                self.analyse_print_stmt()?;
                Ok(false)
            }
            TokenKind::Scan => {
                self.analyse_scan_stmt()?;
                Ok(false)
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(false)
            }
            TokenKind::Identifier(_) => {
                self.analyse_identifier_stmt()?;
                Ok(false)
            }
            _ => Err(self.err(ErrorKind::InvalidCompoundStatement)),
        }
    }

    /// `if-stmt := 'if' '(' condition ')' statement ['else' statement]`. A
    /// statement provably returns only if both branches do.
    fn analyse_if_stmt(&mut self) -> CompileResult<bool> {
        self.advance(); // 'if'
        self.expect(TokenKind::LParen, ErrorKind::InvalidConditionStatement)?;
        let relop = self.analyse_condition()?;
        self.expect(TokenKind::RParen, ErrorKind::InvalidConditionStatement)?;

        let skip = self.emit(jump_for(relop, true));
        let then_returns = self.analyse_statement()?;

        if !matches!(self.peek(), TokenKind::Else) {
            let target = self.here();
            self.set_x(skip, target as i64);
            debug!("if-stmt: patched skip jump at {skip} to {target}");
            return Ok(false);
        }
        self.advance(); // 'else'

        let jmp_end = self.emit(Operation::Jmp);
        let else_start = self.here();
        self.set_x(skip, else_start as i64);
        debug!("if-stmt: patched skip jump at {skip} to else branch at {else_start}");
        let else_returns = self.analyse_statement()?;
        let end = self.here();
        self.set_x(jmp_end, end as i64);
        debug!("if-stmt: patched end jump at {jmp_end} to {end}");

        Ok(then_returns && else_returns)
    }

    /// `while-stmt := 'while' '(' condition ')' statement`. The condition is
    /// compiled once, then spliced to after the body (`spec.md` §4.3,
    /// "While"; design note in §9).
    fn analyse_while_stmt(&mut self) -> CompileResult<()> {
        self.advance(); // 'while'
        self.expect(TokenKind::LParen, ErrorKind::InvalidLoopStatement)?;

        let cond_start = self.here();
        let relop = self.analyse_condition()?;
        let cond_end = self.here();
        let condition: Vec<_> = self.code.drain(cond_start..cond_end).collect();

        let entry_jmp = self.emit(Operation::Jmp);
        self.expect(TokenKind::RParen, ErrorKind::InvalidLoopStatement)?;

        let body_start = self.here();
        self.analyse_statement()?;

        let cond_splice = self.here();
        self.set_x(entry_jmp, cond_splice as i64);
        debug!("while-stmt: patched entry jump at {entry_jmp} to spliced condition at {cond_splice}");
        self.code.extend(condition);
        self.emit1(jump_for(relop, false), body_start as i64);
        Ok(())
    }

    /// `'return' [expression] ';'`
    fn analyse_return_stmt(&mut self) -> CompileResult<()> {
        self.advance(); // 'return'
        let ty = self.current_function_type();

        if ty == SymType::Void {
            self.expect(TokenKind::Semicolon, ErrorKind::MissingSemicolon)?;
            self.emit(Operation::Ret);
            return Ok(());
        }

        let expr_ty = self.analyse_expression()?;
        self.convert_to(expr_ty, ty);
        self.expect(TokenKind::Semicolon, ErrorKind::MissingSemicolon)?;
        self.emit(match ty {
            SymType::Double => Operation::Dret,
            _ => Operation::Iret,
        });
        Ok(())
    }

    /// `print-stmt := 'print' '(' [printable-list] ')' ';'`
    fn analyse_print_stmt(&mut self) -> CompileResult<()> {
        self.advance(); // 'print'
        self.expect(TokenKind::LParen, ErrorKind::InvalidPrintStatement)?;
        if !matches!(self.peek(), TokenKind::RParen) {
            self.analyse_printable()?;
            while matches!(self.peek(), TokenKind::Comma) {
                self.advance();
                self.emit1(Operation::Bipush, b' ' as i64);
                self.emit(Operation::Cprint);
                self.analyse_printable()?;
            }
        }
        self.expect(TokenKind::RParen, ErrorKind::InvalidPrintStatement)?;
        self.expect(TokenKind::Semicolon, ErrorKind::MissingSemicolon)?;
        self.emit(Operation::Printl);
        Ok(())
    }

    /// `printable := expression | string-literal | char-literal`. A bare
    /// char-literal token prints via `cprint` directly; a char *expression*
    /// (e.g. a `char` variable) still goes through the typed-print dispatch
    /// below, since the literal token itself carries no declared type.
    fn analyse_printable(&mut self) -> CompileResult<()> {
        match self.peek().clone() {
            TokenKind::StringLiteral(value) => {
                self.advance();
                let index = self.constants.intern_string(&value);
                self.emit1(Operation::Loadc, index as i64);
                self.emit(Operation::Sprint);
            }
            TokenKind::CharLiteral(value) => {
                self.advance();
                self.emit1(Operation::Bipush, value as i64);
                self.emit(Operation::Cprint);
            }
            _ => {
                let ty = self.analyse_expression()?;
                self.emit(match ty {
                    SymType::Int => Operation::Iprint,
                    SymType::Char => Operation::Cprint,
                    SymType::Double => Operation::Dprint,
                    _ => return Err(self.err(ErrorKind::VoidOperand)),
                });
            }
        }
        Ok(())
    }

    /// `scan-stmt := 'scan' '(' identifier ')' ';'`
    fn analyse_scan_stmt(&mut self) -> CompileResult<()> {
        self.advance(); // 'scan'
        self.expect(TokenKind::LParen, ErrorKind::InvalidScanStatement)?;
        let name = self.expect_identifier(ErrorKind::InvalidScanStatement)?;
        let Some((ty, is_const, _init, index, level_diff)) = self.resolve_var(&name) else {
            return Err(self.err(ErrorKind::NotDeclared(name)));
        };
        if is_const {
            return Err(self.err(ErrorKind::AssignToConst(name)));
        }
        self.expect(TokenKind::RParen, ErrorKind::InvalidScanStatement)?;
        self.expect(TokenKind::Semicolon, ErrorKind::MissingSemicolon)?;

        self.emit2(Operation::Loada, level_diff as i64, index as i64);
        match ty {
            SymType::Double => {
                self.emit(Operation::Dscan);
                self.emit(Operation::Dstore);
            }
            SymType::Char => {
                self.emit(Operation::Cscan);
                self.emit(Operation::Istore);
            }
            _ => {
                self.emit(Operation::Iscan);
                self.emit(Operation::Istore);
            }
        }
        self.mark_initialised(&name);
        Ok(())
    }

    /// `identifier '(' ... ')' ';'` (function call) or
    /// `identifier '=' expression ';'` (assignment): disambiguated by the
    /// token right after the identifier.
    fn analyse_identifier_stmt(&mut self) -> CompileResult<()> {
        match self.peek_at(1) {
            TokenKind::LParen => {
                let ret_ty = self.analyse_function_call()?;
                match ret_ty {
                    SymType::Void => {}
                    SymType::Double => {
                        self.emit(Operation::Pop2);
                    }
                    _ => {
                        self.emit(Operation::Pop);
                    }
                }
                self.expect(TokenKind::Semicolon, ErrorKind::MissingSemicolon)
            }
            TokenKind::Assign => self.analyse_assignment(),
            _ => Err(self.err(ErrorKind::InvalidAssignment)),
        }
    }

    /// `assignment := identifier '=' expression`
    fn analyse_assignment(&mut self) -> CompileResult<()> {
        let name = self.expect_identifier(ErrorKind::InvalidAssignment)?;
        let Some((ty, is_const, _init, index, level_diff)) = self.resolve_var(&name) else {
            return Err(self.err(ErrorKind::NotDeclared(name)));
        };
        if is_const {
            return Err(self.err(ErrorKind::AssignToConst(name)));
        }
        self.emit2(Operation::Loada, level_diff as i64, index as i64);

        self.expect(TokenKind::Assign, ErrorKind::InvalidAssignment)?;
        let expr_ty = self.analyse_expression()?;
        let stored_ty = self.convert_to(expr_ty, ty);
        self.expect(TokenKind::Semicolon, ErrorKind::MissingSemicolon)?;

        self.emit(if stored_ty == SymType::Double {
            Operation::Dstore
        } else {
            Operation::Istore
        });
        self.mark_initialised(&name);
        Ok(())
    }
}
