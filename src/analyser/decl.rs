//! Variable declarations and function definitions (`spec.md` §4.3,
//! `var-decl`/`func-def`/`param-list`).
//!
//! Grounded in `original_source/analyser/analyser.cpp`'s
//! `analyseVariableDeclaration`/`analyseInitDeclarator`/
//! `analyseFunctionDefinition`/`analyseParameterDeclaration`.
use log::debug;

use super::{Analyser, Scope};
use crate::error::{CompileResult, ErrorKind};
use crate::instruction::Operation;
use crate::program::FunctionCode;
use crate::symbol::SymType;
use crate::token::TokenKind;

impl Analyser {
    /// Two-token lookahead deciding whether the upcoming declaration is a
    /// function definition rather than a variable declaration (`spec.md`
    /// §4.3, "Top-level ordering"). Only ever called at global scope, where
    /// `const` always means a var-decl (function return types are never
    /// `const`) and `main` is always a function.
    pub(super) fn is_function_def_ahead(&self) -> bool {
        match self.peek() {
            TokenKind::Void => true,
            TokenKind::Const => false,
            TokenKind::Int | TokenKind::Char | TokenKind::Double => match self.peek_at(1) {
                TokenKind::Identifier(name) if name == "main" => true,
                TokenKind::Identifier(_) => matches!(self.peek_at(2), TokenKind::LParen),
                _ => false,
            },
            _ => false,
        }
    }

    fn expect_return_type(&mut self) -> CompileResult<SymType> {
        let ty = match self.peek() {
            TokenKind::Void => SymType::Void,
            TokenKind::Int => SymType::Int,
            TokenKind::Char => SymType::Char,
            TokenKind::Double => SymType::Double,
            _ => return Err(self.err(ErrorKind::InvalidFunctionDefinition)),
        };
        self.advance();
        Ok(ty)
    }

    /// A type-specifier valid for a variable or parameter: `int`, `char`, or
    /// `double`. `void` is rejected with `void_err`.
    fn expect_value_type(&mut self, void_err: ErrorKind) -> CompileResult<SymType> {
        let ty = match self.peek() {
            TokenKind::Void => return Err(self.err(void_err)),
            TokenKind::Int => SymType::Int,
            TokenKind::Char => SymType::Char,
            TokenKind::Double => SymType::Double,
            _ => return Err(self.err(ErrorKind::InvalidVariableDeclaration)),
        };
        self.advance();
        Ok(ty)
    }

    fn declare_var(&mut self, name: String, is_const: bool, ty: SymType, is_initialised: bool) {
        match self.scope {
            Scope::Global => {
                self.globals.add_var(name, is_const, ty, is_initialised);
            }
            Scope::Function(f) => {
                self.locals_mut(f).add_var(name, is_const, ty, is_initialised);
            }
        }
    }

    /// `var-decl := [const] type-spec init-declarator {',' init-declarator} ';'`
    pub(super) fn analyse_var_decl(&mut self) -> CompileResult<()> {
        let is_const = if matches!(self.peek(), TokenKind::Const) {
            self.advance();
            true
        } else {
            false
        };
        let ty = self.expect_value_type(ErrorKind::VoidVariable)?;

        self.init_declarator(is_const, ty)?;
        while matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            self.init_declarator(is_const, ty)?;
        }

        self.expect(TokenKind::Semicolon, ErrorKind::MissingSemicolon)
    }

    /// `{var-decl}` as it appears at the top of a function body, or at
    /// top-level before the first function definition is recognised.
    pub(super) fn analyse_var_decls(&mut self) -> CompileResult<()> {
        while matches!(
            self.peek(),
            TokenKind::Const | TokenKind::Int | TokenKind::Char | TokenKind::Double
        ) {
            self.analyse_var_decl()?;
        }
        Ok(())
    }

    /// `init-declarator := identifier ['=' expression]`. An uninitialised
    /// local reserves its slot(s) via `snew`; an uninitialised global defaults
    /// to zero. An initialised declaration needs no store: the initialiser's
    /// result is left sitting on the stack in the variable's slot, since
    /// declarations are compiled in the same order their slots are numbered.
    fn init_declarator(&mut self, is_const: bool, ty: SymType) -> CompileResult<()> {
        let name = self.expect_identifier(ErrorKind::InvalidVariableDeclaration)?;
        if self.is_declared_here(&name) {
            return Err(self.err(ErrorKind::DuplicateDeclaration(name)));
        }
        self.declare_var(name.clone(), is_const, ty, false);

        if matches!(self.peek(), TokenKind::Assign) {
            self.advance();
            let expr_ty = self.analyse_expression()?;
            self.convert_to(expr_ty, ty);
            self.mark_initialised(&name);
        } else if is_const {
            return Err(self.err(ErrorKind::ConstWithoutInitialiser(name)));
        } else {
            match self.scope {
                Scope::Function(_) => {
                    let slots = if ty == SymType::Double { 2 } else { 1 };
                    self.emit1(Operation::Snew, slots);
                }
                Scope::Global => {
                    self.emit1(Operation::Ipush, 0);
                    if ty == SymType::Double {
                        self.emit(Operation::I2d);
                    }
                    self.mark_initialised(&name);
                }
            }
        }
        Ok(())
    }

    /// `func-def := type-spec identifier '(' [param-list] ')' compound-stmt`
    pub(super) fn analyse_function_def(&mut self) -> CompileResult<()> {
        let ty = self.expect_return_type()?;
        let name = self.expect_identifier(ErrorKind::InvalidFunctionDefinition)?;
        if self.constants.is_declared(&name) || self.globals.is_declared(&name) {
            return Err(self.err(ErrorKind::DuplicateDeclaration(name)));
        }
        let slot = self.constants.add_function(name, ty);
        debug!(
            "generating code for function '{}' (slot {slot})",
            self.constants.get_by_index(slot).name
        );

        self.expect(TokenKind::LParen, ErrorKind::InvalidFunctionDefinition)?;
        let param_count = if matches!(
            self.peek(),
            TokenKind::Const | TokenKind::Int | TokenKind::Char | TokenKind::Double
        ) {
            self.analyse_param_list(slot)?
        } else {
            0
        };
        self.constants.set_param_count(slot, param_count);
        self.expect(TokenKind::RParen, ErrorKind::InvalidFunctionDefinition)?;

        self.scope = Scope::Function(slot);
        self.code = Vec::new();
        self.analyse_function_body(ty)?;
        let instructions = std::mem::take(&mut self.code);
        self.functions.push(FunctionCode {
            name_index: slot,
            param_count,
            instructions,
        });
        self.scope = Scope::Global;
        Ok(())
    }

    /// `param-list := param {',' param}`
    fn analyse_param_list(&mut self, func: usize) -> CompileResult<usize> {
        let mut count = 1;
        self.analyse_param(func)?;
        while matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            self.analyse_param(func)?;
            count += 1;
        }
        Ok(count)
    }

    /// `param := [const] type-spec identifier`. The reference source only
    /// checks for a `const`/`int` lookahead before deciding a parameter list
    /// is present at all, missing `char`/`double` parameters; this
    /// implementation checks the full value-type set, matching the grammar in
    /// `spec.md` §4.3.
    fn analyse_param(&mut self, func: usize) -> CompileResult<()> {
        let is_const = if matches!(self.peek(), TokenKind::Const) {
            self.advance();
            true
        } else {
            false
        };
        let ty = self.expect_value_type(ErrorKind::InvalidFunctionDefinition)?;
        let name = self.expect_identifier(ErrorKind::InvalidFunctionDefinition)?;
        if self.locals_mut(func).is_declared(&name) {
            return Err(self.err(ErrorKind::DuplicateDeclaration(name)));
        }
        self.locals_mut(func).add_param(name, is_const, ty);
        Ok(())
    }
}
