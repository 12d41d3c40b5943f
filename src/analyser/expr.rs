//! Expressions (`spec.md` §4.3, `expression`..`primary`) and the `condition`
//! production shared by `if`/`while`.
//!
//! Grounded in `original_source/analyser/analyser.cpp`'s `analyseCondition`,
//! `analyseExpression`, `analyseMultiplicativeExpression`,
//! `analyseCastExpression`, `analyseUnaryExpression`,
//! `analysePrimaryExpression`, `analyseFunctionCall`.
use super::Analyser;
use crate::error::{CompileResult, ErrorKind};
use crate::instruction::Operation;
use crate::symbol::SymType;
use crate::token::TokenKind;

impl Analyser {
    /// `condition := expression [relop expression]`. Returns the relational
    /// operator used, or `None` for a bare (boolean-coerced) condition — the
    /// caller picks the conditional jump from the table in `spec.md` §4.3.
    pub(super) fn analyse_condition(&mut self) -> CompileResult<Option<TokenKind>> {
        let first_ty = self.analyse_expression()?;
        match self.peek().clone() {
            relop @ (TokenKind::Lt
            | TokenKind::Le
            | TokenKind::Gt
            | TokenKind::Ge
            | TokenKind::Eq
            | TokenKind::Neq) => {
                self.advance();
                let left_end = self.here();
                let second_ty = self.analyse_expression()?;
                let cmp_ty = self.promote_pair(first_ty, second_ty, left_end);
                self.emit(if cmp_ty == SymType::Double {
                    Operation::Dcmp
                } else {
                    Operation::Icmp
                });
                Ok(Some(relop))
            }
            _ => {
                if first_ty == SymType::Double {
                    self.emit(Operation::D2i);
                }
                Ok(None)
            }
        }
    }

    /// `expression := multiplicative {addop multiplicative}`
    pub(super) fn analyse_expression(&mut self) -> CompileResult<SymType> {
        let mut ty = self.analyse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => Operation::Iadd,
                TokenKind::Minus => Operation::Isub,
                _ => return Ok(ty),
            };
            self.advance();
            let left_end = self.here();
            let second_ty = self.analyse_multiplicative()?;
            ty = self.promote_pair(ty, second_ty, left_end);
            self.emit(if ty == SymType::Double {
                match op {
                    Operation::Iadd => Operation::Dadd,
                    _ => Operation::Dsub,
                }
            } else {
                op
            });
        }
    }

    /// `multiplicative := cast {mulop cast}`
    fn analyse_multiplicative(&mut self) -> CompileResult<SymType> {
        let mut ty = self.analyse_cast()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => Operation::Imul,
                TokenKind::Slash => Operation::Idiv,
                _ => return Ok(ty),
            };
            self.advance();
            let left_end = self.here();
            let second_ty = self.analyse_cast()?;
            ty = self.promote_pair(ty, second_ty, left_end);
            self.emit(if ty == SymType::Double {
                match op {
                    Operation::Imul => Operation::Dmul,
                    _ => Operation::Ddiv,
                }
            } else {
                op
            });
        }
    }

    /// `cast := {'(' type-spec ')'} unary`. Prefixes stack and apply
    /// outermost-first to the unary result.
    fn analyse_cast(&mut self) -> CompileResult<SymType> {
        let mut targets = Vec::new();
        loop {
            if !matches!(self.peek(), TokenKind::LParen) {
                break;
            }
            if !matches!(
                self.peek_at(1),
                TokenKind::Void | TokenKind::Int | TokenKind::Char | TokenKind::Double
            ) {
                break;
            }
            self.advance(); // '('
            let target = match self.peek() {
                TokenKind::Void => return Err(self.err(ErrorKind::InvalidCastExpression)),
                TokenKind::Int => SymType::Int,
                TokenKind::Char => SymType::Char,
                TokenKind::Double => SymType::Double,
                _ => unreachable!(),
            };
            self.advance();
            self.expect(TokenKind::RParen, ErrorKind::InvalidCastExpression)?;
            targets.push(target);
        }

        let mut ty = self.analyse_unary()?;
        if ty == SymType::Void {
            return Err(self.err(ErrorKind::VoidOperand));
        }

        for target in targets.into_iter().rev() {
            ty = self.convert_to(ty, target);
        }
        Ok(ty)
    }

    /// `unary := ['+' | '-'] primary`
    fn analyse_unary(&mut self) -> CompileResult<SymType> {
        let negate = match self.peek() {
            TokenKind::Plus => {
                self.advance();
                false
            }
            TokenKind::Minus => {
                self.advance();
                true
            }
            _ => false,
        };

        let ty = self.analyse_primary()?;
        if negate {
            self.emit(if ty == SymType::Double {
                Operation::Dneg
            } else {
                Operation::Ineg
            });
        }
        Ok(ty)
    }

    /// `primary := '(' expression ')' | identifier | integer-literal |
    /// char-literal | func-call`
    fn analyse_primary(&mut self) -> CompileResult<SymType> {
        match self.peek().clone() {
            TokenKind::LParen => {
                self.advance();
                let ty = self.analyse_expression()?;
                self.expect(TokenKind::RParen, ErrorKind::InvalidPrimaryExpression)?;
                Ok(ty)
            }
            TokenKind::IntLiteral(value) => {
                self.advance();
                self.emit1(Operation::Ipush, value as i64);
                Ok(SymType::Int)
            }
            TokenKind::CharLiteral(value) => {
                self.advance();
                self.emit1(Operation::Bipush, value as i64);
                Ok(SymType::Int)
            }
            TokenKind::Identifier(_) => {
                if matches!(self.peek_at(1), TokenKind::LParen) {
                    let ty = self.analyse_function_call()?;
                    if ty == SymType::Void {
                        return Err(self.err(ErrorKind::VoidOperand));
                    }
                    Ok(ty)
                } else {
                    self.analyse_var_reference()
                }
            }
            _ => Err(self.err(ErrorKind::InvalidPrimaryExpression)),
        }
    }

    fn analyse_var_reference(&mut self) -> CompileResult<SymType> {
        let name = self.expect_identifier(ErrorKind::InvalidPrimaryExpression)?;
        let Some((ty, _is_const, is_initialised, index, level_diff)) = self.resolve_var(&name) else {
            return Err(self.err(ErrorKind::NotDeclared(name)));
        };
        if !is_initialised {
            return Err(self.err(ErrorKind::NotInitialised(name)));
        }
        self.emit2(Operation::Loada, level_diff as i64, index as i64);
        self.emit(if ty == SymType::Double {
            Operation::Dload
        } else {
            Operation::Iload
        });
        Ok(ty)
    }

    /// `func-call := identifier '(' [expression {',' expression}] ')'`. A
    /// call to a name shadowed by a local in the current function is
    /// rejected (`spec.md` §3, "no recursion via name shadowing").
    pub(super) fn analyse_function_call(&mut self) -> CompileResult<SymType> {
        let name = self.expect_identifier(ErrorKind::InvalidFunctionCall)?;
        if self.is_declared_here(&name) {
            return Err(self.err(ErrorKind::RecursionThroughShadowing(name)));
        }
        let Some(symbol) = self.constants.get(&name).filter(|s| s.is_function) else {
            return Err(self.err(ErrorKind::UndefinedCall(name)));
        };
        let slot = symbol.index;
        let ret_ty = symbol.ty;
        let param_count = symbol.param_count;
        let param_types: Vec<SymType> = (0..param_count)
            .map(|i| self.locals.get(&slot).unwrap().get_by_index(i).ty)
            .collect();

        self.expect(TokenKind::LParen, ErrorKind::InvalidFunctionCall)?;
        let mut arg_count = 0;
        if !matches!(self.peek(), TokenKind::RParen) {
            loop {
                let arg_ty = self.analyse_expression()?;
                if arg_count < param_types.len() {
                    self.convert_to(arg_ty, param_types[arg_count]);
                }
                arg_count += 1;
                if matches!(self.peek(), TokenKind::Comma) {
                    self.advance();
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen, ErrorKind::InvalidFunctionCall)?;
        if arg_count != param_count {
            return Err(self.err(ErrorKind::ArgumentCountMismatch(name, param_count, arg_count)));
        }

        let order = self.constants.function_order(slot);
        self.emit1(Operation::Call, order as i64);
        Ok(ret_ty)
    }
}
