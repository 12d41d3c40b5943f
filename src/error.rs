//! The closed set of diagnostics this compiler can produce.
//!
//! Every error is fatal: the first one aborts compilation (`spec.md` §7), so
//! there is no need for a recovery-oriented error type. `CompileError` pairs an
//! `ErrorKind` with the `Position` at which it was detected.
use thiserror::Error;

use crate::position::Position;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("error reading input stream")]
    StreamError,
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("invalid input character '{0}'")]
    InvalidInput(char),

    #[error("invalid integer literal")]
    InvalidInteger,
    #[error("invalid hexadecimal integer literal")]
    InvalidHexInteger,
    #[error("invalid identifier")]
    InvalidIdentifier,
    #[error("integer literal overflows a 32-bit signed integer")]
    IntegerOverflow,
    #[error("invalid character literal")]
    InvalidChar,
    #[error("invalid string literal")]
    InvalidString,
    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("program is missing a 'main' function")]
    MissingMain,
    #[error("'void' is not a valid type for a variable")]
    VoidVariable,
    #[error("'void' value used where a value is required")]
    VoidOperand,
    #[error("invalid function definition")]
    InvalidFunctionDefinition,
    #[error("invalid function call")]
    InvalidFunctionCall,
    #[error("call to undefined function '{0}'")]
    UndefinedCall(String),
    #[error("wrong number of arguments for call to '{0}': expected {expected}, found {found}", expected = .1, found = .2)]
    ArgumentCountMismatch(String, usize, usize),
    #[error("'{0}' is shadowed by a local and cannot be called from within this function")]
    RecursionThroughShadowing(String),
    #[error("duplicate declaration of '{0}'")]
    DuplicateDeclaration(String),
    #[error("'{0}' is not declared")]
    NotDeclared(String),
    #[error("cannot assign to const variable '{0}'")]
    AssignToConst(String),
    #[error("'{0}' is read before being initialised")]
    NotInitialised(String),
    #[error("'const' declaration of '{0}' requires an initialiser")]
    ConstWithoutInitialiser(String),

    #[error("expected ';'")]
    MissingSemicolon,
    #[error("invalid compound statement")]
    InvalidCompoundStatement,
    #[error("invalid condition")]
    InvalidConditionStatement,
    #[error("invalid loop statement")]
    InvalidLoopStatement,
    #[error("invalid return statement")]
    InvalidReturnStatement,
    #[error("invalid print statement")]
    InvalidPrintStatement,
    #[error("invalid scan statement")]
    InvalidScanStatement,
    #[error("invalid variable declaration")]
    InvalidVariableDeclaration,
    #[error("invalid assignment")]
    InvalidAssignment,
    #[error("invalid cast expression")]
    InvalidCastExpression,
    #[error("invalid unary expression")]
    InvalidUnaryExpression,
    #[error("invalid primary expression")]
    InvalidPrimaryExpression,
    #[error("incomplete expression")]
    IncompleteExpression,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind} at {at}")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub at: Position,
}

impl CompileError {
    pub fn new(kind: ErrorKind, at: Position) -> Self {
        Self { kind, at }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
