//! error types for lexing, compiling and evaluating edit conditions

use super::types::{OperandKind, Operator};

/// malformed token stream
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated quoted name starting at position {position}")]
    UnterminatedQuote { position: usize },

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("single colon in property name \"{name}\" at position {position}, expected double colons")]
    SingleColon { name: String, position: usize },

    #[error("double colon at start of property name \"{name}\" at position {position}, expected enum type")]
    DoubleColonAtStart { name: String, position: usize },

    #[error("double colon at end of property name \"{name}\" at position {position}, expected enum value")]
    DoubleColonAtEnd { name: String, position: usize },

    #[error("multiple double colons in property name \"{name}\" at position {position}")]
    MultipleDoubleColons { name: String, position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnterminatedQuote { position }
            | LexError::UnexpectedCharacter { position, .. }
            | LexError::SingleColon { position, .. }
            | LexError::DoubleColonAtStart { position, .. }
            | LexError::DoubleColonAtEnd { position, .. }
            | LexError::MultipleDoubleColons { position, .. } => *position,
        }
    }
}

/// malformed grammar
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("empty expression")]
    Empty,

    #[error("missing operand for '{operator}' at position {position}")]
    MissingOperand { operator: Operator, position: usize },

    #[error("unexpected operand '{token}' at position {position}, expected an operator")]
    UnexpectedOperand { token: String, position: usize },

    #[error("unexpected '{operator}' at position {position}")]
    UnexpectedOperator { operator: Operator, position: usize },

    #[error("unmatched '(' at position {position}")]
    UnmatchedGroupStart { position: usize },

    #[error("unmatched ')' at position {position}")]
    UnmatchedGroupEnd { position: usize },
}

/// failure of a whole `parse` call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),
}

/// failure raised while evaluating a compiled expression
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("attempted to use an invalid operand \"{name}\"")]
    InvalidOperand { name: String },

    #[error("attempted to use an invalid enum value \"{type_name}::{value}\"")]
    InvalidEnumValue { type_name: String, value: String },

    #[error("attempted to compare operands of different types: \"{left}\" and \"{right}\"")]
    TypeMismatch { left: String, right: String },

    #[error("unsupported operand kinds for '{operator}': {}", describe_kinds(.left, .right))]
    UnsupportedOperands {
        operator: Operator,
        left: OperandKind,
        right: Option<OperandKind>,
    },

    #[error("expression did not reduce to a boolean (got {kind})")]
    NotBoolean { kind: OperandKind },

    #[error("property \"{name}\" is not a bool field")]
    NotBooleanProperty { name: String },

    #[error("malformed compiled expression")]
    Malformed,
}

impl EvalError {
    pub fn invalid_operand(name: impl Into<String>) -> Self {
        Self::InvalidOperand { name: name.into() }
    }

    pub fn type_mismatch(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::TypeMismatch {
            left: left.into(),
            right: right.into(),
        }
    }

    /// operand name the error refers to, when there is exactly one
    pub fn operand_name(&self) -> Option<&str> {
        match self {
            EvalError::InvalidOperand { name } | EvalError::NotBooleanProperty { name } => {
                Some(name)
            }
            _ => None,
        }
    }
}

fn describe_kinds(left: &OperandKind, right: &Option<OperandKind>) -> String {
    match right {
        Some(right) => format!("{} and {}", left, right),
        None => left.to_string(),
    }
}
