//! grammar compiler - converts a token stream to a postfix compiled expression
//!
//! binary tiers, loosest to tightest:
//! - `&&` `||`
//! - `==` `!=` `<` `<=` `>` `>=`
//! - `&` `+` `-`
//! - `*` `/`
//!
//! all binary operators are left-associative. the prefix `!` binds tighter
//! than any binary operator, and `(` `)` group sub-expressions.

use super::error::CompileError;
use super::types::{CompiledExpression, CompiledToken, CompiledTokenKind, LexedToken, Operator, Token};

/// tier used for the prefix `!` on the operator stack
const UNARY_PRECEDENCE: u8 = 0;

#[derive(Debug, Clone, Copy)]
struct PendingOperator {
    op: Operator,
    position: usize,
}

impl PendingOperator {
    fn precedence(&self) -> Option<u8> {
        if self.op == Operator::Not {
            Some(UNARY_PRECEDENCE)
        } else {
            self.op.binary_precedence()
        }
    }

    fn into_compiled(self) -> CompiledToken {
        let kind = if self.op == Operator::Not {
            CompiledTokenKind::PreUnary
        } else {
            CompiledTokenKind::Binary
        };
        CompiledToken {
            kind,
            token: Token::Operator(self.op),
            position: self.position,
        }
    }
}

/// compile lexed tokens into a postfix sequence
///
/// pure and deterministic: the same token stream always compiles to the
/// same sequence.
pub fn compile(tokens: &[LexedToken]) -> Result<CompiledExpression, CompileError> {
    if tokens.is_empty() {
        return Err(CompileError::Empty);
    }

    let mut output: Vec<CompiledToken> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<PendingOperator> = Vec::new();
    let mut expect_operand = true;
    // last operator seen, for error reporting
    let mut last_operator: Option<PendingOperator> = None;

    for lexed in tokens {
        let position = lexed.position;

        let op = match &lexed.token {
            Token::Operator(op) => *op,
            operand => {
                if !expect_operand {
                    return Err(CompileError::UnexpectedOperand {
                        token: operand.to_string(),
                        position,
                    });
                }
                output.push(CompiledToken {
                    kind: CompiledTokenKind::Operand,
                    token: operand.clone(),
                    position,
                });
                expect_operand = false;
                continue;
            }
        };

        let pending = PendingOperator { op, position };

        match op {
            Operator::Not | Operator::GroupStart => {
                if !expect_operand {
                    return Err(CompileError::UnexpectedOperator { operator: op, position });
                }
                stack.push(pending);
            }
            Operator::GroupEnd => {
                if expect_operand {
                    return Err(match last_operator {
                        Some(prev) if prev.op.is_binary() || prev.op == Operator::Not => {
                            CompileError::MissingOperand {
                                operator: prev.op,
                                position: prev.position,
                            }
                        }
                        _ => CompileError::UnexpectedOperator { operator: op, position },
                    });
                }

                loop {
                    match stack.pop() {
                        Some(top) if top.op == Operator::GroupStart => break,
                        Some(top) => output.push(top.into_compiled()),
                        None => return Err(CompileError::UnmatchedGroupEnd { position }),
                    }
                }
            }
            binary => {
                if expect_operand {
                    return Err(CompileError::MissingOperand {
                        operator: binary,
                        position,
                    });
                }

                let precedence = pending.precedence().unwrap_or(u8::MAX);
                while let Some(top) = stack.last().copied() {
                    match top.precedence() {
                        Some(top_precedence) if top_precedence <= precedence => {
                            stack.pop();
                            output.push(top.into_compiled());
                        }
                        _ => break,
                    }
                }

                stack.push(pending);
                expect_operand = true;
            }
        }

        last_operator = Some(pending);
    }

    if expect_operand {
        // the stream ended on an operator waiting for its operand
        return Err(match last_operator {
            Some(prev) => CompileError::MissingOperand {
                operator: prev.op,
                position: prev.position,
            },
            None => CompileError::Empty,
        });
    }

    while let Some(top) = stack.pop() {
        if top.op == Operator::GroupStart {
            return Err(CompileError::UnmatchedGroupStart {
                position: top.position,
            });
        }
        output.push(top.into_compiled());
    }

    Ok(CompiledExpression::new(String::new(), output))
}
