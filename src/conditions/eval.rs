//! condition evaluator
//!
//! walks a compiled (postfix) expression with a value stack, resolving each
//! operator through the dispatch table by the kinds of its operands.

use super::context::EvalContext;
use super::error::EvalError;
use super::operators::OperatorTable;
use super::types::{CompiledExpression, CompiledTokenKind, Value};

/// evaluate a compiled expression to a boolean
///
/// the subject is queried afresh on every call; nothing is cached between
/// evaluations.
pub fn evaluate(
    expr: &CompiledExpression,
    table: &OperatorTable,
    ctx: &dyn EvalContext,
) -> Result<bool, EvalError> {
    let mut stack: Vec<Value> = Vec::with_capacity(expr.tokens().len());

    for compiled in expr.tokens() {
        match compiled.kind {
            CompiledTokenKind::Operand => {
                let value = Value::from_operand(&compiled.token).ok_or(EvalError::Malformed)?;
                stack.push(value);
            }
            CompiledTokenKind::PreUnary => {
                let op = compiled.token.as_operator().ok_or(EvalError::Malformed)?;
                let operand = stack.pop().ok_or(EvalError::Malformed)?;
                let result = table.apply_unary(op, &operand, ctx)?;
                tracing::trace!("{}{} -> {}", op, operand, result);
                stack.push(result);
            }
            CompiledTokenKind::Binary => {
                let op = compiled.token.as_operator().ok_or(EvalError::Malformed)?;
                let rhs = stack.pop().ok_or(EvalError::Malformed)?;
                let lhs = stack.pop().ok_or(EvalError::Malformed)?;
                let result = table.apply_binary(op, &lhs, &rhs, ctx)?;
                tracing::trace!("{} {} {} -> {}", lhs, op, rhs, result);
                stack.push(result);
            }
        }
    }

    let result = match stack.pop() {
        Some(value) if stack.is_empty() => value,
        _ => return Err(EvalError::Malformed),
    };

    let outcome = match result {
        Value::Bool(b) => b,
        // the whole expression was a bare field name
        Value::Property(name) => match ctx.bool_value(&name) {
            Some(b) => b,
            None if ctx.type_name(&name).is_some_and(|t| t != "bool") => {
                return Err(EvalError::NotBooleanProperty { name });
            }
            None => return Err(EvalError::InvalidOperand { name }),
        },
        other => return Err(EvalError::NotBoolean { kind: other.kind() }),
    };

    tracing::debug!(
        "evaluated \"{}\" against {} -> {}",
        expr.source(),
        ctx.context_name(),
        outcome
    );

    Ok(outcome)
}
