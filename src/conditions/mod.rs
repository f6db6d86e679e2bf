//! edit condition engine
//!
//! parses small boolean expressions that decide whether a field is editable
//! or visible, and evaluates them against a subject through [`EvalContext`]:
//! - literals: `true`, `false` (case-insensitive), numbers, `nullptr`
//! - field names, bare or quoted, resolved at evaluation time
//! - enum members as `Type::Member`
//! - operators: `! && || == != < <= > >= + - * / &` and parentheses
//!
//! a source string is compiled once into a [`CompiledExpression`] and can be
//! evaluated any number of times. every failure is a typed result; failures
//! are also funneled through a deduplicating [`ErrorReporter`].

mod context;
mod error;
mod eval;
mod lexer;
mod operators;
mod parser;
mod report;
mod types;

pub use context::EvalContext;
pub use error::{CompileError, EvalError, LexError, ParseError};
pub use eval::evaluate;
pub use lexer::lex;
pub use operators::{
    nearly_equal, resolve_bool, resolve_number, DispatchKey, Operation, OperatorTable,
    DEFAULT_EPSILON,
};
pub use parser::compile;
pub use report::{global, CollectingSink, DiagnosticSink, ErrorReporter, TracingSink};
pub use types::{
    CompiledExpression, CompiledToken, CompiledTokenKind, LexedToken, ObjectRef, OperandKind,
    Operator, Token, Value,
};

/// lex and compile a source string
///
/// pure: reports nothing and touches no shared state.
pub fn parse(source: &str) -> Result<CompiledExpression, ParseError> {
    let tokens = lex(source)?;
    let expr = compile(&tokens)?.with_source(source);
    tracing::debug!(
        "compiled \"{}\" into {} tokens",
        source,
        expr.tokens().len()
    );
    Ok(expr)
}

/// owns the dispatch table and routes failures to a reporter
#[derive(Debug, Default)]
pub struct EditConditionParser {
    operators: OperatorTable,
}

impl EditConditionParser {
    pub fn new() -> Self {
        Self::with_epsilon(DEFAULT_EPSILON)
    }

    /// use `epsilon` as the tolerance for numeric `==` and `!=`
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            operators: OperatorTable::new(epsilon),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.operators.epsilon()
    }

    pub fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// host hook for registering extra operator/operand combinations
    pub fn operators_mut(&mut self) -> &mut OperatorTable {
        &mut self.operators
    }

    /// parse, reporting failures without a subject identifier
    pub fn parse(
        &self,
        source: &str,
        reporter: &ErrorReporter,
    ) -> Result<CompiledExpression, ParseError> {
        parse(source).map_err(|e| {
            reporter.report(None, &parse_failure_message(source, &e));
            e
        })
    }

    /// parse, reporting failures against the subject of `ctx`
    pub fn parse_for(
        &self,
        source: &str,
        ctx: &dyn EvalContext,
        reporter: &ErrorReporter,
    ) -> Result<CompiledExpression, ParseError> {
        parse(source).map_err(|e| {
            reporter.report(
                Some(&ctx.context_name()),
                &parse_failure_message(source, &e),
            );
            e
        })
    }

    /// evaluate `expr` against `ctx`
    ///
    /// every error is reported as "context: message" before it is returned.
    pub fn evaluate(
        &self,
        expr: &CompiledExpression,
        ctx: &dyn EvalContext,
        reporter: &ErrorReporter,
    ) -> Result<bool, EvalError> {
        evaluate(expr, &self.operators, ctx).map_err(|e| {
            reporter.report(Some(&ctx.context_name()), &e.to_string());
            e
        })
    }
}

fn parse_failure_message(source: &str, err: &ParseError) -> String {
    format!("failed to parse \"{}\": {}", source, err)
}
