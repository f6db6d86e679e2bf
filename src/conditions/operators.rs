//! operator dispatch table
//!
//! maps (operator, left operand kind, right operand kind) to an evaluation
//! function. operator bodies work on resolved values: a property operand is
//! turned into a concrete bool or number through the context before the
//! operation runs, so each operator is written once and registered for every
//! literal/property combination it accepts.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::context::EvalContext;
use super::error::EvalError;
use super::types::{OperandKind, Operator, Value};

/// default tolerance for numeric near-equality
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// evaluation function for one table entry
///
/// unary entries receive the operand as `left` and `Value::Null` as `right`.
pub type Operation =
    Arc<dyn Fn(&Value, &Value, &dyn EvalContext) -> Result<Value, EvalError> + Send + Sync>;

/// key of a dispatch entry; `right` is `None` for prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    pub operator: Operator,
    pub left: OperandKind,
    pub right: Option<OperandKind>,
}

impl DispatchKey {
    pub fn unary(operator: Operator, operand: OperandKind) -> Self {
        Self {
            operator,
            left: operand,
            right: None,
        }
    }

    pub fn binary(operator: Operator, left: OperandKind, right: OperandKind) -> Self {
        Self {
            operator,
            left,
            right: Some(right),
        }
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.right {
            Some(right) => write!(f, "{} {} {}", self.left, self.operator, right),
            None => write!(f, "{}{}", self.operator, self.left),
        }
    }
}

const BOOL_OPERANDS: [OperandKind; 2] = [OperandKind::Bool, OperandKind::PropertyRef];
const NUMBER_OPERANDS: [OperandKind; 2] = [OperandKind::Number, OperandKind::PropertyRef];

/// the operator dispatch table, built once per parser
pub struct OperatorTable {
    entries: HashMap<DispatchKey, Operation>,
    epsilon: f64,
}

impl fmt::Debug for OperatorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorTable")
            .field("entries", &self.entries.len())
            .field("epsilon", &self.epsilon)
            .finish()
    }
}

impl Default for OperatorTable {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}

impl OperatorTable {
    /// build the table with every built-in registration
    pub fn new(epsilon: f64) -> Self {
        let mut table = Self {
            entries: HashMap::new(),
            epsilon,
        };

        table.create_pointer_operators();
        table.create_bitwise_operators();
        table.create_boolean_operators();
        table.create_number_operators();
        table.create_enum_operators();

        table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &DispatchKey) -> bool {
        self.entries.contains_key(key)
    }

    /// registered keys, sorted by their display form
    pub fn keys(&self) -> Vec<DispatchKey> {
        let mut keys: Vec<DispatchKey> = self.entries.keys().copied().collect();
        keys.sort_by_key(|k| k.to_string());
        keys
    }

    /// register (or replace) a prefix operator entry
    pub fn map_unary<F>(&mut self, operator: Operator, operand: OperandKind, f: F)
    where
        F: Fn(&Value, &dyn EvalContext) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.entries.insert(
            DispatchKey::unary(operator, operand),
            Arc::new(move |a, _, ctx| f(a, ctx)),
        );
    }

    /// register (or replace) a binary operator entry
    pub fn map_binary<F>(&mut self, operator: Operator, left: OperandKind, right: OperandKind, f: F)
    where
        F: Fn(&Value, &Value, &dyn EvalContext) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        self.entries
            .insert(DispatchKey::binary(operator, left, right), Arc::new(f));
    }

    /// register one operation for every left/right combination of `operands`,
    /// optionally leaving out the property × property pair
    fn map_combinations(
        &mut self,
        operator: Operator,
        operands: [OperandKind; 2],
        include_property_pair: bool,
        f: Operation,
    ) {
        for left in operands {
            for right in operands {
                if !include_property_pair
                    && left == OperandKind::PropertyRef
                    && right == OperandKind::PropertyRef
                {
                    continue;
                }
                self.entries
                    .insert(DispatchKey::binary(operator, left, right), f.clone());
            }
        }
    }

    pub fn apply_unary(
        &self,
        operator: Operator,
        operand: &Value,
        ctx: &dyn EvalContext,
    ) -> Result<Value, EvalError> {
        let key = DispatchKey::unary(operator, operand.kind());
        match self.entries.get(&key) {
            Some(f) => f(operand, &Value::Null, ctx),
            None => Err(EvalError::UnsupportedOperands {
                operator,
                left: operand.kind(),
                right: None,
            }),
        }
    }

    pub fn apply_binary(
        &self,
        operator: Operator,
        left: &Value,
        right: &Value,
        ctx: &dyn EvalContext,
    ) -> Result<Value, EvalError> {
        let key = DispatchKey::binary(operator, left.kind(), right.kind());
        match self.entries.get(&key) {
            Some(f) => f(left, right, ctx),
            None => Err(EvalError::UnsupportedOperands {
                operator,
                left: left.kind(),
                right: Some(right.kind()),
            }),
        }
    }

    // ========================================================================
    // Registrations
    // ========================================================================

    fn create_pointer_operators(&mut self) {
        let epsilon = self.epsilon;
        use OperandKind::{Null, PropertyRef};

        for (operator, negate) in [(Operator::Equal, false), (Operator::NotEqual, true)] {
            self.map_binary(operator, PropertyRef, PropertyRef, move |a, b, ctx| {
                properties_equal(property_name(a)?, property_name(b)?, ctx, epsilon, negate)
            });
            self.map_binary(operator, PropertyRef, Null, move |a, _, ctx| {
                property_is_null(property_name(a)?, ctx, negate)
            });
            self.map_binary(operator, Null, PropertyRef, move |_, b, ctx| {
                property_is_null(property_name(b)?, ctx, negate)
            });
        }
    }

    fn create_bitwise_operators(&mut self) {
        use OperandKind::{EnumRef, PropertyRef};

        self.map_binary(Operator::BitwiseAnd, PropertyRef, EnumRef, |a, b, ctx| {
            flag_test(property_name(a)?, b, ctx)
        });
        self.map_binary(Operator::BitwiseAnd, EnumRef, PropertyRef, |a, b, ctx| {
            flag_test(property_name(b)?, a, ctx)
        });
    }

    fn create_boolean_operators(&mut self) {
        for operand in BOOL_OPERANDS {
            self.map_unary(Operator::Not, operand, |a, ctx| {
                Ok(Value::Bool(!resolve_bool(a, ctx)?))
            });
        }

        self.map_combinations(
            Operator::And,
            BOOL_OPERANDS,
            true,
            bool_operation(|a, b| a && b),
        );
        self.map_combinations(
            Operator::Or,
            BOOL_OPERANDS,
            true,
            bool_operation(|a, b| a || b),
        );
        // property == property is pointer equality, registered above
        self.map_combinations(
            Operator::Equal,
            BOOL_OPERANDS,
            false,
            bool_operation(|a, b| a == b),
        );
        self.map_combinations(
            Operator::NotEqual,
            BOOL_OPERANDS,
            false,
            bool_operation(|a, b| a != b),
        );
    }

    fn create_number_operators(&mut self) {
        let epsilon = self.epsilon;

        self.map_combinations(
            Operator::Equal,
            NUMBER_OPERANDS,
            false,
            compare_operation(move |a, b| nearly_equal(a, b, epsilon)),
        );
        self.map_combinations(
            Operator::NotEqual,
            NUMBER_OPERANDS,
            false,
            compare_operation(move |a, b| !nearly_equal(a, b, epsilon)),
        );

        let comparisons: [(Operator, fn(f64, f64) -> bool); 4] = [
            (Operator::Less, |a, b| a < b),
            (Operator::LessEqual, |a, b| a <= b),
            (Operator::Greater, |a, b| a > b),
            (Operator::GreaterEqual, |a, b| a >= b),
        ];
        for (operator, compare) in comparisons {
            self.map_combinations(operator, NUMBER_OPERANDS, true, compare_operation(compare));
        }

        let arithmetic: [(Operator, fn(f64, f64) -> f64); 4] = [
            (Operator::Add, |a, b| a + b),
            (Operator::Subtract, |a, b| a - b),
            (Operator::Multiply, |a, b| a * b),
            (Operator::Divide, |a, b| a / b),
        ];
        for (operator, apply) in arithmetic {
            self.map_combinations(operator, NUMBER_OPERANDS, true, arithmetic_operation(apply));
        }
    }

    fn create_enum_operators(&mut self) {
        use OperandKind::{EnumRef, PropertyRef};

        for (operator, negate) in [(Operator::Equal, false), (Operator::NotEqual, true)] {
            self.map_binary(operator, EnumRef, EnumRef, move |a, b, _| {
                Ok(Value::Bool((a == b) != negate))
            });
            self.map_binary(operator, PropertyRef, EnumRef, move |a, b, ctx| {
                enum_property_equals(b, property_name(a)?, ctx, negate)
            });
            self.map_binary(operator, EnumRef, PropertyRef, move |a, b, ctx| {
                enum_property_equals(a, property_name(b)?, ctx, negate)
            });
        }
    }
}

// ============================================================================
// Operand Resolution
// ============================================================================

/// resolve a bool literal or bool-valued property
pub fn resolve_bool(value: &Value, ctx: &dyn EvalContext) -> Result<bool, EvalError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Property(name) => ctx
            .bool_value(name)
            .ok_or_else(|| EvalError::invalid_operand(name)),
        _ => Err(EvalError::Malformed),
    }
}

/// resolve a numeric literal or numeric-valued property
pub fn resolve_number(value: &Value, ctx: &dyn EvalContext) -> Result<f64, EvalError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Property(name) => ctx
            .numeric_value(name)
            .ok_or_else(|| EvalError::invalid_operand(name)),
        _ => Err(EvalError::Malformed),
    }
}

fn property_name(value: &Value) -> Result<&str, EvalError> {
    value.as_property().ok_or(EvalError::Malformed)
}

/// `a == b` within `epsilon`; equal infinities compare equal, NaN never does
pub fn nearly_equal(a: f64, b: f64, epsilon: f64) -> bool {
    a == b || (a - b).abs() <= epsilon
}

fn bool_operation(apply: fn(bool, bool) -> bool) -> Operation {
    Arc::new(move |a, b, ctx| {
        let a = resolve_bool(a, ctx)?;
        let b = resolve_bool(b, ctx)?;
        Ok(Value::Bool(apply(a, b)))
    })
}

fn compare_operation<F>(compare: F) -> Operation
where
    F: Fn(f64, f64) -> bool + Send + Sync + 'static,
{
    Arc::new(move |a, b, ctx| {
        let a = resolve_number(a, ctx)?;
        let b = resolve_number(b, ctx)?;
        Ok(Value::Bool(compare(a, b)))
    })
}

fn arithmetic_operation(apply: fn(f64, f64) -> f64) -> Operation {
    Arc::new(move |a, b, ctx| {
        let a = resolve_number(a, ctx)?;
        let b = resolve_number(b, ctx)?;
        Ok(Value::Number(apply(a, b)))
    })
}

// ============================================================================
// Typed Operations
// ============================================================================

/// `Property == nullptr`, negated for `!=`
fn property_is_null(name: &str, ctx: &dyn EvalContext, negate: bool) -> Result<Value, EvalError> {
    if ctx.type_name(name).is_none() {
        return Err(EvalError::invalid_operand(name));
    }

    let ptr = ctx
        .pointer_value(name)
        .ok_or_else(|| EvalError::invalid_operand(name))?;

    Ok(Value::Bool(ptr.is_null() != negate))
}

/// `A == B` between two properties
///
/// identity when both resolve to object references. otherwise the nominal
/// types must match and the first of bool, numeric, enum equality that
/// resolves for both sides decides; a later kind overrides an earlier one.
fn properties_equal(
    a: &str,
    b: &str,
    ctx: &dyn EvalContext,
    epsilon: f64,
    negate: bool,
) -> Result<Value, EvalError> {
    if let (Some(ptr_a), Some(ptr_b)) = (ctx.pointer_value(a), ctx.pointer_value(b)) {
        return Ok(Value::Bool((ptr_a == ptr_b) != negate));
    }

    let type_a = ctx
        .type_name(a)
        .ok_or_else(|| EvalError::invalid_operand(a))?;
    let type_b = ctx
        .type_name(b)
        .ok_or_else(|| EvalError::invalid_operand(b))?;

    if type_a != type_b {
        return Err(EvalError::type_mismatch(a, b));
    }

    // TODO: require an exact kind match instead of letting enum override numeric
    let mut equal = None;

    if let (Some(x), Some(y)) = (ctx.bool_value(a), ctx.bool_value(b)) {
        equal = Some(x == y);
    }

    if let (Some(x), Some(y)) = (ctx.numeric_value(a), ctx.numeric_value(b)) {
        equal = Some(nearly_equal(x, y, epsilon));
    }

    if let (Some(x), Some(y)) = (ctx.enum_value(a), ctx.enum_value(b)) {
        equal = Some(x == y);
    }

    equal
        .map(|equal| Value::Bool(equal != negate))
        .ok_or_else(|| EvalError::type_mismatch(a, b))
}

/// `Property == Type::Member`, negated for `!=`
fn enum_property_equals(
    enum_value: &Value,
    name: &str,
    ctx: &dyn EvalContext,
    negate: bool,
) -> Result<Value, EvalError> {
    let Value::Enum { type_name, value } = enum_value else {
        return Err(EvalError::Malformed);
    };

    let property_type = ctx
        .type_name(name)
        .ok_or_else(|| EvalError::invalid_operand(name))?;

    if &property_type != type_name {
        return Err(EvalError::type_mismatch(name, enum_value.to_string()));
    }

    let current = ctx
        .enum_value(name)
        .ok_or_else(|| EvalError::invalid_operand(name))?;

    Ok(Value::Bool((&current == value) != negate))
}

/// `Property & Type::Member` is true when any flag bit is shared
fn flag_test(name: &str, enum_value: &Value, ctx: &dyn EvalContext) -> Result<Value, EvalError> {
    let Value::Enum { type_name, value } = enum_value else {
        return Err(EvalError::Malformed);
    };

    let flag = ctx
        .enum_integer_value(type_name, value)
        .ok_or_else(|| EvalError::InvalidEnumValue {
            type_name: type_name.clone(),
            value: value.clone(),
        })?;

    let current = ctx
        .integer_value(name)
        .ok_or_else(|| EvalError::invalid_operand(name))?;

    Ok(Value::Bool(current & flag != 0))
}
