//! evaluation context - the host side of the engine
//!
//! a context is bound to one subject: a live object, or a set of
//! identically-shaped objects under multi-selection. the engine queries it
//! afresh on every evaluation and keeps no state of its own.

use super::types::ObjectRef;

/// resolves field names of the current subject to typed values
///
/// every getter returns `None` ("unset") when the name does not resolve to a
/// field of the requested kind, or when the subject holds several instances
/// whose values for the field disagree. never pick one instance's value.
pub trait EvalContext {
    /// identifier of the subject, used only in diagnostics
    fn context_name(&self) -> String;

    fn bool_value(&self, name: &str) -> Option<bool>;

    /// integer fields, and the underlying integer of enum fields
    fn integer_value(&self, name: &str) -> Option<i64>;

    /// integer and floating fields promoted to f64
    fn numeric_value(&self, name: &str) -> Option<f64>;

    /// symbolic name of the current member of an enum field
    fn enum_value(&self, name: &str) -> Option<String>;

    /// identity of an object-reference field, possibly null
    fn pointer_value(&self, name: &str) -> Option<ObjectRef>;

    /// nominal type of the field; enum fields report their enum type name
    fn type_name(&self, name: &str) -> Option<String>;

    /// underlying integer of `EnumType::Member`
    fn enum_integer_value(&self, enum_type: &str, member: &str) -> Option<i64>;
}
