//! evaluation context over a [`Subject`]

use crate::conditions::{nearly_equal, ErrorReporter, EvalContext, ObjectRef, DEFAULT_EPSILON};

use super::{FieldType, FieldValue, Subject};

/// resolves field names against every instance of a subject
///
/// a getter yields a value only when the field exists with the requested kind
/// on every instance and all instances agree. numeric values agree when they
/// are within `epsilon` of the first instance's value.
#[derive(Debug, Clone, Copy)]
pub struct SubjectContext<'a> {
    subject: &'a Subject,
    epsilon: f64,
    reporter: Option<&'a ErrorReporter>,
}

impl<'a> SubjectContext<'a> {
    pub fn new(subject: &'a Subject) -> Self {
        Self {
            subject,
            epsilon: DEFAULT_EPSILON,
            reporter: None,
        }
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// report lookups of undeclared fields through `reporter`
    pub fn with_reporter(mut self, reporter: &'a ErrorReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn subject(&self) -> &'a Subject {
        self.subject
    }

    fn field(&self, name: &str) -> Option<&'a FieldType> {
        let field = self.subject.field_type(name);
        if field.is_none() {
            if let Some(reporter) = self.reporter {
                reporter.report(
                    Some(self.subject.name()),
                    &format!(
                        "field \"{}\" was not found in \"{}\"",
                        name,
                        self.subject.name()
                    ),
                );
            }
        }
        field
    }

    /// value shared by every instance, or `None`
    fn agreed<T, E, S>(&self, name: &str, extract: E, same: S) -> Option<T>
    where
        E: Fn(&FieldValue) -> Option<T>,
        S: Fn(&T, &T) -> bool,
    {
        let mut agreed: Option<T> = None;

        for value in self.subject.values(name) {
            let value = extract(value?)?;
            match &agreed {
                Some(first) if !same(first, &value) => {
                    tracing::trace!(
                        "instances of {} disagree on {}",
                        self.subject.name(),
                        name
                    );
                    return None;
                }
                Some(_) => {}
                None => agreed = Some(value),
            }
        }

        agreed
    }
}

impl EvalContext for SubjectContext<'_> {
    fn context_name(&self) -> String {
        self.subject.name().to_string()
    }

    fn bool_value(&self, name: &str) -> Option<bool> {
        match self.field(name)? {
            FieldType::Bool => self.agreed(
                name,
                |v| match v {
                    FieldValue::Bool(b) => Some(*b),
                    _ => None,
                },
                |a, b| a == b,
            ),
            _ => None,
        }
    }

    fn integer_value(&self, name: &str) -> Option<i64> {
        match self.field(name)? {
            FieldType::Integer(_) | FieldType::Enum(_) => self.agreed(
                name,
                |v| match v {
                    FieldValue::Integer(i) | FieldValue::Enum(i) => Some(*i),
                    _ => None,
                },
                |a, b| a == b,
            ),
            _ => None,
        }
    }

    fn numeric_value(&self, name: &str) -> Option<f64> {
        let epsilon = self.epsilon;
        match self.field(name)? {
            FieldType::Integer(_) | FieldType::Float(_) => self.agreed(
                name,
                |v| match v {
                    FieldValue::Integer(i) => Some(*i as f64),
                    FieldValue::Float(f) => Some(*f),
                    _ => None,
                },
                |a, b| nearly_equal(*a, *b, epsilon),
            ),
            _ => None,
        }
    }

    fn enum_value(&self, name: &str) -> Option<String> {
        let FieldType::Enum(enum_type) = self.field(name)? else {
            return None;
        };

        let value = self.agreed(
            name,
            |v| match v {
                FieldValue::Enum(i) => Some(*i),
                _ => None,
            },
            |a, b| a == b,
        )?;

        self.subject
            .enums()
            .name_of(enum_type, value)
            .map(str::to_string)
    }

    fn pointer_value(&self, name: &str) -> Option<ObjectRef> {
        match self.field(name)? {
            FieldType::Object(_) => self.agreed(
                name,
                |v| match v {
                    FieldValue::Object(ptr) => Some(*ptr),
                    _ => None,
                },
                |a, b| a == b,
            ),
            _ => None,
        }
    }

    fn type_name(&self, name: &str) -> Option<String> {
        self.field(name).map(|t| t.type_name().to_string())
    }

    fn enum_integer_value(&self, enum_type: &str, member: &str) -> Option<i64> {
        self.subject.enums().value_of(enum_type, member)
    }
}
