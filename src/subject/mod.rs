//! in-memory subjects for evaluating edit conditions
//!
//! a subject is a schema (field name -> type), an enum registry and one or
//! more instances. several instances model a multi-selection: a getter only
//! yields a value when every instance agrees on it.

mod context;

pub use context::SubjectContext;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::conditions::ObjectRef;

/// first id handed out to object references given as strings
///
/// integer identities in subject files stay below this.
pub const INTERNED_OBJECT_BASE: u64 = 1 << 48;

const INTEGER_TYPES: [&str; 9] = [
    "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64", "int",
];
const FLOAT_TYPES: [&str; 2] = ["float", "double"];

/// declared type of a subject field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    /// integer type, e.g. `int32`
    Integer(String),
    /// floating type, `float` or `double`
    Float(String),
    /// enum type name
    Enum(String),
    /// object reference type, e.g. `AActor*`
    Object(String),
}

impl FieldType {
    /// resolve a type name against the known enums
    pub fn resolve(type_name: &str, enums: &EnumRegistry) -> Option<FieldType> {
        if type_name == "bool" {
            return Some(FieldType::Bool);
        }
        if INTEGER_TYPES.contains(&type_name) {
            return Some(FieldType::Integer(type_name.to_string()));
        }
        if FLOAT_TYPES.contains(&type_name) {
            return Some(FieldType::Float(type_name.to_string()));
        }
        if enums.contains(type_name) {
            return Some(FieldType::Enum(type_name.to_string()));
        }
        if type_name.len() > 1 && type_name.ends_with('*') {
            return Some(FieldType::Object(type_name.to_string()));
        }
        None
    }

    pub fn type_name(&self) -> &str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Integer(name)
            | FieldType::Float(name)
            | FieldType::Enum(name)
            | FieldType::Object(name) => name,
        }
    }
}

/// value of a field on one instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    /// underlying integer of the current member
    Enum(i64),
    Object(ObjectRef),
}

/// enum type -> members with their underlying integers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumRegistry {
    enums: BTreeMap<String, Vec<(String, i64)>>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// register (or replace) an enum; members keep the given order
    pub fn register<I, K>(&mut self, name: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        let members = members.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.enums.insert(name.into(), members);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.enums.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.enums.keys().map(String::as_str)
    }

    pub fn members(&self, name: &str) -> Option<&[(String, i64)]> {
        self.enums.get(name).map(Vec::as_slice)
    }

    /// underlying integer of `enum_type::member`
    pub fn value_of(&self, enum_type: &str, member: &str) -> Option<i64> {
        self.members(enum_type)?
            .iter()
            .find(|(name, _)| name == member)
            .map(|(_, value)| *value)
    }

    /// first member of `enum_type` whose underlying integer is `value`
    pub fn name_of(&self, enum_type: &str, value: i64) -> Option<&str> {
        self.members(enum_type)?
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(name, _)| name.as_str())
    }
}

/// a schema plus the instances conditions are evaluated against
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subject {
    name: String,
    enums: EnumRegistry,
    fields: BTreeMap<String, FieldType>,
    instances: Vec<HashMap<String, FieldValue>>,
}

impl Subject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_enum<I, K>(mut self, name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        self.enums.register(name, members);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    pub fn with_instance<I, K>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        self.push_instance(values);
        self
    }

    pub fn push_instance<I, K>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        let instance = values.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.instances.push(instance);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn enums(&self) -> &EnumRegistry {
        &self.enums
    }

    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    /// declared field names, sorted
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// value of `field` on each instance, `None` where an instance lacks it
    pub(crate) fn values<'a>(
        &'a self,
        field: &'a str,
    ) -> impl Iterator<Item = Option<&'a FieldValue>> + 'a {
        self.instances.iter().map(move |instance| instance.get(field))
    }

    /// load a subject file; `.json5` files are read as JSON5, anything else as JSON
    pub fn load(path: &Path) -> Result<Subject> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subject file: {}", path.display()))?;

        let is_json5 = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json5"));

        let file: SubjectFile = if is_json5 {
            json5::from_str(&content)
                .with_context(|| format!("Failed to parse subject file: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse subject file: {}", path.display()))?
        };

        file.into_subject()
            .with_context(|| format!("Invalid subject file: {}", path.display()))
    }

    pub fn from_json_str(content: &str) -> Result<Subject> {
        let file: SubjectFile = serde_json::from_str(content).context("Failed to parse subject")?;
        file.into_subject()
    }

    pub fn from_json5_str(content: &str) -> Result<Subject> {
        let file: SubjectFile = json5::from_str(content).context("Failed to parse subject")?;
        file.into_subject()
    }
}

// ============================================================================
// File Format
// ============================================================================

#[derive(Debug, Deserialize)]
struct SubjectFile {
    name: String,
    #[serde(default)]
    enums: BTreeMap<String, BTreeMap<String, serde_json::Number>>,
    #[serde(default)]
    fields: BTreeMap<String, String>,
    #[serde(default)]
    instances: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl SubjectFile {
    fn into_subject(self) -> Result<Subject> {
        let mut subject = Subject::new(self.name);

        for (name, raw_members) in self.enums {
            let mut members = Vec::with_capacity(raw_members.len());
            for (member, value) in raw_members {
                let value = json_integer(&value).ok_or_else(|| {
                    anyhow!("enum '{}' member '{}' is not an integer: {}", name, member, value)
                })?;
                members.push((member, value));
            }
            members.sort_by_key(|(_, value)| *value);
            subject.enums.register(name, members);
        }

        for (name, type_name) in self.fields {
            let field_type = FieldType::resolve(&type_name, &subject.enums).ok_or_else(|| {
                anyhow!(
                    "field '{}' has unknown type '{}'. Use bool, int8..int64, uint8..uint64, float, double, a declared enum, or a pointer type ending in '*'",
                    name,
                    type_name
                )
            })?;
            subject.fields.insert(name, field_type);
        }

        let mut interner = ObjectInterner::default();
        for (i, raw) in self.instances.into_iter().enumerate() {
            let mut instance = HashMap::new();
            for (field, value) in raw {
                let field_type = subject
                    .fields
                    .get(&field)
                    .ok_or_else(|| anyhow!("instances[{}]: undeclared field '{}'", i, field))?;
                let value = convert_value(field_type, &value, &subject.enums, &mut interner)
                    .with_context(|| format!("instances[{}].{}", i, field))?;
                instance.insert(field, value);
            }
            subject.instances.push(instance);
        }

        Ok(subject)
    }
}

/// hands out stable ids for object references written as strings
#[derive(Debug, Default)]
struct ObjectInterner {
    ids: HashMap<String, u64>,
}

impl ObjectInterner {
    fn intern(&mut self, identity: &str) -> u64 {
        let next = INTERNED_OBJECT_BASE + self.ids.len() as u64;
        *self.ids.entry(identity.to_string()).or_insert(next)
    }
}

fn convert_value(
    field_type: &FieldType,
    value: &serde_json::Value,
    enums: &EnumRegistry,
    interner: &mut ObjectInterner,
) -> Result<FieldValue> {
    use serde_json::Value as Json;

    match (field_type, value) {
        (FieldType::Bool, Json::Bool(b)) => Ok(FieldValue::Bool(*b)),
        (FieldType::Integer(_), Json::Number(n)) => json_integer(n)
            .map(FieldValue::Integer)
            .ok_or_else(|| anyhow!("expected an integer, got {}", n)),
        (FieldType::Float(_), Json::Number(n)) => n
            .as_f64()
            .map(FieldValue::Float)
            .ok_or_else(|| anyhow!("expected a number, got {}", n)),
        (FieldType::Enum(enum_type), Json::String(member)) => enums
            .value_of(enum_type, member)
            .map(FieldValue::Enum)
            .ok_or_else(|| anyhow!("'{}' is not a member of enum '{}'", member, enum_type)),
        (FieldType::Enum(_), Json::Number(n)) => json_integer(n)
            .map(FieldValue::Enum)
            .ok_or_else(|| anyhow!("expected an enum member or integer, got {}", n)),
        (FieldType::Object(_), Json::Null) => Ok(FieldValue::Object(ObjectRef::Null)),
        (FieldType::Object(_), Json::Number(n)) => match json_integer(n) {
            Some(0) => Ok(FieldValue::Object(ObjectRef::Null)),
            Some(id) if id > 0 && (id as u64) < INTERNED_OBJECT_BASE => {
                Ok(FieldValue::Object(ObjectRef::Object(id as u64)))
            }
            _ => bail!("object id {} out of range", n),
        },
        (FieldType::Object(_), Json::String(identity)) => {
            Ok(FieldValue::Object(ObjectRef::Object(interner.intern(identity))))
        }
        (field_type, value) => bail!(
            "value {} does not match field type '{}'",
            value,
            field_type.type_name()
        ),
    }
}

/// integer value of a JSON number; JSON5 may hand integers over as floats
fn json_integer(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}
