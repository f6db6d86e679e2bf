//! core types for the edit condition engine

use std::fmt;

/// operators and grouping symbols recognised by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// ==
    Equal,
    /// !=
    NotEqual,
    /// <
    Less,
    /// <=
    LessEqual,
    /// >
    Greater,
    /// >=
    GreaterEqual,
    /// ! (prefix)
    Not,
    /// &&
    And,
    /// ||
    Or,
    /// +
    Add,
    /// -
    Subtract,
    /// *
    Multiply,
    /// /
    Divide,
    /// & (flag test)
    BitwiseAnd,
    /// (
    GroupStart,
    /// )
    GroupEnd,
}

impl Operator {
    /// symbols in longest-match priority order
    pub const SYMBOLS: [(&'static str, Operator); 16] = [
        ("==", Operator::Equal),
        ("!=", Operator::NotEqual),
        ("<=", Operator::LessEqual),
        ("<", Operator::Less),
        (">=", Operator::GreaterEqual),
        (">", Operator::Greater),
        ("!", Operator::Not),
        ("&&", Operator::And),
        ("||", Operator::Or),
        ("+", Operator::Add),
        ("-", Operator::Subtract),
        ("*", Operator::Multiply),
        ("/", Operator::Divide),
        ("&", Operator::BitwiseAnd),
        ("(", Operator::GroupStart),
        (")", Operator::GroupEnd),
    ];

    /// parse an operator from its exact symbol
    pub fn parse(s: &str) -> Option<Self> {
        Self::SYMBOLS
            .iter()
            .find(|(symbol, _)| *symbol == s)
            .map(|(_, op)| *op)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Not => "!",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::BitwiseAnd => "&",
            Operator::GroupStart => "(",
            Operator::GroupEnd => ")",
        }
    }

    /// binding tier of a binary operator, 1 binds tightest
    ///
    /// returns `None` for the prefix `!` and for grouping symbols
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            Operator::Multiply | Operator::Divide => Some(1),
            Operator::BitwiseAnd | Operator::Add | Operator::Subtract => Some(2),
            Operator::Equal
            | Operator::NotEqual
            | Operator::Less
            | Operator::LessEqual
            | Operator::Greater
            | Operator::GreaterEqual => Some(3),
            Operator::And | Operator::Or => Some(4),
            Operator::Not | Operator::GroupStart | Operator::GroupEnd => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.binary_precedence().is_some()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// a single lexed token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Operator(Operator),
    /// `true` / `false` (case-insensitive)
    Bool(bool),
    /// integer or floating literal, always held as f64
    Number(f64),
    /// `nullptr`
    Null,
    /// a field of the subject, resolved at evaluation time
    Property(String),
    /// `Type::Member`
    Enum { type_name: String, value: String },
}

impl Token {
    pub fn is_operand(&self) -> bool {
        !matches!(self, Token::Operator(_))
    }

    pub fn as_operator(&self) -> Option<Operator> {
        match self {
            Token::Operator(op) => Some(*op),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Operator(op) => write!(f, "{}", op),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Number(n) => write!(f, "{}", n),
            Token::Null => write!(f, "nullptr"),
            Token::Property(name) => write!(f, "{}", name),
            Token::Enum { type_name, value } => write!(f, "{}::{}", type_name, value),
        }
    }
}

/// a token together with its byte offset in the source string
#[derive(Debug, Clone, PartialEq)]
pub struct LexedToken {
    pub token: Token,
    pub position: usize,
}

impl LexedToken {
    pub fn new(token: Token, position: usize) -> Self {
        Self { token, position }
    }
}

/// role of a token in the compiled (postfix) sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompiledTokenKind {
    Operand,
    PreUnary,
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledToken {
    pub kind: CompiledTokenKind,
    pub token: Token,
    pub position: usize,
}

/// precedence-resolved token sequence in postfix order
///
/// immutable once built; share it freely between evaluations and threads.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    tokens: Vec<CompiledToken>,
}

impl CompiledExpression {
    pub(crate) fn new(source: impl Into<String>, tokens: Vec<CompiledToken>) -> Self {
        Self {
            source: source.into(),
            tokens,
        }
    }

    pub(crate) fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[CompiledToken] {
        &self.tokens
    }

    /// property names referenced by the expression, in postfix order
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match &t.token {
            Token::Property(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// name of the only property in the expression, if it is a bool field
    ///
    /// hosts use this to offer an inline toggle for simple conditions such
    /// as `bEnabled` or `bEnabled == false`.
    pub fn single_bool_property(
        &self,
        ctx: &dyn super::context::EvalContext,
    ) -> Option<&str> {
        let mut names = self.property_names();
        let name = names.next()?;
        if names.next().is_some() {
            return None;
        }

        match ctx.type_name(name) {
            Some(type_name) if type_name == "bool" => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", t.token)?;
        }
        Ok(())
    }
}

/// discriminant used to select dispatch entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Bool,
    Number,
    PropertyRef,
    EnumRef,
    Null,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandKind::Bool => "bool",
            OperandKind::Number => "number",
            OperandKind::PropertyRef => "property",
            OperandKind::EnumRef => "enum",
            OperandKind::Null => "nullptr",
        };
        write!(f, "{}", name)
    }
}

/// opaque object identity returned by pointer-valued fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectRef {
    Null,
    Object(u64),
}

impl ObjectRef {
    pub fn is_null(&self) -> bool {
        matches!(self, ObjectRef::Null)
    }
}

/// an intermediate value on the evaluator stack
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    Property(String),
    Enum { type_name: String, value: String },
    Null,
}

impl Value {
    pub fn kind(&self) -> OperandKind {
        match self {
            Value::Bool(_) => OperandKind::Bool,
            Value::Number(_) => OperandKind::Number,
            Value::Property(_) => OperandKind::PropertyRef,
            Value::Enum { .. } => OperandKind::EnumRef,
            Value::Null => OperandKind::Null,
        }
    }

    /// convert an operand token into a stack value
    pub fn from_operand(token: &Token) -> Option<Self> {
        match token {
            Token::Bool(b) => Some(Value::Bool(*b)),
            Token::Number(n) => Some(Value::Number(*n)),
            Token::Null => Some(Value::Null),
            Token::Property(name) => Some(Value::Property(name.clone())),
            Token::Enum { type_name, value } => Some(Value::Enum {
                type_name: type_name.clone(),
                value: value.clone(),
            }),
            Token::Operator(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&str> {
        match self {
            Value::Property(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Property(name) => write!(f, "{}", name),
            Value::Enum { type_name, value } => write!(f, "{}::{}", type_name, value),
            Value::Null => write!(f, "nullptr"),
        }
    }
}
