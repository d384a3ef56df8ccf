use std::fmt;

use crate::parser::token::{escape, format_double};

/// One parsed statement or value. Nodes own their children exclusively.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A lone `;`
    Empty,
    /// define x;
    VarDeclaration(Variable),
    /// define x = value;
    VarDefinition(Variable),
    /// new x: value;
    VarAllocation(Variable),
    /// define x := value;
    VarReference(Variable),
    /// { statements }
    Block(Block),
    /// 5, 2.5, 'c', "text", undefined, nan, null
    Literal(Value),
    /// A bare name used as a value
    Lvalue(String),
    /// {1, 2} or (1, 2)
    Set(Set),
}

/// Fields shared by every variable statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// `new` (allocated at run time) rather than `define`.
    pub is_runtime: bool,
    pub is_declaration_only: bool,
    pub value: Option<Box<Node>>,
}

impl Variable {
    pub fn declaration(name: impl Into<String>, is_runtime: bool) -> Self {
        Self {
            name: name.into(),
            is_runtime,
            is_declaration_only: true,
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, is_runtime: bool, value: Option<Node>) -> Self {
        Self {
            name: name.into(),
            is_runtime,
            is_declaration_only: true,
            value: value.map(Box::new),
        }
    }

    pub fn specifier(&self) -> &'static str {
        if self.is_runtime { "new" } else { "define" }
    }
}

/// Statements in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub statements: Vec<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    /// Braced: `{1, 2}`
    Literal,
    /// Parenthesized: `(1, 2)`
    Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    pub kind: SetKind,
    pub elements: Vec<Value>,
}

impl Set {
    pub fn is_literal(&self) -> bool {
        self.kind == SetKind::Literal
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Double(f64),
    Char(char),
    String(String),
    Undefined,
    Nan,
    Null,
}

impl Node {
    /// Variable fields of the four variable statements.
    pub fn variable(&self) -> Option<&Variable> {
        match self {
            Node::VarDeclaration(variable)
            | Node::VarDefinition(variable)
            | Node::VarAllocation(variable)
            | Node::VarReference(variable) => Some(variable),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Empty => "Empty",
            Node::VarDeclaration(_) => "VarDeclaration",
            Node::VarDefinition(_) => "VarDefinition",
            Node::VarAllocation(_) => "VarAllocation",
            Node::VarReference(_) => "VarReference",
            Node::Block(_) => "Block",
            Node::Literal(_) => "Literal",
            Node::Lvalue(_) => "Lvalue",
            Node::Set(_) => "Set",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Double(value) => f.write_str(&format_double(*value)),
            Value::Char(value) => write!(f, "'{}'", escape(&value.to_string())),
            Value::String(value) => write!(f, "\"{}\"", escape(value)),
            Value::Undefined => f.write_str("undefined"),
            Value::Nan => f.write_str("nan"),
            Value::Null => f.write_str("null"),
        }
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.kind {
            SetKind::Literal => ('{', '}'),
            SetKind::Value => ('(', ')'),
        };
        let elements: Vec<String> = self.elements.iter().map(Value::to_string).collect();
        write!(f, "{open}{}{close}", elements.join(", "))
    }
}
