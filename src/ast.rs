//! Expression model for fluent call chains.
//!
//! The engine is purely structural: it only needs to see member accesses,
//! invocations, indexers and (for a few rules) lambdas. Everything else an
//! argument may contain is carried verbatim as [`Expr::Raw`] so rewritten
//! output reuses the original sub-expression text unchanged.

use std::fmt;

/// An owned expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A bare identifier, e.g. `actual`.
    Ident(String),
    /// A literal token, e.g. `42` or `"text"`, carried verbatim.
    Literal(String),
    /// Member access: `receiver.name`.
    Member { receiver: Box<Expr>, name: String },
    /// Invocation: `callee(arguments)`. The callee is usually a member access.
    Invoke {
        callee: Box<Expr>,
        arguments: Vec<Argument>,
    },
    /// Indexer access: `receiver[arguments]`.
    Index {
        receiver: Box<Expr>,
        arguments: Vec<Argument>,
    },
    /// Lambda: `parameter => body`.
    Lambda { parameter: String, body: Box<Expr> },
    /// Any other sub-expression, carried verbatim.
    Raw(String),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Expr::Raw(text.into())
    }

    pub fn member(receiver: Expr, name: impl Into<String>) -> Self {
        Expr::Member {
            receiver: Box::new(receiver),
            name: name.into(),
        }
    }

    pub fn invoke(callee: Expr, arguments: Vec<Argument>) -> Self {
        Expr::Invoke {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn index(receiver: Expr, arguments: Vec<Argument>) -> Self {
        Expr::Index {
            receiver: Box::new(receiver),
            arguments,
        }
    }

    pub fn lambda(parameter: impl Into<String>, body: Expr) -> Self {
        Expr::Lambda {
            parameter: parameter.into(),
            body: Box::new(body),
        }
    }

    /// Returns the identifier name if this expression is a bare identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_lambda(&self) -> bool {
        matches!(self, Expr::Lambda { .. })
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => f.write_str(name),
            Expr::Literal(text) | Expr::Raw(text) => f.write_str(text),
            Expr::Member { receiver, name } => write!(f, "{receiver}.{name}"),
            Expr::Invoke { callee, arguments } => {
                write!(f, "{callee}(")?;
                write_arguments(f, arguments)?;
                f.write_str(")")
            }
            Expr::Index {
                receiver,
                arguments,
            } => {
                write!(f, "{receiver}[")?;
                write_arguments(f, arguments)?;
                f.write_str("]")
            }
            Expr::Lambda { parameter, body } => write!(f, "{parameter} => {body}"),
        }
    }
}

fn write_arguments(f: &mut fmt::Formatter<'_>, arguments: &[Argument]) -> fmt::Result {
    for (i, argument) in arguments.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{argument}")?;
    }
    Ok(())
}

/// One invocation or indexer argument: an optional label plus an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub label: Option<String>,
    pub value: Expr,
}

impl Argument {
    /// A positional (unlabeled) argument.
    pub fn positional(value: Expr) -> Self {
        Self { label: None, value }
    }

    /// A labeled argument, rendered as `label: value`.
    pub fn labeled(label: impl Into<String>, value: Expr) -> Self {
        Self {
            label: Some(label.into()),
            value,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label}: {}", self.value),
            None => write!(f, "{}", self.value),
        }
    }
}
