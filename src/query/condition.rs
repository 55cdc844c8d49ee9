//! Predicates for WHERE clauses.
//!
//! A [`Condition`] is either a `(column, operator, value)` predicate or a raw
//! SQL fragment carrying its own parameters. Builders compose conditions by
//! implicit conjunction (`AND`).

use crate::query::builder::quote_ident;
use crate::value::Value;

/// Comparison operator of a simple predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl Op {
    #[must_use]
    pub fn sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "<>",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Like => "LIKE",
        }
    }
}

/// One WHERE predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `"column" OP $n`
    Binary {
        column: String,
        op: Op,
        value: Value,
    },
    /// A raw SQL fragment. Write parameters as `?`; they are rewritten to
    /// positional placeholders in appearance order when the statement is
    /// built. The fragment must carry exactly one value per `?`.
    Raw {
        fragment: String,
        params: Vec<Value>,
    },
}

impl Condition {
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Op::Eq, value)
    }

    #[must_use]
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Op::Ne, value)
    }

    #[must_use]
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Op::Lt, value)
    }

    #[must_use]
    pub fn le(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Op::Le, value)
    }

    #[must_use]
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Op::Gt, value)
    }

    #[must_use]
    pub fn ge(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Op::Ge, value)
    }

    #[must_use]
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::binary(column, Op::Like, pattern.into())
    }

    #[must_use]
    pub fn binary(column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Condition::Binary {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn raw(fragment: impl Into<String>, params: Vec<Value>) -> Self {
        Condition::Raw {
            fragment: fragment.into(),
            params,
        }
    }

    /// Append this predicate's SQL to `sql`, pushing its values onto `params`
    /// so placeholder numbering stays aligned with parameter order.
    pub(crate) fn append_to(&self, sql: &mut String, params: &mut Vec<Value>) {
        match self {
            Condition::Binary { column, op, value } => {
                sql.push_str(&quote_ident(column));
                sql.push(' ');
                sql.push_str(op.sql());
                params.push(value.clone());
                sql.push_str(&format!(" ${}", params.len()));
            }
            Condition::Raw {
                fragment,
                params: own,
            } => {
                debug_assert_eq!(
                    fragment.matches('?').count(),
                    own.len(),
                    "raw fragment must carry one value per `?`"
                );
                let mut own = own.iter();
                for ch in fragment.chars() {
                    if ch == '?' {
                        if let Some(value) = own.next() {
                            params.push(value.clone());
                            sql.push_str(&format!("${}", params.len()));
                        }
                    } else {
                        sql.push(ch);
                    }
                }
            }
        }
    }
}
