//! Error types.
//!
//! Failure classes are disjoint by contract: configuration errors are fatal
//! programming mistakes surfaced at first use of a type; mapping errors mean
//! a result row did not line up with the model; execution errors wrap a
//! collaborator failure together with the statement that provoked it; hook
//! errors carry a lifecycle hook's own failure unchanged.

use crate::value::Value;
use std::error::Error;
use std::fmt;

/// Boxed error produced by a statement-execution collaborator.
pub type DriverError = Box<dyn Error + Send + Sync>;

/// The crate's error type.
#[derive(Debug)]
pub enum OrmError {
    /// Invalid entity declaration or statement construction. Fatal; retrying
    /// the same call cannot succeed.
    Configuration(String),
    /// A result row could not be mapped into the model.
    Mapping(String),
    /// The collaborator failed to prepare or run a statement. Carries the
    /// statement text and bound parameters for diagnosis.
    Execution {
        sql: String,
        params: Vec<Value>,
        source: DriverError,
    },
    /// A lifecycle hook failed; the statement was never sent.
    Hook(DriverError),
}

impl OrmError {
    pub(crate) fn execution(sql: &str, params: &[Value], source: DriverError) -> Self {
        OrmError::Execution {
            sql: sql.to_string(),
            params: params.to_vec(),
            source,
        }
    }
}

impl fmt::Display for OrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrmError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            OrmError::Mapping(msg) => write!(f, "mapping error: {msg}"),
            OrmError::Execution {
                sql,
                params,
                source,
            } => {
                write!(
                    f,
                    "execution error: {source} (sql: {sql}; params: {params:?})"
                )
            }
            OrmError::Hook(source) => write!(f, "lifecycle hook failed: {source}"),
        }
    }
}

impl Error for OrmError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OrmError::Execution { source, .. } | OrmError::Hook(source) => {
                Some(source.as_ref() as &(dyn Error + 'static))
            }
            _ => None,
        }
    }
}
