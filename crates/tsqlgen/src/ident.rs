//! Safe SQL Server identifier handling.
//!
//! [`Ident`] represents a validated table or column name. Names are
//! validated against `[A-Za-z][A-Za-z0-9_]*` and always render in bracket
//! quotes: `[Client]`, `[CreatedByUserId]`.
//!
//! # Example
//! ```ignore
//! use tsqlgen::Ident;
//!
//! let table = Ident::new("Client_User")?;
//! assert_eq!(table.to_string(), "[Client_User]");
//! # Ok::<(), tsqlgen::BuildError>(())
//! ```

use std::fmt;

use crate::error::{BuildError, BuildResult};

/// A validated SQL Server identifier (table or column name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    /// Validate and wrap an identifier.
    ///
    /// The name must start with an ASCII letter and continue with ASCII
    /// letters, digits, or underscores; anything else is an argument error.
    pub fn new(name: &str) -> BuildResult<Self> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };

        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(BuildError::argument(format!(
                "the identifier '{name}' is not valid"
            )))
        }
    }

    /// The raw, unbracketed name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Bracket a raw name without validating it.
///
/// Reserved statement-internal column names (the correlation-index and
/// split markers) contain characters a real identifier never may; bracket
/// quoting keeps them unambiguous inside statement text.
pub(crate) fn bracket(raw: &str) -> String {
    format!("[{raw}]")
}
