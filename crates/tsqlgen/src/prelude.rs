//! Convenient imports for typical `tsqlgen` usage.
//!
//! This module is intentionally small and focused on the most common APIs so
//! callers can start with:
//!
//! ```ignore
//! use tsqlgen::prelude::*;
//! ```

pub use crate::{BuildError, BuildResult, col};

pub use crate::{ColumnBehavior, Facet, MemberId, Record, SqlOperation, TableDescriptorBuilder};

pub use crate::{BatchFormat, MergeDefinition, PredicateBuilder, UpdateBuilder, qb};

pub use crate::{Scalar, ScalarKind, ScalarValue};
