//! # tsqlgen
//!
//! Declarative table metadata and T-SQL statement synthesis for SQL Server.
//!
//! ## Features
//!
//! - **Metadata first**: records describe their columns once — behavior
//!   flags, per-operation applicability, length/precision — and every
//!   statement is derived from that
//! - **Statement text out**: select / insert / update / delete and
//!   multi-action MERGE, with named `@ColumnName` parameters
//! - **No execution**: a database driver is an external collaborator; this
//!   crate never opens a connection
//! - **Generated values round-trip**: inserts and merges that touch
//!   store-assigned columns declare a table variable, capture OUTPUT into
//!   it, and end with `select * from @var` — one round trip writes and reads
//! - **Batch merges**: a whole batch travels through one `@serialized`
//!   parameter (JSON or XML), and a correlation index traces every output
//!   row back to its input record
//!
//! ## Example
//!
//! ```ignore
//! use tsqlgen::{col, qb, MemberId, Record, TableDescriptorBuilder};
//!
//! let descriptor = std::sync::Arc::new(
//!     TableDescriptorBuilder::<Client>::new()?
//!         .map(col(MemberId::new("Client", "Id"), |c: &Client| c.id).key(true)?)?
//!         .auto_map()?
//!         .finish()?,
//! );
//!
//! let sql = qb::select_by_key(&descriptor);
//! assert!(sql.ends_with("where [Id] = @Id"));
//! # Ok::<(), tsqlgen::BuildError>(())
//! ```

pub mod column;
pub mod error;
pub mod ident;
pub mod merge_serializer;
pub mod predicate;
pub mod prelude;
pub mod qb;
pub mod registry;
pub mod scalar;
pub mod table;

pub use column::{ColumnBehavior, ColumnDef, ColumnDescriptor, MemberId, SqlOperation, ValuedColumn, col};
pub use error::{BuildError, BuildResult};
pub use ident::Ident;
pub use merge_serializer::{AliasTable, JsonMergeSerializer, MergeSerializer, XmlMergeSerializer};
pub use predicate::{PredicateBuilder, UpdateBuilder, ValuedPredicateBuilder};
pub use qb::{BatchFormat, CorrelationRecord, MergeAction, MergeDefinition, MergeStatement};
pub use registry::{DescriptorRegistration, descriptor};
pub use scalar::{Scalar, ScalarKind, ScalarValue};
pub use table::{Facet, Record, TableDescriptor, TableDescriptorBuilder};

// Re-export inventory for use by the register_descriptor! macro
pub use inventory;
