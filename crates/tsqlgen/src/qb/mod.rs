//! Statement synthesis: stateless formatters that turn table descriptors and
//! filter/assignment builders into T-SQL text.
//!
//! Statements use named parameters (`@ColumnName`); nothing here touches a
//! database. Callers hand the text and the parameter contract to whatever
//! driver executes it.
//!
//! # Example
//! ```ignore
//! use tsqlgen::{qb, PredicateBuilder, UpdateBuilder};
//!
//! // SELECT
//! let sql = qb::select_by_key(&descriptor);
//!
//! // INSERT (declares and returns generated values when the table has any)
//! let sql = qb::insert(&descriptor);
//!
//! // UPDATE
//! let sql = qb::update(
//!     &UpdateBuilder::for_descriptor(descriptor.clone())
//!         .set(MemberId::new("Client", "ModifiedByUserId"))?,
//! )?;
//!
//! // MERGE
//! let statement = qb::merge(
//!     &MergeDefinition::for_descriptor(descriptor.clone()).insert().update(),
//!     BatchFormat::Json,
//! )?;
//! let batch = statement.serializer().serialize_for_merge(&records);
//! # Ok::<(), tsqlgen::BuildError>(())
//! ```

mod delete;
mod insert;
pub mod merge;
mod select;
mod update;

pub use delete::{delete, delete_by_key};
pub use insert::insert;
pub use merge::{
    BatchFormat, CorrelationRecord, MergeAction, MergeDefinition, MergeStatement, merge,
};
pub use select::{select, select_all, select_by_key};
pub use update::{update, update_columns};

use std::sync::Arc;

use crate::column::ColumnDescriptor;

/// `@ColumnName`, optionally disambiguated with an underscore.
pub(crate) fn column_parameter<T>(column: &ColumnDescriptor<T>, prefix_underscore: bool) -> String {
    if prefix_underscore {
        format!("@_{}", column.column_name())
    } else {
        format!("@{}", column.column_name())
    }
}

/// `[ColumnName] = @ColumnName`.
pub(crate) fn column_equals<T>(column: &ColumnDescriptor<T>, prefix_underscore: bool) -> String {
    format!(
        "{} = {}",
        column.ident(),
        column_parameter(column, prefix_underscore)
    )
}

/// `where [A] = @A and [B] = @B …`.
pub(crate) fn where_clause<T>(
    columns: &[Arc<ColumnDescriptor<T>>],
    prefix_underscore: bool,
) -> String {
    let conditions: Vec<_> = columns
        .iter()
        .map(|column| column_equals(column, prefix_underscore))
        .collect();
    format!("where {}", conditions.join(" and "))
}
