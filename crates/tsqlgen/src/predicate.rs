//! Filter and assignment accumulation for statement synthesis.
//!
//! [`PredicateBuilder`] collects filter columns, [`ValuedPredicateBuilder`]
//! collects filter columns carrying literal values (merge delete filters),
//! and [`UpdateBuilder`] adds assignment collection on top of the predicate
//! surface. All of them share the fallback convention every "by key" helper
//! relies on: an empty filter set defaults to the table's key columns when
//! the consuming statement asks for it.

use std::sync::Arc;

use crate::column::{ColumnDescriptor, MemberId, SqlOperation, ValuedColumn};
use crate::error::{BuildError, BuildResult};
use crate::registry;
use crate::scalar::{Scalar, ScalarValue};
use crate::table::{Record, TableDescriptor};

/// Resolve a filter or assignment target, rejecting unknown and
/// select-ignored columns.
fn resolve_target<T: Record>(
    descriptor: &TableDescriptor<T>,
    member: MemberId,
) -> BuildResult<Arc<ColumnDescriptor<T>>> {
    let column = descriptor.column(member).ok_or_else(|| {
        BuildError::argument(format!(
            "the member '{member}' is not mapped for table '{}'",
            descriptor.table_name()
        ))
    })?;

    if column.ignore_operations().contains(SqlOperation::SELECT) {
        return Err(BuildError::argument(format!(
            "the column '{}' is ignored for select operations",
            column.column_name()
        )));
    }

    Ok(column.clone())
}

/// Accumulates filter columns for select and delete statements.
pub struct PredicateBuilder<T: Record> {
    descriptor: Arc<TableDescriptor<T>>,
    filters: Vec<Arc<ColumnDescriptor<T>>>,
}

impl<T: Record> std::fmt::Debug for PredicateBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateBuilder")
            .field("descriptor", &self.descriptor)
            .field("filters", &self.filters)
            .finish()
    }
}

impl<T: Record> PredicateBuilder<T> {
    /// Create a builder over the registered descriptor for `T`.
    pub fn new() -> BuildResult<Self> {
        Ok(Self::for_descriptor(registry::descriptor::<T>()?))
    }

    /// Create a builder over an explicit descriptor.
    pub fn for_descriptor(descriptor: Arc<TableDescriptor<T>>) -> Self {
        Self {
            descriptor,
            filters: Vec::new(),
        }
    }

    /// The descriptor this builder filters against.
    pub fn descriptor(&self) -> &Arc<TableDescriptor<T>> {
        &self.descriptor
    }

    /// Filter on every key column.
    pub fn key(mut self) -> Self {
        self.filters.extend(self.descriptor.key_columns());
        self
    }

    /// Filter on one column.
    pub fn filter(mut self, member: MemberId) -> BuildResult<Self> {
        let column = resolve_target(&self.descriptor, member)?;
        self.filters.push(column);
        Ok(self)
    }

    /// The accumulated filter columns, or — when none were added and
    /// `default_to_key` is set — the table's key columns.
    pub fn filter_columns(&self, default_to_key: bool) -> Vec<Arc<ColumnDescriptor<T>>> {
        if self.filters.is_empty() && default_to_key {
            self.descriptor.key_columns()
        } else {
            self.filters.clone()
        }
    }
}

/// Accumulates filter columns that carry literal values.
pub struct ValuedPredicateBuilder<T: Record> {
    descriptor: Arc<TableDescriptor<T>>,
    filters: Vec<ValuedColumn<T>>,
}

impl<T: Record> ValuedPredicateBuilder<T> {
    /// Create a builder over the registered descriptor for `T`.
    pub fn new() -> BuildResult<Self> {
        Ok(Self::for_descriptor(registry::descriptor::<T>()?))
    }

    /// Create a builder over an explicit descriptor.
    pub fn for_descriptor(descriptor: Arc<TableDescriptor<T>>) -> Self {
        Self {
            descriptor,
            filters: Vec::new(),
        }
    }

    /// The descriptor this builder filters against.
    pub fn descriptor(&self) -> &Arc<TableDescriptor<T>> {
        &self.descriptor
    }

    /// Filter on every key column, valued from the given record.
    pub fn keyed(mut self, record: &T) -> Self {
        for key_column in self.descriptor.key_columns() {
            let value = key_column.value_of(record);
            self.filters.push(ValuedColumn::new(key_column, value));
        }
        self
    }

    /// Filter on one column with a literal value; `None` carries the null
    /// literal.
    pub fn filter_value(mut self, member: MemberId, value: impl Scalar) -> BuildResult<Self> {
        let column = resolve_target(&self.descriptor, member)?;
        self.filters
            .push(ValuedColumn::new(column, value.into_scalar()));
        Ok(self)
    }

    /// The accumulated valued filter columns.
    pub fn filter_columns(&self) -> &[ValuedColumn<T>] {
        &self.filters
    }

    pub(crate) fn into_filter_columns(self) -> Vec<ValuedColumn<T>> {
        self.filters
    }
}

/// Accumulates assignments on top of the predicate surface.
pub struct UpdateBuilder<T: Record> {
    predicate: PredicateBuilder<T>,
    sets: Vec<(Arc<ColumnDescriptor<T>>, Option<ScalarValue>)>,
}

impl<T: Record> std::fmt::Debug for UpdateBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateBuilder")
            .field("predicate", &self.predicate)
            .field("sets", &self.sets)
            .finish()
    }
}

impl<T: Record> UpdateBuilder<T> {
    /// Create a builder over the registered descriptor for `T`.
    pub fn new() -> BuildResult<Self> {
        Ok(Self::for_descriptor(registry::descriptor::<T>()?))
    }

    /// Create a builder over an explicit descriptor.
    pub fn for_descriptor(descriptor: Arc<TableDescriptor<T>>) -> Self {
        Self {
            predicate: PredicateBuilder::for_descriptor(descriptor),
            sets: Vec::new(),
        }
    }

    /// The descriptor this builder assigns against.
    pub fn descriptor(&self) -> &Arc<TableDescriptor<T>> {
        self.predicate.descriptor()
    }

    /// Filter on every key column.
    pub fn key(mut self) -> Self {
        self.predicate = self.predicate.key();
        self
    }

    /// Filter on one column.
    pub fn filter(mut self, member: MemberId) -> BuildResult<Self> {
        self.predicate = self.predicate.filter(member)?;
        Ok(self)
    }

    /// Assign one column.
    ///
    /// The member must be updatable; a second `set` for the same member
    /// replaces the first.
    pub fn set(self, member: MemberId) -> BuildResult<Self> {
        self.set_inner(member, None)
    }

    /// Assign one column a literal value, replacing any prior assignment for
    /// the same member.
    pub fn set_value(self, member: MemberId, value: impl Scalar) -> BuildResult<Self> {
        self.set_inner(member, Some(value.into_scalar()))
    }

    fn set_inner(mut self, member: MemberId, value: Option<ScalarValue>) -> BuildResult<Self> {
        let column = self.descriptor().column(member).cloned().ok_or_else(|| {
            BuildError::argument(format!(
                "the member '{member}' is not mapped for table '{}'",
                self.descriptor().table_name()
            ))
        })?;

        if column.ignore_operations().contains(SqlOperation::UPDATE) {
            return Err(BuildError::argument(format!(
                "the column '{}' is not available for updates",
                column.column_name()
            )));
        }

        self.sets
            .retain(|(existing, _)| !Arc::ptr_eq(existing, &column));
        self.sets.push((column, value));
        Ok(self)
    }

    /// The accumulated filter columns, or the key columns when none were
    /// added and `default_to_key` is set.
    pub fn filter_columns(&self, default_to_key: bool) -> Vec<Arc<ColumnDescriptor<T>>> {
        self.predicate.filter_columns(default_to_key)
    }

    /// The accumulated set columns, or every updatable column when no `set`
    /// call was made.
    pub fn set_columns(&self) -> Vec<Arc<ColumnDescriptor<T>>> {
        if self.sets.is_empty() {
            self.descriptor().update_columns()
        } else {
            self.sets.iter().map(|(column, _)| column.clone()).collect()
        }
    }

    /// The literal values carried by explicit `set_value` calls, keyed by
    /// parameter name.
    pub fn set_parameters(&self) -> Vec<(String, ScalarValue)> {
        self.sets
            .iter()
            .filter_map(|(column, value)| {
                value
                    .as_ref()
                    .map(|value| (format!("@{}", column.column_name()), value.clone()))
            })
            .collect()
    }
}
