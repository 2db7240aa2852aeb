//! Record metadata: the [`Record`] trait, facet views, and table
//! descriptors.
//!
//! A record names its members once (the auto-map universe) and declares the
//! facets — shared trait or base-type views — whose members it also exposes.
//! The [`TableDescriptorBuilder`] resolves facet and concrete member handles
//! against each other exactly once, at construction, and freezes the result
//! into an immutable [`TableDescriptor`]; the per-operation column subsets
//! are recomputed from the instance columns on every call, never cached.
//!
//! # Example
//! ```ignore
//! use tsqlgen::{col, MemberId, Record, TableDescriptorBuilder};
//!
//! let descriptor = TableDescriptorBuilder::<Client>::new()?
//!     .map(col(MemberId::new("Client", "Id"), |c: &Client| c.id).key(true)?)?
//!     .auto_map()?
//!     .finish()?;
//! assert_eq!(descriptor.table_name(), "Client");
//! # Ok::<(), tsqlgen::BuildError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::column::{ColumnBehavior, ColumnDef, ColumnDescriptor, MemberId, SqlOperation};
use crate::error::{BuildError, BuildResult};
use crate::ident::Ident;

/// A shared view over a subset of a record's members: a trait the record
/// implements or a base type it embeds.
///
/// Facet member names must match the record-side member names; that name
/// match is what cross-resolves a facet member handle to the concrete
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facet {
    pub type_name: &'static str,
    pub members: &'static [&'static str],
}

/// A record type that can be mapped to a table.
pub trait Record: Sized + 'static {
    /// The record's type name; doubles as the default table name.
    const TYPE_NAME: &'static str;

    /// Every mappable member with its default (basic) definition. This is
    /// the universe `auto_map` fills from, in definition order.
    fn members() -> Vec<ColumnDef<Self>>;

    /// Facet views whose members this record also exposes.
    fn facets() -> &'static [Facet] {
        &[]
    }
}

/// The full column-descriptor set for a mapped record type, including
/// cross-facet member reachability.
pub struct TableDescriptor<T> {
    table: Ident,
    columns: Vec<Arc<ColumnDescriptor<T>>>,
    member_index: HashMap<MemberId, usize>,
}

impl<T> TableDescriptor<T> {
    /// The mapped table name.
    pub fn table_name(&self) -> &str {
        self.table.as_str()
    }

    /// The validated table identifier.
    pub fn table_ident(&self) -> &Ident {
        &self.table
    }

    /// Every instance column, in definition order.
    pub fn columns(&self) -> &[Arc<ColumnDescriptor<T>>] {
        &self.columns
    }

    /// Look up a column by any of its member handles — concrete or
    /// facet-side handles resolve to the identical descriptor instance.
    pub fn column(&self, member: MemberId) -> Option<&Arc<ColumnDescriptor<T>>> {
        self.member_index
            .get(&member)
            .and_then(|position| self.columns.get(*position))
    }

    /// Columns that participate in inserts.
    pub fn insert_columns(&self) -> Vec<Arc<ColumnDescriptor<T>>> {
        self.columns_where(|c| !c.ignore_operations().contains(SqlOperation::INSERT))
    }

    /// Columns that participate in updates.
    pub fn update_columns(&self) -> Vec<Arc<ColumnDescriptor<T>>> {
        self.columns_where(|c| !c.ignore_operations().contains(SqlOperation::UPDATE))
    }

    /// Columns that participate in selects.
    pub fn select_columns(&self) -> Vec<Arc<ColumnDescriptor<T>>> {
        self.columns_where(|c| !c.ignore_operations().contains(SqlOperation::SELECT))
    }

    /// The table's key columns.
    pub fn key_columns(&self) -> Vec<Arc<ColumnDescriptor<T>>> {
        self.columns_where(|c| c.behavior().contains(ColumnBehavior::KEY))
    }

    /// Columns whose values the store assigns.
    pub fn generated_columns(&self) -> Vec<Arc<ColumnDescriptor<T>>> {
        self.columns_where(|c| c.behavior().contains(ColumnBehavior::GENERATED))
    }

    /// Columns that participate in inserts or updates, in definition order,
    /// each at most once.
    pub fn upsert_columns(&self) -> Vec<Arc<ColumnDescriptor<T>>> {
        self.columns_where(|c| {
            !c.ignore_operations().contains(SqlOperation::INSERT)
                || !c.ignore_operations().contains(SqlOperation::UPDATE)
        })
    }

    fn columns_where(
        &self,
        keep: impl Fn(&ColumnDescriptor<T>) -> bool,
    ) -> Vec<Arc<ColumnDescriptor<T>>> {
        self.columns
            .iter()
            .filter(|column| keep(column))
            .cloned()
            .collect()
    }
}

impl<T> fmt::Debug for TableDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableDescriptor")
            .field("table", &self.table)
            .field("columns", &self.columns)
            .finish()
    }
}

/// Assembles a [`TableDescriptor`]; dropped once `finish` freezes the
/// descriptor.
pub struct TableDescriptorBuilder<T: Record> {
    table: Ident,
    columns: Vec<ColumnDef<T>>,
    member_index: HashMap<MemberId, usize>,
}

impl<T: Record> fmt::Debug for TableDescriptorBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableDescriptorBuilder")
            .field("table", &self.table)
            .field("columns", &self.columns)
            .field("member_index", &self.member_index)
            .finish()
    }
}

impl<T: Record> TableDescriptorBuilder<T> {
    /// Start a builder; the table name defaults to the record's type name.
    pub fn new() -> BuildResult<Self> {
        Ok(Self {
            table: Ident::new(T::TYPE_NAME)?,
            columns: Vec::new(),
            member_index: HashMap::new(),
        })
    }

    /// Rename the mapped table; the name is validated.
    pub fn table(mut self, name: &str) -> BuildResult<Self> {
        self.table = Ident::new(name)?;
        Ok(self)
    }

    /// Register one column definition.
    ///
    /// The definition's member handle is indexed together with every
    /// cross-resolved handle: a concrete member is also reachable through
    /// each facet exposing its name, and a facet-declared member is also
    /// reachable through the concrete type. Mapping the same member twice is
    /// an argument error.
    pub fn map(mut self, def: ColumnDef<T>) -> BuildResult<Self> {
        let handles = Self::resolutions(def.member())?;
        let position = self.columns.len();
        for handle in &handles {
            if self.member_index.contains_key(handle) {
                return Err(BuildError::argument(format!(
                    "the member '{handle}' is already mapped for table '{}'",
                    self.table.as_str()
                )));
            }
        }
        for handle in handles {
            self.member_index.insert(handle, position);
        }
        self.columns.push(def);
        Ok(self)
    }

    /// Map every not-yet-mapped member with its default definition.
    pub fn auto_map(self) -> BuildResult<Self> {
        self.auto_map_with(Ok)
    }

    /// Map every not-yet-mapped member, applying `configure` to each default
    /// definition first.
    pub fn auto_map_with(
        mut self,
        configure: impl Fn(ColumnDef<T>) -> BuildResult<ColumnDef<T>>,
    ) -> BuildResult<Self> {
        for def in T::members() {
            if !self.member_index.contains_key(&def.member()) {
                self = self.map(configure(def)?)?;
            }
        }
        Ok(self)
    }

    /// Freeze into an immutable descriptor.
    pub fn finish(self) -> BuildResult<TableDescriptor<T>> {
        let mut columns = Vec::with_capacity(self.columns.len());
        for def in self.columns {
            columns.push(Arc::new(def.freeze()?));
        }

        Ok(TableDescriptor {
            table: self.table,
            columns,
            member_index: self.member_index,
        })
    }

    /// Every handle the given member is reachable through.
    fn resolutions(member: MemberId) -> BuildResult<Vec<MemberId>> {
        let concrete = MemberId::new(T::TYPE_NAME, member.name);
        if member.declaring_type != T::TYPE_NAME {
            let known_facet = T::facets().iter().any(|facet| {
                facet.type_name == member.declaring_type && facet.members.contains(&member.name)
            });
            if !known_facet {
                return Err(BuildError::argument(format!(
                    "the member '{member}' is not part of '{}' or any of its facets",
                    T::TYPE_NAME
                )));
            }
        }

        let mut handles = vec![member];
        if member != concrete {
            handles.push(concrete);
        }
        for facet in T::facets() {
            let facet_handle = MemberId::new(facet.type_name, member.name);
            if facet_handle != member && facet.members.contains(&member.name) {
                handles.push(facet_handle);
            }
        }

        Ok(handles)
    }
}
