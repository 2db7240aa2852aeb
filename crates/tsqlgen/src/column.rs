//! Column metadata: behavior flags, per-operation ignore masks, and the
//! definition → frozen-descriptor lifecycle.
//!
//! A [`ColumnDef`] is the mutable configuration surface: it is created with
//! [`col`], adjusted with [`key`](ColumnDef::key) /
//! [`generated`](ColumnDef::generated) / [`ignore`](ColumnDef::ignore), and
//! handed to a table descriptor builder, which freezes it into a
//! [`ColumnDescriptor`]. The frozen form has no mutators; reconfiguring a
//! column after its table descriptor is finished does not compile.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::error::{BuildError, BuildResult};
use crate::ident::Ident;
use crate::scalar::{Scalar, ScalarKind, ScalarValue};

bitflags! {
    /// The statement kinds a column can be excluded from.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SqlOperation: u8 {
        const INSERT = 1 << 0;
        const UPDATE = 1 << 1;
        const SELECT = 1 << 2;
    }
}

bitflags! {
    /// Structural behavior flags; the empty set is a basic column.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ColumnBehavior: u8 {
        const KEY = 1 << 0;
        const GENERATED = 1 << 1;
    }
}

/// Stable handle to a record member: the declaring type (concrete record or
/// one of its facets) plus the member name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberId {
    pub declaring_type: &'static str,
    pub name: &'static str,
}

impl MemberId {
    pub const fn new(declaring_type: &'static str, name: &'static str) -> Self {
        Self {
            declaring_type,
            name,
        }
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name)
    }
}

type Getter<T> = Arc<dyn Fn(&T) -> ScalarValue + Send + Sync>;

/// Start a column definition for the given member.
///
/// The getter extracts the member's value from a record; its return type
/// fixes the column's scalar kind at compile time.
pub fn col<T, V, F>(member: MemberId, get: F) -> ColumnDef<T>
where
    V: Scalar,
    F: Fn(&T) -> V + Send + Sync + 'static,
{
    ColumnDef {
        member,
        kind: V::KIND,
        getter: Arc::new(move |record| get(record).into_scalar()),
        behavior: ColumnBehavior::empty(),
        ignore_operations: SqlOperation::empty(),
        length: None,
        precision: None,
    }
}

/// Configuration for one mapped member, assembled before the owning table
/// descriptor freezes it.
pub struct ColumnDef<T> {
    member: MemberId,
    kind: ScalarKind,
    getter: Getter<T>,
    behavior: ColumnBehavior,
    ignore_operations: SqlOperation,
    length: Option<u32>,
    precision: Option<(u8, u8)>,
}

impl<T> ColumnDef<T> {
    /// The member this definition maps.
    pub fn member(&self) -> MemberId {
        self.member
    }

    /// Mark this column as (part of) the table key.
    ///
    /// A generated key is also insert-ignored; a plain key stays insertable
    /// but is never updatable. Fails if select operations are already
    /// ignored — keys must round-trip through selects.
    pub fn key(mut self, is_generated: bool) -> BuildResult<Self> {
        if self.ignore_operations.contains(SqlOperation::SELECT) {
            return Err(BuildError::invalid_operation(format!(
                "column '{}' cannot be a key because select operations are ignored",
                self.member.name
            )));
        }

        self.behavior |= ColumnBehavior::KEY;
        if is_generated {
            self.generated(false)
        } else {
            self.ignore_operations |= SqlOperation::UPDATE;
            Ok(self)
        }
    }

    /// Mark this column's value as store-assigned (identity, computed
    /// timestamps).
    ///
    /// Generated columns are never insertable and only updatable when
    /// `allow_updates` is set. Fails if select operations are already
    /// ignored — generated values must round-trip through selects.
    pub fn generated(mut self, allow_updates: bool) -> BuildResult<Self> {
        if self.ignore_operations.contains(SqlOperation::SELECT) {
            return Err(BuildError::invalid_operation(format!(
                "column '{}' cannot be generated because select operations are ignored",
                self.member.name
            )));
        }

        self.behavior |= ColumnBehavior::GENERATED;
        self.ignore_operations |= SqlOperation::INSERT;
        if !allow_updates {
            self.ignore_operations |= SqlOperation::UPDATE;
        }

        Ok(self)
    }

    /// Exclude this column from the given statement kinds.
    ///
    /// Fails when `operations` contains select and the column is a key or
    /// generated.
    pub fn ignore(mut self, operations: SqlOperation) -> BuildResult<Self> {
        if operations.contains(SqlOperation::SELECT) {
            if self.behavior.contains(ColumnBehavior::KEY) {
                return Err(BuildError::invalid_operation(format!(
                    "column '{}' cannot ignore select operations because it is a key",
                    self.member.name
                )));
            }
            if self.behavior.contains(ColumnBehavior::GENERATED) {
                return Err(BuildError::invalid_operation(format!(
                    "column '{}' cannot ignore select operations because it is generated",
                    self.member.name
                )));
            }
        }

        self.ignore_operations |= operations;
        Ok(self)
    }

    /// Configure the rendered length for string columns; `u32::MAX` renders
    /// as `max`.
    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Configure precision and scale for fixed-point columns.
    pub fn precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some((precision, scale));
        self
    }

    /// Freeze into the immutable descriptor form, validating the column
    /// name.
    pub(crate) fn freeze(self) -> BuildResult<ColumnDescriptor<T>> {
        Ok(ColumnDescriptor {
            name: Ident::new(self.member.name)?,
            member: self.member,
            kind: self.kind,
            getter: self.getter,
            behavior: self.behavior,
            ignore_operations: self.ignore_operations,
            length: self.length,
            precision: self.precision,
        })
    }
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            member: self.member,
            kind: self.kind,
            getter: self.getter.clone(),
            behavior: self.behavior,
            ignore_operations: self.ignore_operations,
            length: self.length,
            precision: self.precision,
        }
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("member", &self.member)
            .field("kind", &self.kind)
            .field("behavior", &self.behavior)
            .field("ignore_operations", &self.ignore_operations)
            .field("length", &self.length)
            .field("precision", &self.precision)
            .finish()
    }
}

/// Frozen metadata binding one record member to one table column, plus its
/// per-operation applicability.
///
/// Descriptors are created by a table descriptor builder's `finish` and
/// never change afterwards.
pub struct ColumnDescriptor<T> {
    member: MemberId,
    name: Ident,
    kind: ScalarKind,
    getter: Getter<T>,
    behavior: ColumnBehavior,
    ignore_operations: SqlOperation,
    length: Option<u32>,
    precision: Option<(u8, u8)>,
}

impl<T> ColumnDescriptor<T> {
    /// The member this column maps.
    pub fn member(&self) -> MemberId {
        self.member
    }

    /// The column name.
    pub fn column_name(&self) -> &str {
        self.name.as_str()
    }

    /// The validated column identifier.
    pub fn ident(&self) -> &Ident {
        &self.name
    }

    /// The column's scalar kind.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Structural behavior flags.
    pub fn behavior(&self) -> ColumnBehavior {
        self.behavior
    }

    /// The statement kinds this column is excluded from.
    pub fn ignore_operations(&self) -> SqlOperation {
        self.ignore_operations
    }

    /// The configured length, if any.
    pub fn length(&self) -> Option<u32> {
        self.length
    }

    /// The configured precision and scale, if any.
    pub fn precision(&self) -> Option<(u8, u8)> {
        self.precision
    }

    /// Extract this column's value from a record.
    pub fn value_of(&self, record: &T) -> ScalarValue {
        (self.getter)(record)
    }

    /// The full SQL type, including length / precision / scale where
    /// appropriate.
    ///
    /// Byte-array columns always render `nvarchar(max)`: their values travel
    /// base64-encoded regardless of the column's storage length.
    pub fn sql_type(&self) -> String {
        if self.kind == ScalarKind::Bytes {
            return format!("{}(max)", self.kind.sql_type());
        }

        if self.kind.is_sized() {
            let length = match self.length {
                Some(length) if length != u32::MAX => length.to_string(),
                _ => "max".to_string(),
            };
            return format!("{}({length})", self.kind.sql_type());
        }

        if self.kind.is_fixed_point() {
            if let Some((precision, scale)) = self.precision {
                return format!("{}({precision},{scale})", self.kind.sql_type());
            }
        }

        self.kind.sql_type().to_string()
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("member", &self.member)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("behavior", &self.behavior)
            .field("ignore_operations", &self.ignore_operations)
            .field("length", &self.length)
            .field("precision", &self.precision)
            .finish()
    }
}

/// A column descriptor paired with a concrete value.
///
/// Used wherever a filter or assignment must carry a literal rather than a
/// parameter placeholder, e.g. merge delete filters.
pub struct ValuedColumn<T> {
    column: Arc<ColumnDescriptor<T>>,
    value: ScalarValue,
}

impl<T> ValuedColumn<T> {
    pub(crate) fn new(column: Arc<ColumnDescriptor<T>>, value: ScalarValue) -> Self {
        Self { column, value }
    }

    /// The underlying column descriptor.
    pub fn column(&self) -> &Arc<ColumnDescriptor<T>> {
        &self.column
    }

    /// The carried value.
    pub fn value(&self) -> &ScalarValue {
        &self.value
    }
}

impl<T> Clone for ValuedColumn<T> {
    fn clone(&self) -> Self {
        Self {
            column: self.column.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T> fmt::Debug for ValuedColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuedColumn")
            .field("column", &self.column.member())
            .field("value", &self.value)
            .finish()
    }
}
