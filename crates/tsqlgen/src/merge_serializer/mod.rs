//! Batch serialization for merge statements.
//!
//! Records are serialized positionally: every instance column gets a
//! minified alias derived from its ordinal (base-36, least significant digit
//! first, then reversed — `0`…`z`, `10`…`zz`, `100`…), and every record is
//! tagged with its zero-based position, the correlation index. Merge output
//! rows carry that index back, so each row can be traced to its originating
//! record regardless of output order.
//!
//! Two wire formats exist, with deliberately different null handling:
//! [`JsonMergeSerializer`] always emits `null` for an absent value, while
//! [`XmlMergeSerializer`] omits the attribute entirely (an XML attribute
//! cannot represent null). Both contracts have consumers; neither is
//! unified into the other.

mod json;
mod xml;

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDateTime;

pub use json::JsonMergeSerializer;
pub use xml::XmlMergeSerializer;

use crate::column::{ColumnDescriptor, MemberId};
use crate::error::{BuildError, BuildResult};
use crate::ident::bracket;
use crate::qb::merge::CORRELATION_INDEX_COLUMN;
use crate::scalar::{ScalarKind, ScalarValue};
use crate::table::{Record, TableDescriptor};

/// Serializes record batches for a merge statement's `@serialized` parameter
/// and emits the matching `with (…)` parser fragments.
pub trait MergeSerializer<T: Record> {
    /// The alias table shared by the serialized batch and the parser lines.
    fn aliases(&self) -> &AliasTable;

    /// Serialize a batch; each record is keyed by its aliases and tagged
    /// with its position.
    fn serialize_for_merge(&self, records: &[T]) -> String;

    /// One parser line — `[Column] <sqlType> '<path>'`; `None` emits the
    /// reserved correlation-index parser instead.
    fn build_column_parser(&self, column: Option<&ColumnDescriptor<T>>) -> BuildResult<String>;

    /// The rowset expression for the statement's `using (select * from …)`
    /// clause.
    fn open_rowset(&self) -> &'static str;

    /// Statement lines that must precede the merge itself.
    fn preamble(&self) -> &'static [&'static str];
}

/// Bidirectional member ↔ minified-alias table over a descriptor's instance
/// columns, in definition order.
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<(MemberId, String)>,
    by_member: HashMap<MemberId, usize>,
    by_alias: HashMap<String, usize>,
}

impl AliasTable {
    /// Assign every column its positional alias.
    pub(crate) fn build<T>(descriptor: &TableDescriptor<T>) -> Self {
        let entries: Vec<_> = descriptor
            .columns()
            .iter()
            .enumerate()
            .map(|(position, column)| (column.member(), encode_alias(position)))
            .collect();
        let by_member = entries
            .iter()
            .enumerate()
            .map(|(position, (member, _))| (*member, position))
            .collect();
        let by_alias = entries
            .iter()
            .enumerate()
            .map(|(position, (_, alias))| (alias.clone(), position))
            .collect();

        Self {
            entries,
            by_member,
            by_alias,
        }
    }

    /// The alias assigned to a member.
    pub fn alias(&self, member: MemberId) -> Option<&str> {
        self.by_member
            .get(&member)
            .map(|position| self.entries[*position].1.as_str())
    }

    /// The member an alias belongs to.
    pub fn member(&self, alias: &str) -> Option<MemberId> {
        self.by_alias
            .get(alias)
            .map(|position| self.entries[*position].0)
    }

    /// `(member, alias)` pairs in positional order.
    pub fn entries(&self) -> impl Iterator<Item = (MemberId, &str)> {
        self.entries
            .iter()
            .map(|(member, alias)| (*member, alias.as_str()))
    }

    /// The number of aliased columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Encode a zero-based ordinal as its minified base-36 alias.
///
/// Remainders are produced least significant first, then reversed.
pub(crate) fn encode_alias(index: usize) -> String {
    fn digit(remainder: usize) -> char {
        if remainder < 10 {
            (b'0' + remainder as u8) as char
        } else {
            (b'a' + (remainder - 10) as u8) as char
        }
    }

    let mut digits = Vec::new();
    let mut rest = index;
    loop {
        digits.push(digit(rest % 36));
        rest /= 36;
        if rest == 0 {
            break;
        }
    }

    digits.iter().rev().collect()
}

/// Shared state for the concrete serializers.
pub(crate) struct SerializerCore<T> {
    pub(crate) descriptor: Arc<TableDescriptor<T>>,
    pub(crate) aliases: AliasTable,
}

impl<T: Record> SerializerCore<T> {
    pub(crate) fn new(descriptor: Arc<TableDescriptor<T>>) -> Self {
        let aliases = AliasTable::build(&descriptor);
        Self {
            descriptor,
            aliases,
        }
    }

    /// One parser line; `path_of` renders the format-specific path
    /// expression for an alias (`None` is the correlation index).
    pub(crate) fn column_parser(
        &self,
        column: Option<&ColumnDescriptor<T>>,
        path_of: impl Fn(Option<&str>) -> String,
    ) -> BuildResult<String> {
        match column {
            Some(column) => {
                let alias = self.aliases.alias(column.member()).ok_or_else(|| {
                    BuildError::argument(format!(
                        "the column '{}' does not belong to table '{}'",
                        column.column_name(),
                        self.descriptor.table_name()
                    ))
                })?;
                Ok(format!(
                    "{} {} '{}'",
                    column.ident(),
                    column.sql_type(),
                    path_of(Some(alias))
                ))
            }
            None => Ok(format!(
                "{} {} '{}'",
                bracket(CORRELATION_INDEX_COLUMN),
                ScalarKind::Int32.sql_type(),
                path_of(None)
            )),
        }
    }
}

/// Render a date-time for either wire format.
pub(crate) fn format_datetime(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

/// Convert a scalar value to its JSON form; enums arrive here already as
/// their underlying integral value.
pub(crate) fn json_value(value: &ScalarValue) -> serde_json::Value {
    use serde_json::Value;

    match value {
        ScalarValue::Null => Value::Null,
        ScalarValue::Uuid(v) => Value::String(v.to_string()),
        ScalarValue::Bool(v) => Value::Bool(*v),
        ScalarValue::UInt8(v) => Value::from(*v),
        ScalarValue::Int16(v) => Value::from(*v),
        ScalarValue::Int32(v) => Value::from(*v),
        ScalarValue::Int64(v) => Value::from(*v),
        ScalarValue::Float32(v) => Value::from(f64::from(*v)),
        ScalarValue::Float64(v) => Value::from(*v),
        ScalarValue::Decimal(v) => Value::String(v.to_string()),
        ScalarValue::DateTime(v) => Value::String(format_datetime(v)),
        ScalarValue::Char(v) => Value::String(v.to_string()),
        ScalarValue::String(v) => Value::String(v.clone()),
        ScalarValue::Bytes(v) => Value::String(BASE64.encode(v)),
    }
}

/// Convert a scalar value to its XML attribute text; `None` means the
/// attribute is omitted.
pub(crate) fn attribute_text(value: &ScalarValue) -> Option<String> {
    match value {
        ScalarValue::Null => None,
        ScalarValue::Uuid(v) => Some(v.to_string()),
        ScalarValue::Bool(v) => Some(v.to_string()),
        ScalarValue::UInt8(v) => Some(v.to_string()),
        ScalarValue::Int16(v) => Some(v.to_string()),
        ScalarValue::Int32(v) => Some(v.to_string()),
        ScalarValue::Int64(v) => Some(v.to_string()),
        ScalarValue::Float32(v) => Some(v.to_string()),
        ScalarValue::Float64(v) => Some(v.to_string()),
        ScalarValue::Decimal(v) => Some(v.to_string()),
        ScalarValue::DateTime(v) => Some(format_datetime(v)),
        ScalarValue::Char(v) => Some(v.to_string()),
        ScalarValue::String(v) => Some(v.clone()),
        ScalarValue::Bytes(v) => Some(BASE64.encode(v)),
    }
}
