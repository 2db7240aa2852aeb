//! JSON batch serialization.

use std::sync::Arc;

use crate::column::ColumnDescriptor;
use crate::error::BuildResult;
use crate::merge_serializer::{AliasTable, MergeSerializer, SerializerCore, json_value};
use crate::table::{Record, TableDescriptor};

/// Serializes record batches as a JSON array for `openjson` parsing.
///
/// Each record becomes `{"_": <index>, "_<alias>": <value>, …}`; absent
/// values are always emitted as `null`.
pub struct JsonMergeSerializer<T> {
    core: SerializerCore<T>,
}

impl<T: Record> JsonMergeSerializer<T> {
    pub fn new(descriptor: Arc<TableDescriptor<T>>) -> Self {
        Self {
            core: SerializerCore::new(descriptor),
        }
    }

    fn path(alias: Option<&str>) -> String {
        match alias {
            Some(alias) => format!("$._{alias}"),
            None => "$._".to_string(),
        }
    }
}

impl<T: Record> MergeSerializer<T> for JsonMergeSerializer<T> {
    fn aliases(&self) -> &AliasTable {
        &self.core.aliases
    }

    fn serialize_for_merge(&self, records: &[T]) -> String {
        let mut batch = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let mut object = serde_json::Map::new();
            object.insert("_".to_string(), serde_json::Value::from(index));
            for (column, (_, alias)) in self
                .core
                .descriptor
                .columns()
                .iter()
                .zip(self.core.aliases.entries())
            {
                object.insert(format!("_{alias}"), json_value(&column.value_of(record)));
            }
            batch.push(serde_json::Value::Object(object));
        }

        serde_json::Value::Array(batch).to_string()
    }

    fn build_column_parser(&self, column: Option<&ColumnDescriptor<T>>) -> BuildResult<String> {
        self.core
            .column_parser(column, |alias| Self::path(alias))
    }

    fn open_rowset(&self) -> &'static str {
        "openJson(@serialized)"
    }

    fn preamble(&self) -> &'static [&'static str] {
        &[]
    }
}
