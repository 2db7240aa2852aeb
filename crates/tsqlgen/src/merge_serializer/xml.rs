//! XML batch serialization.

use std::sync::Arc;

use crate::column::ColumnDescriptor;
use crate::error::BuildResult;
use crate::merge_serializer::{AliasTable, MergeSerializer, SerializerCore, attribute_text};
use crate::table::{Record, TableDescriptor};

/// Serializes record batches as attribute-only XML for `openxml` parsing.
///
/// The root and record elements are both named `_`; each record is
/// `<_ _="<index>" _<alias>="<value>" …/>`. Null values have no attribute —
/// an XML attribute cannot represent null.
pub struct XmlMergeSerializer<T> {
    core: SerializerCore<T>,
}

impl<T: Record> XmlMergeSerializer<T> {
    pub fn new(descriptor: Arc<TableDescriptor<T>>) -> Self {
        Self {
            core: SerializerCore::new(descriptor),
        }
    }

    fn path(alias: Option<&str>) -> String {
        match alias {
            Some(alias) => format!("@_{alias}"),
            None => "@_".to_string(),
        }
    }
}

impl<T: Record> MergeSerializer<T> for XmlMergeSerializer<T> {
    fn aliases(&self) -> &AliasTable {
        &self.core.aliases
    }

    fn serialize_for_merge(&self, records: &[T]) -> String {
        let mut xml = String::from("<_>");
        for (index, record) in records.iter().enumerate() {
            xml.push_str(&format!("<_ _=\"{index}\""));
            for (column, (_, alias)) in self
                .core
                .descriptor
                .columns()
                .iter()
                .zip(self.core.aliases.entries())
            {
                if let Some(text) = attribute_text(&column.value_of(record)) {
                    xml.push_str(&format!(" _{alias}=\"{}\"", escape_attribute(&text)));
                }
            }
            xml.push_str(" />");
        }
        xml.push_str("</_>");

        xml
    }

    fn build_column_parser(&self, column: Option<&ColumnDescriptor<T>>) -> BuildResult<String> {
        self.core
            .column_parser(column, |alias| Self::path(alias))
    }

    fn open_rowset(&self) -> &'static str {
        "openXml(@preparedDoc, '/_/_')"
    }

    fn preamble(&self) -> &'static [&'static str] {
        &[
            "declare @preparedDoc int;",
            "exec sp_xml_preparedocument @preparedDoc output, @serialized;",
            "",
        ]
    }
}

fn escape_attribute(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
