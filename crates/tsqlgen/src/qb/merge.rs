//! Multi-action MERGE synthesis.
//!
//! One statement performs any combination of insert, update, and delete for
//! a whole batch of records and reports, per input record, which action
//! occurred plus the resulting store-assigned values — all in one round
//! trip. The batch travels through a single `@serialized` parameter; a
//! [`MergeSerializer`] encodes it and the statement's `with (…)` clause
//! parses it back positionally.
//!
//! Because a MERGE's output order is unrelated to its input order, every
//! serialized record carries its zero-based position, and the output clause
//! echoes it back as the `CorrelationIndex` column.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::column::{ColumnDescriptor, SqlOperation, ValuedColumn};
use crate::error::{BuildError, BuildResult};
use crate::ident::bracket;
use crate::merge_serializer::{JsonMergeSerializer, MergeSerializer, XmlMergeSerializer};
use crate::predicate::ValuedPredicateBuilder;
use crate::registry;
use crate::scalar::ScalarValue;
use crate::table::{Record, TableDescriptor};

/// Reserved output column carrying each record's position within the
/// serialized batch.
pub const CORRELATION_INDEX_COLUMN: &str = "<{CorrelationIndex}>";

/// Reserved marker column demarcating the correlation columns from the
/// captured entity columns in the output schema.
pub const SPLIT_COLUMN: &str = "<{Split}>";

/// Wire format for the serialized batch parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchFormat {
    Json,
    #[default]
    Xml,
}

/// The verb a merge output row reports in its `Action` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeAction {
    Insert,
    Update,
    Delete,
}

impl FromStr for MergeAction {
    type Err = BuildError;

    fn from_str(verb: &str) -> BuildResult<Self> {
        match verb.to_ascii_uppercase().as_str() {
            "INSERT" => Ok(Self::Insert),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(BuildError::argument(format!(
                "'{verb}' is not a merge action"
            ))),
        }
    }
}

/// One merge output row's correlation columns.
///
/// `correlation_index` is the position of the originating record within the
/// serialized batch; it is absent only for delete-only merges, where no
/// source row binds to the deleted target row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub correlation_index: Option<i32>,
    pub action: String,
}

impl CorrelationRecord {
    /// Parse the action verb.
    pub fn merge_action(&self) -> BuildResult<MergeAction> {
        self.action.parse()
    }
}

/// Which of insert/update/delete participate in a merge, plus the optional
/// delete filter.
pub struct MergeDefinition<T: Record> {
    descriptor: Arc<TableDescriptor<T>>,
    include_insert: bool,
    include_update: bool,
    include_delete: bool,
    delete_filters: Vec<ValuedColumn<T>>,
}

impl<T: Record> MergeDefinition<T> {
    /// Create a definition over the registered descriptor for `T`; no
    /// operation is included until its configuration call is made.
    pub fn new() -> BuildResult<Self> {
        Ok(Self::for_descriptor(registry::descriptor::<T>()?))
    }

    /// Create a definition over an explicit descriptor.
    pub fn for_descriptor(descriptor: Arc<TableDescriptor<T>>) -> Self {
        Self {
            descriptor,
            include_insert: false,
            include_update: false,
            include_delete: false,
            delete_filters: Vec::new(),
        }
    }

    /// Create a definition with its gates taken from an operation mask;
    /// the select flag has no merge meaning and is ignored.
    pub fn from_operations(descriptor: Arc<TableDescriptor<T>>, operations: SqlOperation) -> Self {
        let mut definition = Self::for_descriptor(descriptor);
        if operations.contains(SqlOperation::INSERT) {
            definition = definition.insert();
        }
        if operations.contains(SqlOperation::UPDATE) {
            definition = definition.update();
        }
        definition
    }

    /// Include the insert branch.
    pub fn insert(mut self) -> Self {
        self.include_insert = true;
        self
    }

    /// Include the update branch.
    pub fn update(mut self) -> Self {
        self.include_update = true;
        self
    }

    /// Include the delete branch with no additional filtering.
    pub fn delete(mut self) -> Self {
        self.include_delete = true;
        self
    }

    /// Include the delete branch, restricted by a valued filter.
    pub fn delete_filtered(
        mut self,
        configure: impl FnOnce(ValuedPredicateBuilder<T>) -> BuildResult<ValuedPredicateBuilder<T>>,
    ) -> BuildResult<Self> {
        let builder = configure(ValuedPredicateBuilder::for_descriptor(
            self.descriptor.clone(),
        ))?;
        self.delete_filters.extend(builder.into_filter_columns());
        self.include_delete = true;
        Ok(self)
    }

    /// The descriptor this merge runs against.
    pub fn descriptor(&self) -> &Arc<TableDescriptor<T>> {
        &self.descriptor
    }

    /// Should inserts be included in this merge statement?
    pub fn include_insert(&self) -> bool {
        self.include_insert
    }

    /// Should updates be included in this merge statement?
    pub fn include_update(&self) -> bool {
        self.include_update
    }

    /// Should deletes be included in this merge statement?
    pub fn include_delete(&self) -> bool {
        self.include_delete
    }

    /// The filter columns/values for the delete branch.
    pub fn delete_filter_columns(&self) -> &[ValuedColumn<T>] {
        &self.delete_filters
    }
}

/// A synthesized merge statement: the SQL text, the serializer that encodes
/// batches for its `@serialized` parameter, and the delete-filter parameter
/// contract.
pub struct MergeStatement<T: Record> {
    sql: String,
    serializer: Box<dyn MergeSerializer<T>>,
    delete_filter_params: Vec<(String, ScalarValue)>,
}

impl<T: Record> std::fmt::Debug for MergeStatement<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeStatement")
            .field("sql", &self.sql)
            .field("delete_filter_params", &self.delete_filter_params)
            .finish()
    }
}

impl<T: Record> MergeStatement<T> {
    /// The statement text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The serializer producing the `@serialized` parameter value.
    pub fn serializer(&self) -> &dyn MergeSerializer<T> {
        self.serializer.as_ref()
    }

    /// `@deleteFilter<N>` parameter name/value pairs; null-literal filters
    /// render inline as `is null` and carry no parameter.
    pub fn delete_filter_params(&self) -> &[(String, ScalarValue)] {
        &self.delete_filter_params
    }
}

/// Synthesize a merge statement for the given definition.
///
/// Fails before producing any text when no operation is included (argument
/// error), when the table has no key columns, or when updates are requested
/// against a table with no updatable columns (both invalid-operation).
pub fn merge<T: Record>(
    definition: &MergeDefinition<T>,
    format: BatchFormat,
) -> BuildResult<MergeStatement<T>> {
    let descriptor = definition.descriptor();

    if !(definition.include_insert() || definition.include_update() || definition.include_delete())
    {
        return Err(BuildError::argument(
            "at least one of insert, update, or delete must be included in the merge",
        ));
    }

    let key_columns = descriptor.key_columns();
    if key_columns.is_empty() {
        return Err(BuildError::invalid_operation(format!(
            "table '{}' has no key columns to merge on",
            descriptor.table_name()
        )));
    }

    let update_columns = descriptor.update_columns();
    if definition.include_update() && update_columns.is_empty() {
        return Err(BuildError::invalid_operation(format!(
            "table '{}' has no updatable columns",
            descriptor.table_name()
        )));
    }

    let serializer: Box<dyn MergeSerializer<T>> = match format {
        BatchFormat::Json => Box::new(JsonMergeSerializer::new(descriptor.clone())),
        BatchFormat::Xml => Box::new(XmlMergeSerializer::new(descriptor.clone())),
    };

    let source_columns = source_columns(definition)?;
    let captured_columns = descriptor.generated_columns();
    let delete_only = definition.include_delete()
        && !definition.include_insert()
        && !definition.include_update();

    let mut lines: Vec<String> = Vec::new();

    // Output capture needs an explicitly-typed table variable: the insert,
    // update, and delete branches populate different pseudo-tables, and
    // OUTPUT alone cannot describe their differing nullability.
    if !captured_columns.is_empty() {
        let mut declared = vec![
            format!("  {} int", bracket("CorrelationIndex")),
            format!("  {} nvarchar(10)", bracket("Action")),
            format!("  {} bit", bracket(SPLIT_COLUMN)),
        ];
        declared.extend(
            captured_columns
                .iter()
                .map(|column| format!("  {} {}", column.ident(), column.sql_type())),
        );
        lines.push("declare @mergeResult table(".to_string());
        lines.push(declared.join(",\n"));
        lines.push(");".to_string());
    }

    for line in serializer.preamble() {
        lines.push((*line).to_string());
    }

    lines.push(format!("merge {} as target", descriptor.table_ident()));
    lines.push(format!(
        "using (select * from {} with (",
        serializer.open_rowset()
    ));

    let mut parsers = vec![format!("  {}", serializer.build_column_parser(None)?)];
    for column in &source_columns {
        parsers.push(format!(
            "  {}",
            serializer.build_column_parser(Some(column.as_ref()))?
        ));
    }
    lines.push(parsers.join(",\n"));

    let join_conditions: Vec<_> = key_columns
        .iter()
        .map(|key| {
            let ident = key.ident();
            format!("target.{ident} = source.{ident}")
        })
        .collect();
    lines.push(format!(
        ")) as source on ({})",
        join_conditions.join(" and ")
    ));

    if definition.include_insert() {
        let insert_columns = descriptor.insert_columns();
        let column_list: Vec<_> = insert_columns
            .iter()
            .map(|column| column.ident().to_string())
            .collect();
        let value_list: Vec<_> = insert_columns
            .iter()
            .map(|column| format!("source.{}", column.ident()))
            .collect();
        lines.push(format!(
            "when not matched by target then insert({})",
            column_list.join(", ")
        ));
        lines.push(format!("  values({})", value_list.join(", ")));
    }

    if definition.include_update() {
        let assignments: Vec<_> = update_columns
            .iter()
            .map(|column| {
                let ident = column.ident();
                format!("  target.{ident} = source.{ident}")
            })
            .collect();
        lines.push("when matched then update set".to_string());
        lines.push(assignments.join(",\n"));
    }

    let mut delete_filter_params = Vec::new();
    if definition.include_delete() {
        let mut clause = String::from("when not matched by source");
        for (position, filter) in definition.delete_filter_columns().iter().enumerate() {
            let ident = filter.column().ident();
            if filter.value().is_null() {
                clause.push_str(&format!(" and target.{ident} is null"));
            } else {
                clause.push_str(&format!(" and target.{ident} = @deleteFilter{position}"));
                delete_filter_params
                    .push((format!("@deleteFilter{position}"), filter.value().clone()));
            }
        }
        clause.push_str(" then delete");
        lines.push(clause);
    }

    lines.push(output_lines(
        definition,
        &captured_columns,
        delete_only,
    ));
    if !captured_columns.is_empty() {
        lines.push("select * from @mergeResult;".to_string());
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(table = descriptor.table_name(), "built merge statement");

    Ok(MergeStatement {
        sql: lines.join("\n"),
        serializer,
        delete_filter_params,
    })
}

/// The columns the serialized batch must carry: the key columns first, then
/// the columns the requested operations read from `source`.
fn source_columns<T: Record>(
    definition: &MergeDefinition<T>,
) -> BuildResult<Vec<Arc<ColumnDescriptor<T>>>> {
    let descriptor = definition.descriptor();
    let operation_columns = match (
        definition.include_insert(),
        definition.include_update(),
        definition.include_delete(),
    ) {
        (true, false, _) => descriptor.insert_columns(),
        (true, true, _) => descriptor.upsert_columns(),
        (false, true, _) => descriptor.update_columns(),
        (false, false, true) => Vec::new(),
        (false, false, false) => {
            return Err(BuildError::argument(
                "at least one of insert, update, or delete must be included in the merge",
            ));
        }
    };

    let mut columns = descriptor.key_columns();
    for column in operation_columns {
        if !columns.iter().any(|existing| Arc::ptr_eq(existing, &column)) {
            columns.push(column);
        }
    }

    Ok(columns)
}

/// The output clause, directed into `@mergeResult` when entity columns are
/// captured.
fn output_lines<T: Record>(
    definition: &MergeDefinition<T>,
    captured_columns: &[Arc<ColumnDescriptor<T>>],
    delete_only: bool,
) -> String {
    // A delete-only merge never binds `source`, so the correlation index
    // cannot be echoed back.
    let correlation_source = if delete_only {
        "null".to_string()
    } else {
        format!("source.{}", bracket(CORRELATION_INDEX_COLUMN))
    };

    let mut output_columns = vec![
        format!("{correlation_source} as {}", bracket("CorrelationIndex")),
        format!("$action as {}", bracket("Action")),
    ];

    if captured_columns.is_empty() {
        return format!("output {};", output_columns.join(", "));
    }

    output_columns.push(format!("null as {}", bracket(SPLIT_COLUMN)));
    for column in captured_columns {
        let ident = column.ident();
        output_columns.push(if delete_only {
            format!("deleted.{ident}")
        } else if definition.include_delete() {
            // Only one pseudo-table is populated per output row, so with the
            // delete branch active the live one must be coalesced out.
            format!("coalesce(inserted.{ident}, deleted.{ident}) as {ident}")
        } else {
            format!("inserted.{ident}")
        });
    }

    let into_columns: Vec<_> = [
        bracket("CorrelationIndex"),
        bracket("Action"),
        bracket(SPLIT_COLUMN),
    ]
    .into_iter()
    .chain(
        captured_columns
            .iter()
            .map(|column| column.ident().to_string()),
    )
    .collect();

    format!(
        "output {} into @mergeResult({});",
        output_columns.join(", "),
        into_columns.join(", ")
    )
}
