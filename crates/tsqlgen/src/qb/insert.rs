//! INSERT statement synthesis.

use crate::qb::column_parameter;
use crate::table::{Record, TableDescriptor};

/// Build an insert statement.
///
/// When the table has generated columns, the statement declares a
/// table-shaped variable typed from them, directs an `output inserted.…`
/// clause into it, and finishes with `select * from @outputResult;` — one
/// round trip both writes the row and recovers every store-assigned value.
pub fn insert<T: Record>(descriptor: &TableDescriptor<T>) -> String {
    let insert_columns = descriptor.insert_columns();
    let column_list: Vec<_> = insert_columns
        .iter()
        .map(|column| column.ident().to_string())
        .collect();
    let parameter_list: Vec<_> = insert_columns
        .iter()
        .map(|column| column_parameter(column, false))
        .collect();

    let insert_line = format!(
        "insert into {}({})",
        descriptor.table_ident(),
        column_list.join(", ")
    );
    let values_line = format!("values({});", parameter_list.join(", "));

    let generated_columns = descriptor.generated_columns();

    #[cfg(feature = "tracing")]
    tracing::debug!(table = descriptor.table_name(), "built insert statement");

    if generated_columns.is_empty() {
        return format!("{insert_line}\n{values_line}");
    }

    let declared: Vec<_> = generated_columns
        .iter()
        .map(|column| format!("  {} {}", column.ident(), column.sql_type()))
        .collect();
    let output_list: Vec<_> = generated_columns
        .iter()
        .map(|column| format!("inserted.{}", column.ident()))
        .collect();
    let generated_list: Vec<_> = generated_columns
        .iter()
        .map(|column| column.ident().to_string())
        .collect();

    [
        "declare @outputResult table(".to_string(),
        declared.join(",\n"),
        ");".to_string(),
        insert_line,
        format!(
            "output {} into @outputResult({})",
            output_list.join(", "),
            generated_list.join(", ")
        ),
        values_line,
        "select * from @outputResult;".to_string(),
    ]
    .join("\n")
}
