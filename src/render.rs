//! Renderer turning a table description into the annotation block.

use crate::measure::{max_width, pad};
use crate::options::Options;
use crate::schema::{Column, ForeignKey, Index, Table};

/// Minimum width of the type column.
pub const BARE_TYPE_ALLOWANCE: usize = 16;

pub(crate) const TABLE_NAME_LABEL: &str = "Table name:";
pub(crate) const INDEXES_TITLE: &str = "Indexes";
pub(crate) const FOREIGN_KEYS_TITLE: &str = "Foreign Keys";

/// Render `table` as an annotation block opened by `header`.
///
/// The block always ends with a bare comment line. A table without columns
/// renders the header alone.
pub fn render(table: &Table, header: &str, options: &Options) -> String {
    let prefix = options.comment_prefix.as_str();
    let mut output = String::new();

    push_line(&mut output, prefix, header);
    push_line(&mut output, prefix, "");

    if table.columns().is_empty() {
        return output;
    }

    push_line(&mut output, prefix, &format!("{} {}", TABLE_NAME_LABEL, table.name()));
    push_line(&mut output, prefix, "");
    render_columns(&mut output, prefix, table);
    push_line(&mut output, prefix, "");

    if options.show_indexes && !table.indexes().is_empty() {
        render_indexes(&mut output, prefix, table.indexes());
    }

    if options.show_foreign_keys && !table.foreign_keys().is_empty() {
        render_foreign_keys(&mut output, prefix, table.foreign_keys());
    }

    output
}

fn push_line(output: &mut String, prefix: &str, text: &str) {
    output.push_str(prefix);
    let text = text.trim_end();
    if !text.is_empty() {
        output.push(' ');
        output.push_str(text);
    }
    output.push('\n');
}

fn render_columns(output: &mut String, prefix: &str, table: &Table) {
    let labels: Vec<String> = table.columns().iter().map(type_label).collect();

    let name_width = max_width(table.columns().iter().map(Column::name)) + 1;
    let type_width = (max_width(labels.iter().map(String::as_str)) + 1).max(BARE_TYPE_ALLOWANCE);

    for (column, label) in table.columns().iter().zip(&labels) {
        let attributes = column_attributes(table, column);
        push_line(
            output,
            prefix,
            &format!(
                " {}:{} {}",
                pad(column.name(), name_width),
                pad(label, type_width),
                attributes.join(", ")
            ),
        );
    }
}

fn type_label(column: &Column) -> String {
    match column.limit() {
        Some(limit) => format!("{}({})", column.ty(), limit),
        None => column.ty().to_string(),
    }
}

// Order: default, not null, primary key.
fn column_attributes(table: &Table, column: &Column) -> Vec<String> {
    let mut attributes = Vec::new();

    if let Some(value) = column.default() {
        if column.ty().is_textual() {
            attributes.push(format!("default(\"{}\")", value));
        } else {
            attributes.push(format!("default({})", value));
        }
    }
    if !column.is_nullable() {
        attributes.push("not null".to_string());
    }
    if table.is_primary_key(column) {
        attributes.push("primary key".to_string());
    }

    attributes
}

fn render_indexes(output: &mut String, prefix: &str, indexes: &[Index]) {
    let mut sorted: Vec<&Index> = indexes.iter().collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));

    let name_width = max_width(sorted.iter().map(|i| i.name())) + 1;

    push_line(output, prefix, INDEXES_TITLE);
    push_line(output, prefix, "");
    for index in sorted {
        let unique = if index.is_unique() { " UNIQUE" } else { "" };
        push_line(
            output,
            prefix,
            &format!(
                " {} ({}){}",
                pad(index.name(), name_width),
                index.columns().join(","),
                unique
            ),
        );
    }
    push_line(output, prefix, "");
}

fn render_foreign_keys(output: &mut String, prefix: &str, foreign_keys: &[ForeignKey]) {
    let mut sorted: Vec<&ForeignKey> = foreign_keys.iter().collect();
    sorted.sort_by(|a, b| a.name().cmp(b.name()));

    let name_width = max_width(sorted.iter().map(|fk| fk.name())) + 1;

    push_line(output, prefix, FOREIGN_KEYS_TITLE);
    push_line(output, prefix, "");
    for fk in sorted {
        let mut line = format!(
            " {} ({} => {}.{})",
            pad(fk.name(), name_width),
            fk.column(),
            fk.to_table(),
            fk.primary_key()
        );
        if let Some(action) = fk.delete_action() {
            line.push_str(&format!(" ON DELETE => {}", action));
        }
        if let Some(action) = fk.update_action() {
            line.push_str(&format!(" ON UPDATE => {}", action));
        }
        push_line(output, prefix, &line);
    }
    push_line(output, prefix, "");
}
