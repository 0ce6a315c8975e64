//! Entity-relationship metadata read back from a live SQLite schema, and
//! renderers that turn it into Mermaid or Graphviz diagrams.

use std::fmt::Write as _;
use std::str::FromStr;

use rusqlite::Connection;

use crate::db::rows::query_list;
use crate::error::StoreResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyMeta {
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub on_delete: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub name: String,
    pub columns: Vec<ColumnMeta>,
    pub foreign_keys: Vec<ForeignKeyMeta>,
}

impl TableMeta {
    pub fn is_foreign_key(&self, column: &str) -> bool {
        self.foreign_keys.iter().any(|fk| fk.from_column == column)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMetadata {
    pub tables: Vec<TableMeta>,
}

impl SchemaMetadata {
    /// Read every user table, its columns, single-column unique keys and
    /// foreign keys, in creation order.
    pub fn introspect(conn: &Connection) -> StoreResult<Self> {
        let names: Vec<String> = query_list(
            conn,
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY rowid",
            [],
            |row| row.get(0),
        )?;

        let tables = names
            .into_iter()
            .map(|name| introspect_table(conn, name))
            .collect::<StoreResult<Vec<_>>>()?;

        Ok(Self { tables })
    }

    pub fn table(&self, name: &str) -> Option<&TableMeta> {
        self.tables.iter().find(|t| t.name == name)
    }
}

fn introspect_table(conn: &Connection, name: String) -> StoreResult<TableMeta> {
    let unique_indexes: Vec<String> = query_list(
        conn,
        "SELECT name FROM pragma_index_list(?1) WHERE \"unique\" = 1 AND origin = 'u'",
        [&name],
        |row| row.get(0),
    )?;

    let mut unique_columns = Vec::new();
    for index in &unique_indexes {
        let columns: Vec<String> = query_list(
            conn,
            "SELECT name FROM pragma_index_info(?1)",
            [index],
            |row| row.get(0),
        )?;
        // Composite keys (e.g. follower/followed pairs) do not make a column unique
        if let [column] = columns.as_slice() {
            unique_columns.push(column.clone());
        }
    }

    let mut columns: Vec<ColumnMeta> = query_list(
        conn,
        "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
        [&name],
        |row| {
            Ok(ColumnMeta {
                name: row.get(0)?,
                type_name: row.get(1)?,
                not_null: row.get::<_, i32>(2)? != 0,
                primary_key: row.get::<_, i32>(3)? != 0,
                unique: false,
            })
        },
    )?;
    for column in &mut columns {
        column.unique = unique_columns.contains(&column.name);
    }

    let foreign_keys = query_list(
        conn,
        "SELECT \"from\", \"table\", \"to\", on_delete FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
        [&name],
        |row| {
            Ok(ForeignKeyMeta {
                from_column: row.get(0)?,
                to_table: row.get(1)?,
                to_column: row.get(2)?,
                on_delete: row.get(3)?,
            })
        },
    )?;

    Ok(TableMeta {
        name,
        columns,
        foreign_keys,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagramFormat {
    #[default]
    Mermaid,
    Dot,
}

impl DiagramFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramFormat::Mermaid => "mermaid",
            DiagramFormat::Dot => "dot",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mermaid" | "mmd" => Some(DiagramFormat::Mermaid),
            "dot" | "graphviz" => Some(DiagramFormat::Dot),
            _ => None,
        }
    }
}

impl FromStr for DiagramFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown diagram format: {}", s))
    }
}

pub fn render(schema: &SchemaMetadata, format: DiagramFormat) -> String {
    match format {
        DiagramFormat::Mermaid => render_mermaid(schema),
        DiagramFormat::Dot => render_dot(schema),
    }
}

fn column_keys(table: &TableMeta, column: &ColumnMeta) -> Vec<&'static str> {
    let mut keys = Vec::new();
    if column.primary_key {
        keys.push("PK");
    }
    if table.is_foreign_key(&column.name) {
        keys.push("FK");
    }
    if column.unique {
        keys.push("UK");
    }
    keys
}

// writeln! into a String cannot fail
pub fn render_mermaid(schema: &SchemaMetadata) -> String {
    let mut out = String::from("erDiagram\n");

    for table in &schema.tables {
        let _ = writeln!(out, "    {} {{", table.name);
        for column in &table.columns {
            let keys = column_keys(table, column);
            let _ = write!(out, "        {} {}", column.type_name, column.name);
            if !keys.is_empty() {
                let _ = write!(out, " {}", keys.join(", "));
            }
            out.push('\n');
        }
        out.push_str("    }\n");
    }

    for table in &schema.tables {
        for fk in &table.foreign_keys {
            let _ = writeln!(
                out,
                "    {} ||--o{{ {} : \"{}\"",
                fk.to_table, table.name, fk.from_column
            );
        }
    }

    out
}

fn escape_record(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '{' | '}' | '|' | '<' | '>' | '"' => vec!['\\', c],
            _ => vec![c],
        })
        .collect()
}

pub fn render_dot(schema: &SchemaMetadata) -> String {
    let mut out = String::from("digraph snapfeed {\n    rankdir=LR;\n    node [shape=record];\n");

    for table in &schema.tables {
        let fields: Vec<String> = table
            .columns
            .iter()
            .map(|column| {
                let keys = column_keys(table, column);
                let suffix = if keys.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", keys.join(", "))
                };
                escape_record(&format!("{} : {}{}", column.name, column.type_name, suffix))
            })
            .collect();
        let _ = writeln!(
            out,
            "    {} [label=\"{{{}|{}\\l}}\"];",
            table.name,
            escape_record(&table.name),
            fields.join("\\l")
        );
    }

    for table in &schema.tables {
        for fk in &table.foreign_keys {
            let _ = writeln!(
                out,
                "    {} -> {} [label=\"{} (on delete {})\"];",
                table.name,
                fk.to_table,
                fk.from_column,
                fk.on_delete.to_lowercase()
            );
        }
    }

    out.push_str("}\n");
    out
}
