// ABOUTME: Table descriptors for project-scoped content tables
// ABOUTME: Builds validated schemas and the idempotent DDL that backs them

use crate::error::{StorageError, StorageResult};

/// Storage type of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text, stored as TEXT
    Text,
    /// Server-assigned position within a project (`max + 1` on insert)
    Order,
    /// JSON object stored as TEXT, defaults to `{}`
    JsonObject,
}

impl ColumnKind {
    fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Text | ColumnKind::JsonObject => "TEXT",
            ColumnKind::Order => "INTEGER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl ColumnDef {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
            nullable: true,
        }
    }

    pub const fn order(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Order,
            nullable: false,
        }
    }

    pub const fn json_object(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::JsonObject,
            nullable: false,
        }
    }

    /// Columns the server fills in itself; request payloads never set them
    pub fn is_server_managed(&self) -> bool {
        self.kind == ColumnKind::Order
    }
}

/// Columns every content table carries in addition to its declared ones
pub const RESERVED_COLUMNS: &[&str] = &["id", "project_id"];

/// A project-scoped table: `id`, `project_id` and the declared columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    table_name: String,
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>, columns: &[ColumnDef]) -> StorageResult<Self> {
        let table_name = table_name.into();
        validate_identifier(&table_name)?;

        if columns.is_empty() {
            return Err(StorageError::InvalidSchema(format!(
                "table '{}' declares no columns",
                table_name
            )));
        }

        let mut seen: Vec<&str> = Vec::with_capacity(columns.len());
        for column in columns {
            validate_identifier(column.name)?;
            if RESERVED_COLUMNS.contains(&column.name) {
                return Err(StorageError::InvalidSchema(format!(
                    "table '{}' redeclares reserved column '{}'",
                    table_name, column.name
                )));
            }
            if seen.contains(&column.name) {
                return Err(StorageError::InvalidSchema(format!(
                    "table '{}' declares column '{}' twice",
                    table_name, column.name
                )));
            }
            seen.push(column.name);
        }

        Ok(Self {
            table_name,
            columns: columns.to_vec(),
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns taken from request payloads, in declaration order
    pub fn writable_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.is_server_managed())
    }

    pub fn order_column(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.kind == ColumnKind::Order)
    }

    pub fn create_table_sql(&self) -> String {
        let mut ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    id TEXT PRIMARY KEY NOT NULL,\n    project_id TEXT NOT NULL",
            quote(&self.table_name)
        );

        for column in &self.columns {
            ddl.push_str(",\n    ");
            ddl.push_str(&quote(column.name));
            ddl.push(' ');
            ddl.push_str(column.kind.sql_type());
            if !column.nullable {
                ddl.push_str(" NOT NULL");
            }
            if column.kind == ColumnKind::JsonObject {
                ddl.push_str(" DEFAULT '{}'");
            }
        }

        ddl.push_str("\n)");
        ddl
    }

    pub fn create_index_sql(&self) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} (project_id)",
            quote(&format!("idx_{}_project_id", self.table_name)),
            quote(&self.table_name)
        )
    }
}

/// Identifiers end up spliced into SQL, so only `[a-z0-9_]` is accepted
pub fn validate_identifier(ident: &str) -> StorageResult<()> {
    let valid = !ident.is_empty()
        && !ident.starts_with(|c: char| c.is_ascii_digit())
        && ident
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidSchema(format!(
            "'{}' is not a valid identifier",
            ident
        )))
    }
}

/// Quote a validated identifier (`order` is an SQL keyword)
pub(crate) fn quote(ident: &str) -> String {
    format!("\"{}\"", ident)
}
