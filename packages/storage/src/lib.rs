// ABOUTME: Persistence layer for PlanKit projects and plan-document content
// ABOUTME: Schema registry, generic row storage, project cascade and database setup

pub mod codec;
pub mod db;
pub mod error;
pub mod projects;
pub mod registry;
pub mod rows;
pub mod schema;

pub use codec::{decode, encode, RowValues, SectionRow, StoredRow};
pub use db::{connect, ensure_tables, run_migrations, MIGRATOR};
pub use error::{StorageError, StorageResult};
pub use projects::{Project, ProjectCreateInput, ProjectStorage};
pub use registry::{NamedResource, SchemaRegistry, SectionDeclaration, SectionInfo, SectionTable};
pub use rows::RowStorage;
pub use schema::{ColumnDef, ColumnKind, TableSchema};
