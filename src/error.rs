use std::path::PathBuf;

use crate::schema::SchemaError;
use crate::sql::SqlParseError;

pub type Result<T, E = AnnotateError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid schema JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("SQL error: {0}")]
    Sql(#[from] SqlParseError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Table `{table}` not found in {}", .schema.display())]
    UnknownTable { table: String, schema: PathBuf },
    #[error("Annotation of {} is out of date", .0.display())]
    Frozen(PathBuf),
}

impl AnnotateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
