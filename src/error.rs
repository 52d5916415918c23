use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config file {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("column '{column}' not found in {file}")]
    MissingColumn { column: String, file: String },
    #[error("no {0} values present in the data")]
    NoCategories(&'static str),
    #[error("KPI '{0}' not found")]
    UnknownKpi(String),
}

impl DashboardError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
