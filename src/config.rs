// Run settings: built-in defaults, then an optional TOML file, then
// `KPI_DASHBOARD_*` environment variables. CLI flags are applied last by main.
use crate::error::{DashboardError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub kpi_path: PathBuf,
    pub initiatives_path: PathBuf,
    pub delimiter: u8,
    /// Reporting month; `None` picks the last month with an achievement column.
    pub period: Option<String>,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kpi_path: "Dashboard 7.csv".into(),
            initiatives_path: "Strategic initiatives 10.csv".into(),
            delimiter: b',',
            period: None,
            output_dir: "reports".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    kpi_path: Option<PathBuf>,
    initiatives_path: Option<PathBuf>,
    delimiter: Option<String>,
    period: Option<String>,
    output_dir: Option<PathBuf>,
}

/// Accepts a single character or the names `tab`/`\t`.
pub fn parse_delimiter(s: &str) -> Option<u8> {
    match s {
        "tab" | "\\t" | "\t" => Some(b'\t'),
        _ => {
            let mut bytes = s.bytes();
            match (bytes.next(), bytes.next()) {
                (Some(b), None) => Some(b),
                _ => None,
            }
        }
    }
}

impl Settings {
    fn apply_file(&mut self, file: FileSettings) {
        if let Some(v) = file.kpi_path {
            self.kpi_path = v;
        }
        if let Some(v) = file.initiatives_path {
            self.initiatives_path = v;
        }
        if let Some(d) = file.delimiter.as_deref().and_then(parse_delimiter) {
            self.delimiter = d;
        }
        if let Some(v) = file.period {
            self.period = Some(v);
        }
        if let Some(v) = file.output_dir {
            self.output_dir = v;
        }
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("KPI_DASHBOARD_KPI_PATH") {
            self.kpi_path = v.into();
        }
        if let Some(v) = var("KPI_DASHBOARD_INITIATIVES_PATH") {
            self.initiatives_path = v.into();
        }
        if let Some(d) = var("KPI_DASHBOARD_DELIMITER").as_deref().and_then(parse_delimiter) {
            self.delimiter = d;
        }
        if let Some(v) = var("KPI_DASHBOARD_PERIOD") {
            self.period = Some(v);
        }
        if let Some(v) = var("KPI_DASHBOARD_OUTPUT_DIR") {
            self.output_dir = v.into();
        }
    }
}

/// An explicit `config` path must exist; the default file is optional.
/// Environment overrides are read through `var`.
pub fn load_settings_with(
    config: Option<&Path>,
    var: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let mut settings = Settings::default();
    let (path, required) = match config {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match std::fs::read_to_string(&path) {
        Ok(raw) => {
            let file: FileSettings =
                toml::from_str(&raw).map_err(|source| DashboardError::Config {
                    path: path.display().to_string(),
                    source,
                })?;
            settings.apply_file(file);
        }
        Err(e) if required || e.kind() != std::io::ErrorKind::NotFound => {
            return Err(DashboardError::io(path.display().to_string(), e));
        }
        Err(_) => {}
    }
    settings.apply_env(var);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn delimiter_names() {
        assert_eq!(parse_delimiter(","), Some(b','));
        assert_eq!(parse_delimiter(";"), Some(b';'));
        assert_eq!(parse_delimiter("tab"), Some(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Some(b'\t'));
        assert_eq!(parse_delimiter(",,"), None);
        assert_eq!(parse_delimiter(""), None);
    }

    #[test]
    fn file_then_env_layering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(
            &path,
            "kpi_path = \"kpi.tsv\"\ndelimiter = \"tab\"\nperiod = \"Mar\"\n",
        )
        .unwrap();
        let mut settings = load_settings_with(Some(&path), |_| None).unwrap();
        assert_eq!(settings.kpi_path, PathBuf::from("kpi.tsv"));
        assert_eq!(settings.delimiter, b'\t');
        assert_eq!(settings.period.as_deref(), Some("Mar"));
        assert_eq!(settings.output_dir, PathBuf::from("reports"));

        let env: HashMap<&str, &str> =
            HashMap::from([("KPI_DASHBOARD_PERIOD", "Jan"), ("KPI_DASHBOARD_DELIMITER", ";")]);
        settings.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.period.as_deref(), Some("Jan"));
        assert_eq!(settings.delimiter, b';');
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings_with(Some(&dir.path().join("nope.toml")), |_| None).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(&path, "colour = \"red\"\n").unwrap();
        assert!(matches!(
            load_settings_with(Some(&path), |_| None),
            Err(DashboardError::Config { .. })
        ));
    }
}
