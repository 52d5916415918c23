use crate::error::{DashboardError, Result};
use serde::Serialize;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()
        .map_err(|e| DashboardError::io(path.display().to_string(), e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|e| DashboardError::io(path.display().to_string(), e))?;
    Ok(())
}

/// CSV with caller-supplied headers, for rows whose column names depend on the data.
pub fn write_grid_csv(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(headers)?;
    for r in rows {
        wtr.write_record(r)?;
    }
    wtr.flush()
        .map_err(|e| DashboardError::io(path.display().to_string(), e))?;
    Ok(())
}

/// Markdown table, or `empty` when there is nothing to show.
pub fn render_table<T: Tabled + Clone>(rows: &[T], empty: &str) -> String {
    if rows.is_empty() {
        return format!("({empty})");
    }
    Table::new(rows.to_vec()).with(Style::markdown()).to_string()
}

/// `render_table` for dynamic headers.
pub fn render_grid(headers: &[String], rows: &[Vec<String>], empty: &str) -> String {
    if rows.is_empty() {
        return format!("({empty})");
    }
    let mut builder = Builder::default();
    builder.push_record(headers.to_vec());
    for r in rows {
        builder.push_record(r.clone());
    }
    builder.build().with(Style::markdown()).to_string()
}

/// Title line followed by a rendered table.
pub fn section(title: &str, body: &str) -> String {
    format!("{title}\n\n{body}\n\n")
}
