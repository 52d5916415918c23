use crate::config::Settings;
use crate::error::{DashboardError, Result};
use crate::loader::{self, LoadReport};
use crate::output::{self, render_grid, render_table, section};
use crate::reports::{self, DetailChart};
use crate::session::Session;
use crate::types::{InitiativeRecord, KpiTable, KpiTableRow};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything one session works with.
pub struct Dashboard {
    pub kpis: KpiTable,
    pub initiatives: Option<Vec<InitiativeRecord>>,
    pub session: Session,
}

impl Dashboard {
    /// KPI problems are fatal; an absent or unusable initiatives sheet only
    /// disables the initiatives view.
    pub fn load(settings: &Settings) -> Result<(Self, LoadReport)> {
        let (kpis, report) = loader::load_kpis(
            &settings.kpi_path,
            settings.delimiter,
            settings.period.as_deref(),
        )?;
        let initiatives =
            match loader::load_initiatives(&settings.initiatives_path, settings.delimiter) {
                Ok(Some(rows)) => Some(rows),
                Ok(None) => {
                    warn!(
                        path = %settings.initiatives_path.display(),
                        "initiatives file not found; initiatives view disabled"
                    );
                    None
                }
                Err(e) => {
                    warn!(error = %e, "initiatives file unusable; initiatives view disabled");
                    None
                }
            };
        Ok((Self::new(kpis, initiatives), report))
    }

    pub fn new(kpis: KpiTable, initiatives: Option<Vec<InitiativeRecord>>) -> Self {
        let session = Session::new(&kpis.records, initiatives.as_deref());
        Self {
            kpis,
            initiatives,
            session,
        }
    }

    /// Apply `--perspective` / `--program`. A dimension with no values keeps
    /// its empty state and the views still render.
    pub fn apply_filters(&mut self, perspective: Option<String>, program: Option<String>) {
        if let Some(p) = perspective {
            if let Err(e) = self.session.select_perspective(p) {
                warn!(error = %e, "perspective filter ignored");
            }
        }
        if let Some(p) = program {
            if let Err(e) = self.session.select_program(p) {
                warn!(error = %e, "program filter ignored");
            }
        }
    }

    pub fn status_charts(&self) -> String {
        let records = &self.kpis.records;
        let global = reports::kpi_global_counts(records);
        let grouped = reports::kpi_perspective_counts(records);
        let mut out = section(
            "Total KPI Status (Global)",
            &render_table(&reports::count_rows("All", &global), "no KPIs"),
        );
        out.push_str(&section(
            "KPI Status per Perspective",
            &render_table(&reports::grouped_count_rows(&grouped), "no perspectives"),
        ));
        out
    }

    pub fn kpi_list(&self) -> String {
        let selector = match self.session.perspective() {
            Ok(s) => s,
            Err(e) => return format!("({e})\n\n"),
        };
        let rows: Vec<Vec<String>> =
            reports::kpi_table_rows(&self.kpis.records, selector.current())
                .iter()
                .map(KpiTableRow::cells)
                .collect();
        let mut out = format!("Filter Perspective: {}\n\n", selector.labels().join(" | "));
        out.push_str(&section(
            &format!("Daftar KPI untuk Perspective: {}", selector.current()),
            &render_grid(
                &KpiTableRow::headers(&self.kpis),
                &rows,
                "no KPIs for this perspective",
            ),
        ));
        out
    }

    pub fn black_list(&self) -> String {
        section(
            "Daftar KPI dengan Status Hitam (Data tidak lengkap)",
            &render_table(
                &reports::black_kpis(&self.kpis.records),
                "Tidak ada KPI dengan status Hitam.",
            ),
        )
    }

    pub fn detail(&self, code: &str) -> Result<String> {
        let record = self
            .kpis
            .records
            .iter()
            .find(|r| r.code == code)
            .ok_or_else(|| DashboardError::UnknownKpi(code.to_string()))?;
        Ok(match reports::build_detail(record, &self.kpis.months) {
            DetailChart::NoData => "Belum ada data yang tersedia untuk KPI ini.\n\n".to_string(),
            DetailChart::Series(series) => section(
                &format!("{} {} ({})", record.code, record.name, record.status()),
                &render_table(&reports::detail_rows(&series), "no months"),
            ),
        })
    }

    pub fn initiatives(&self) -> String {
        let Some(rows) = self.initiatives.as_deref() else {
            return "(Strategic initiatives unavailable)\n\n".to_string();
        };
        let grouped = reports::program_counts(rows);
        let mut out = section(
            "Strategic Initiatives per Program",
            &render_table(&reports::grouped_count_rows(&grouped), "no programs"),
        );
        let selector = match self.session.program() {
            Ok(s) => s,
            Err(e) => {
                out.push_str(&format!("({e})\n\n"));
                return out;
            }
        };
        let total = grouped.get(selector.current()).map_or(0, |c| c.total());
        out.push_str(&format!("Programs: {}\n\n", selector.labels().join(" | ")));
        out.push_str(&section(
            &format!(
                "Total Strategic Initiatives untuk {}: {}",
                selector.current(),
                total
            ),
            &render_table(
                &reports::initiative_table_rows(rows, selector.current()),
                "no initiatives for this program",
            ),
        ));
        out
    }

    pub fn summary(&self) -> String {
        [
            self.status_charts(),
            self.kpi_list(),
            self.black_list(),
            self.initiatives(),
        ]
        .concat()
    }

    /// Write the CSV tables and `dashboard.json` into `dir`; returns the paths written.
    pub fn export(&self, dir: &Path, generated_at: String) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .map_err(|e| DashboardError::io(dir.display().to_string(), e))?;
        let records = &self.kpis.records;
        let mut written = Vec::new();

        let path = dir.join("kpi_status_global.csv");
        output::write_csv(
            &path,
            &reports::count_rows("All", &reports::kpi_global_counts(records)),
        )?;
        written.push(path);

        let path = dir.join("kpi_status_by_perspective.csv");
        output::write_csv(
            &path,
            &reports::grouped_count_rows(&reports::kpi_perspective_counts(records)),
        )?;
        written.push(path);

        let path = dir.join("kpi_list.csv");
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|r| KpiTableRow::from_record(r).cells())
            .collect();
        output::write_grid_csv(&path, &KpiTableRow::headers(&self.kpis), &rows)?;
        written.push(path);

        let path = dir.join("kpi_black.csv");
        output::write_csv(&path, &reports::black_kpis(records))?;
        written.push(path);

        if let Some(rows) = self.initiatives.as_deref() {
            let path = dir.join("initiatives_by_program.csv");
            output::write_csv(
                &path,
                &reports::grouped_count_rows(&reports::program_counts(rows)),
            )?;
            written.push(path);
        }

        let summary =
            reports::generate_summary(&self.kpis, self.initiatives.as_deref(), generated_at);
        let path = dir.join("dashboard.json");
        output::write_json(&path, &summary)?;
        written.push(path);

        info!(dir = %dir.display(), files = written.len(), "exports written");
        Ok(written)
    }
}
