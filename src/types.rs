use crate::status::{InitiativeStatus, KpiStatus, StatusSet};
use crate::util::{format_value, is_na, parse_number};
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// One cell of a numeric KPI column, kept close to what the sheet held.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    Value(f64),
    NotAvailable,
    Missing,
    Text(String),
}

impl Figure {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(s) = raw.map(str::trim) else {
            return Figure::Missing;
        };
        if s.is_empty() {
            Figure::Missing
        } else if is_na(s) {
            Figure::NotAvailable
        } else {
            match parse_number(Some(s)) {
                Some(v) => Figure::Value(v),
                None => Figure::Text(s.to_string()),
            }
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Figure::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// Missing or the `NA` sentinel.
    pub fn is_absent(&self) -> bool {
        matches!(self, Figure::Missing | Figure::NotAvailable)
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Figure::Value(v) => f.write_str(&format_value(*v)),
            Figure::NotAvailable => f.write_str("NA"),
            Figure::Missing => Ok(()),
            Figure::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyFigure {
    pub month: String,
    pub target: Figure,
    pub actual: Figure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiRecord {
    pub perspective: Option<String>,
    pub code: String,
    pub name: String,
    pub annual_target: Figure,
    pub measurement_type: String,
    pub ytd_achievement_type: Option<String>,
    /// One entry per `Actual <Month>` column, in column order.
    pub months: Vec<MonthlyFigure>,
    /// Actual for the reporting period.
    pub latest_actual: Figure,
    /// Target for the reporting period.
    pub period_target: Figure,
    pub achievement: Option<f64>,
}

impl KpiRecord {
    pub fn status(&self) -> KpiStatus {
        KpiStatus::classify(self.achievement)
    }

    pub fn month(&self, label: &str) -> Option<&MonthlyFigure> {
        self.months.iter().find(|m| m.month == label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiTable {
    pub records: Vec<KpiRecord>,
    /// Month labels from `Actual <Month>` headers, in header order.
    pub months: Vec<String>,
    /// Month whose achievement drives the status.
    pub period: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitiativeRecord {
    pub program: Option<String>,
    pub no: String,
    pub name: String,
    pub related_kpi: String,
    pub pic: String,
    pub status_label: String,
    pub percent_completed: String,
    pub deadline: String,
    pub milestone: String,
}

impl InitiativeRecord {
    pub fn status(&self) -> InitiativeStatus {
        InitiativeStatus::parse(&self.status_label)
    }
}

// ---- report rows ----

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct StatusCountRow {
    #[serde(rename = "Group")]
    #[tabled(rename = "Group")]
    pub group: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Color")]
    #[tabled(rename = "Color")]
    pub color: String,
}

impl StatusCountRow {
    pub fn new<S: StatusSet>(group: &str, status: S, count: usize) -> Self {
        Self {
            group: group.to_string(),
            status: status.to_string(),
            count,
            color: status.palette().background.to_string(),
        }
    }
}

/// One line of the KPI list. Three headers carry month names, so the row is
/// rendered through `headers`/`cells` rather than a derived table.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiTableRow {
    pub code: String,
    pub name: String,
    pub annual_target: String,
    pub first_actual: String,
    pub period_target: String,
    pub period_actual: String,
    pub measurement_type: String,
    pub status: String,
    pub style: String,
}

impl KpiTableRow {
    pub fn from_record(r: &KpiRecord) -> Self {
        let status = r.status();
        Self {
            code: r.code.clone(),
            name: r.name.clone(),
            annual_target: r.annual_target.to_string(),
            first_actual: r
                .months
                .first()
                .map(|m| m.actual.to_string())
                .unwrap_or_default(),
            period_target: r.period_target.to_string(),
            period_actual: r.latest_actual.to_string(),
            measurement_type: r.measurement_type.clone(),
            status: status.to_string(),
            style: status.palette().css(),
        }
    }

    /// Sheet column names: `Actual <first month>`, `Target <period>`, `Actual <period>`.
    pub fn headers(table: &KpiTable) -> Vec<String> {
        let first = table.months.first().map(String::as_str).unwrap_or("Jan");
        vec![
            "Kode KPI".to_string(),
            "KPI".to_string(),
            "Target Tahunan".to_string(),
            format!("Actual {first}"),
            format!("Target {}", table.period),
            format!("Actual {}", table.period),
            "Measurement Type".to_string(),
            "Status".to_string(),
            "Style".to_string(),
        ]
    }

    pub fn cells(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.name.clone(),
            self.annual_target.clone(),
            self.first_actual.clone(),
            self.period_target.clone(),
            self.period_actual.clone(),
            self.measurement_type.clone(),
            self.status.clone(),
            self.style.clone(),
        ]
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct BlackKpiRow {
    #[serde(rename = "Kode KPI")]
    #[tabled(rename = "Kode KPI")]
    pub code: String,
    #[serde(rename = "KPI")]
    #[tabled(rename = "KPI")]
    pub name: String,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct InitiativeTableRow {
    #[serde(rename = "no")]
    #[tabled(rename = "no")]
    pub no: String,
    #[serde(rename = "nama si")]
    #[tabled(rename = "nama si")]
    pub name: String,
    #[serde(rename = "related kpi")]
    #[tabled(rename = "related kpi")]
    pub related_kpi: String,
    #[serde(rename = "pic")]
    #[tabled(rename = "pic")]
    pub pic: String,
    #[serde(rename = "status")]
    #[tabled(rename = "status")]
    pub status: String,
    #[serde(rename = "% completed dod")]
    #[tabled(rename = "% completed dod")]
    pub percent_completed: String,
    #[serde(rename = "deadline")]
    #[tabled(rename = "deadline")]
    pub deadline: String,
    #[serde(rename = "milestone")]
    #[tabled(rename = "milestone")]
    pub milestone: String,
    #[serde(rename = "style")]
    #[tabled(rename = "style")]
    pub style: String,
}

impl InitiativeTableRow {
    pub fn from_record(r: &InitiativeRecord) -> Self {
        Self {
            no: r.no.clone(),
            name: r.name.clone(),
            related_kpi: r.related_kpi.clone(),
            pic: r.pic.clone(),
            status: r.status_label.clone(),
            percent_completed: r.percent_completed.clone(),
            deadline: r.deadline.clone(),
            milestone: r.milestone.clone(),
            style: r.status().palette().css(),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DetailPointRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Target Tahunan")]
    #[tabled(rename = "Target Tahunan")]
    pub annual_target: String,
    #[serde(rename = "Period Target")]
    #[tabled(rename = "Period Target")]
    pub period_target: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
    #[serde(rename = "Actual")]
    #[tabled(rename = "Actual")]
    pub actual: String,
}

// ---- chart payloads ----

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BarSeries {
    pub status: String,
    pub color: String,
    pub x: Vec<String>,
    pub y: Vec<usize>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DonutSlice {
    pub status: String,
    pub color: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ProgramDonut {
    pub program: String,
    pub total: usize,
    pub slices: Vec<DonutSlice>,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub generated_at: String,
    pub period: String,
    pub total_kpis: usize,
    pub global: Vec<BarSeries>,
    pub by_perspective: Vec<BarSeries>,
    pub black_kpis: Vec<BlackKpiRow>,
    pub programs: Option<Vec<ProgramDonut>>,
}
