use crate::error::{DashboardError, Result};
use crate::types::{Figure, InitiativeRecord, KpiRecord, KpiTable, MonthlyFigure};
use crate::util::parse_number;
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

pub const KPI_REQUIRED: [&str; 11] = [
    "Perspective",
    "Kode KPI",
    "KPI",
    "Target Tahunan",
    "Measurement Type",
    "Target Jan",
    "Actual Jan",
    "Achv Jan",
    "Target Feb",
    "Actual Feb",
    "Achv Feb",
];

pub const INITIATIVE_REQUIRED: [&str; 9] = [
    "program",
    "status",
    "no",
    "nama si",
    "related kpi",
    "pic",
    "% completed dod",
    "deadline",
    "milestone",
];

const YTD_TYPE: &str = "YTD Achievement Type";

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub incomplete_rows: usize,
}

/// Header name -> column index.
struct Columns {
    file: String,
    index: HashMap<String, usize>,
}

impl Columns {
    fn new(file: &str, headers: impl Iterator<Item = String>) -> Self {
        let mut index = HashMap::new();
        for (i, h) in headers.enumerate() {
            index.entry(h).or_insert(i);
        }
        Self {
            file: file.to_string(),
            index,
        }
    }

    fn require(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|n| !self.index.contains_key(**n)) {
            Some(missing) => Err(DashboardError::MissingColumn {
                column: missing.to_string(),
                file: self.file.clone(),
            }),
            None => Ok(()),
        }
    }

    fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn get<'r>(&self, row: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.index.get(name).and_then(|i| row.get(*i))
    }

    fn text(&self, row: &StringRecord, name: &str) -> String {
        self.get(row, name).unwrap_or("").trim().to_string()
    }

    /// Trimmed value, with blanks treated as absent.
    fn category(&self, row: &StringRecord, name: &str) -> Option<String> {
        self.get(row, name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

fn reader(path: &Path, delimiter: u8) -> Result<csv::Reader<std::fs::File>> {
    let file =
        std::fs::File::open(path).map_err(|e| DashboardError::io(path.display().to_string(), e))?;
    Ok(ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(file))
}

/// Month labels taken from `Actual <Month>` headers, in header order.
pub fn month_labels(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .filter_map(|h| h.strip_prefix("Actual "))
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect()
}

/// Last month that carries both an actual and an achievement column.
fn default_period(columns: &Columns, months: &[String]) -> Option<String> {
    months
        .iter()
        .rev()
        .find(|m| columns.has(&format!("Achv {m}")))
        .cloned()
}

pub fn load_kpis(
    path: impl AsRef<Path>,
    delimiter: u8,
    period: Option<&str>,
) -> Result<(KpiTable, LoadReport)> {
    let path = path.as_ref();
    let mut rdr = reader(path, delimiter)?;
    let headers = rdr.headers()?.clone();
    let columns = Columns::new(
        &path.display().to_string(),
        headers.iter().map(|h| h.to_string()),
    );
    columns.require(&KPI_REQUIRED)?;

    let months = month_labels(&headers);
    let period = match period {
        Some(p) => {
            let p = p.trim().to_string();
            let actual = format!("Actual {p}");
            let achv = format!("Achv {p}");
            columns.require(&[actual.as_str(), achv.as_str()])?;
            p
        }
        // The required set guarantees `Actual Feb` and `Achv Feb`.
        None => default_period(&columns, &months).unwrap_or_else(|| "Feb".to_string()),
    };
    debug!(?months, %period, "kpi columns resolved");

    let achv_col = format!("Achv {period}");
    let actual_col = format!("Actual {period}");
    let target_col = format!("Target {period}");

    let mut records = Vec::new();
    let mut incomplete_rows = 0usize;
    for result in rdr.records() {
        let row = result?;
        let achievement = parse_number(columns.get(&row, &achv_col));
        if achievement.is_none() {
            incomplete_rows += 1;
        }
        let monthly = months
            .iter()
            .map(|m| MonthlyFigure {
                month: m.clone(),
                target: Figure::from_raw(columns.get(&row, &format!("Target {m}"))),
                actual: Figure::from_raw(columns.get(&row, &format!("Actual {m}"))),
            })
            .collect();

        records.push(KpiRecord {
            perspective: columns.category(&row, "Perspective"),
            code: columns.text(&row, "Kode KPI"),
            name: columns.text(&row, "KPI"),
            annual_target: Figure::from_raw(columns.get(&row, "Target Tahunan")),
            measurement_type: columns.text(&row, "Measurement Type"),
            ytd_achievement_type: columns.category(&row, YTD_TYPE),
            months: monthly,
            latest_actual: Figure::from_raw(columns.get(&row, &actual_col)),
            period_target: Figure::from_raw(columns.get(&row, &target_col)),
            achievement,
        });
    }

    let report = LoadReport {
        total_rows: records.len(),
        incomplete_rows,
    };
    info!(
        rows = report.total_rows,
        incomplete = report.incomplete_rows,
        "loaded kpi table"
    );
    Ok((
        KpiTable {
            records,
            months,
            period,
        },
        report,
    ))
}

/// Reads the initiatives sheet. A file that does not exist yields `Ok(None)`.
pub fn load_initiatives(
    path: impl AsRef<Path>,
    delimiter: u8,
) -> Result<Option<Vec<InitiativeRecord>>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let mut rdr = reader(path, delimiter)?;
    let headers = rdr.headers()?.clone();
    let columns = Columns::new(
        &path.display().to_string(),
        headers.iter().map(|h| h.trim().to_lowercase()),
    );
    columns.require(&INITIATIVE_REQUIRED)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        records.push(InitiativeRecord {
            program: columns.category(&row, "program"),
            no: columns.text(&row, "no"),
            name: columns.text(&row, "nama si"),
            related_kpi: columns.text(&row, "related kpi"),
            pic: columns.text(&row, "pic"),
            status_label: columns.text(&row, "status"),
            percent_completed: columns.text(&row, "% completed dod"),
            deadline: columns.text(&row, "deadline"),
            milestone: columns.text(&row, "milestone"),
        });
    }
    info!(rows = records.len(), "loaded initiatives table");
    Ok(Some(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const KPI_HEADER: &str = "Perspective,Kode KPI,KPI,Target Tahunan,Measurement Type,Target Jan,Actual Jan,Achv Jan,Target Feb,Actual Feb,Achv Feb,YTD Achievement Type";

    fn write_tmp(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn loads_kpis_and_derives_achievement() {
        let f = write_tmp(&format!(
            "{KPI_HEADER}\n\
             Financial,F1,Revenue,100,Max,10,9,90%,20,19,\"95,5%\",SUM\n\
             Customer,C1,NPS,80,Max,5,5,100%,5,NA,NA,\n"
        ));
        let (table, report) = load_kpis(f.path(), b',', None).unwrap();
        assert_eq!(table.months, vec!["Jan".to_string(), "Feb".to_string()]);
        assert_eq!(table.period, "Feb");
        assert_eq!(
            report,
            LoadReport {
                total_rows: 2,
                incomplete_rows: 1
            }
        );

        let f1 = &table.records[0];
        assert_eq!(f1.perspective.as_deref(), Some("Financial"));
        assert_eq!(f1.achievement, Some(95.5));
        assert_eq!(f1.ytd_achievement_type.as_deref(), Some("SUM"));
        assert_eq!(f1.period_target, Figure::Value(20.0));
        assert_eq!(f1.months[0].actual, Figure::Value(9.0));

        let c1 = &table.records[1];
        assert_eq!(c1.achievement, None);
        assert_eq!(c1.latest_actual, Figure::NotAvailable);
        assert_eq!(c1.ytd_achievement_type, None);
    }

    #[test]
    fn missing_required_kpi_column_is_fatal() {
        let f = write_tmp("Perspective,Kode KPI,KPI\nFinancial,F1,Revenue\n");
        let err = load_kpis(f.path(), b',', None).unwrap_err();
        match err {
            DashboardError::MissingColumn { column, .. } => assert_eq!(column, "Target Tahunan"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn months_follow_header_order_and_period_picks_last_with_achievement() {
        let f = write_tmp(
            "Perspective,Kode KPI,KPI,Target Tahunan,Measurement Type,Target Jan,Actual Jan,Achv Jan,Target Mar,Actual Mar,Achv Mar,Target Feb,Actual Feb,Achv Feb,Actual Apr\n\
             P,K,Name,1,Max,1,1,1,1,1,50,1,1,80,\n",
        );
        let (table, _) = load_kpis(f.path(), b',', None).unwrap();
        assert_eq!(table.months, vec!["Jan", "Mar", "Feb", "Apr"]);
        assert_eq!(table.period, "Feb");
        assert_eq!(table.records[0].achievement, Some(80.0));

        let (table, _) = load_kpis(f.path(), b',', Some("Mar")).unwrap();
        assert_eq!(table.period, "Mar");
        assert_eq!(table.records[0].achievement, Some(50.0));

        assert!(load_kpis(f.path(), b',', Some("Apr")).is_err());
    }

    #[test]
    fn tab_delimited_kpis_load() {
        let f = write_tmp(&format!(
            "{}\nFinancial\tF1\tRevenue\t100\tMax\t1\t1\t70\t1\t1\t70\t\n",
            KPI_HEADER.replace(',', "\t")
        ));
        let (table, _) = load_kpis(f.path(), b'\t', None).unwrap();
        assert_eq!(table.records[0].achievement, Some(70.0));
    }

    #[test]
    fn blank_perspective_is_absent() {
        let f = write_tmp(&format!("{KPI_HEADER}\n  ,F1,Revenue,100,Max,1,1,1,1,1,1,\n"));
        let (table, _) = load_kpis(f.path(), b',', None).unwrap();
        assert_eq!(table.records[0].perspective, None);
    }

    #[test]
    fn initiative_headers_are_normalized() {
        let f = write_tmp(
            " Program ,STATUS,No,Nama SI,Related KPI,PIC,% Completed DoD,Deadline,Milestone\n\
             Digital,On Track,1,Portal,K1,Ops,50%,2024-06-30,Beta\n\
             Digital,Cancelled,2,Legacy,K2,IT,0%,2024-12-31,None\n",
        );
        let rows = load_initiatives(f.path(), b',').unwrap().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].program.as_deref(), Some("Digital"));
        assert_eq!(rows[0].name, "Portal");
        assert_eq!(rows[1].status_label, "Cancelled");
    }

    #[test]
    fn missing_initiatives_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = load_initiatives(dir.path().join("absent.csv"), b',').unwrap();
        assert!(res.is_none());
    }

    #[test]
    fn initiatives_missing_column_is_reported() {
        let f = write_tmp("program,status\nDigital,Done\n");
        assert!(matches!(
            load_initiatives(f.path(), b','),
            Err(DashboardError::MissingColumn { .. })
        ));
    }
}
