use crate::status::{InitiativeStatus, KpiStatus, StatusSet};
use crate::types::{
    BarSeries, BlackKpiRow, DashboardSummary, DetailPointRow, DonutSlice, InitiativeRecord,
    InitiativeTableRow, KpiRecord, KpiTable, KpiTableRow, ProgramDonut, StatusCountRow,
};
use crate::util::format_value;
use std::collections::HashMap;

/// Per-status counts for one group of records.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCounts<S: StatusSet> {
    counts: HashMap<S, usize>,
    total: usize,
}

impl<S: StatusSet> Default for StatusCounts<S> {
    fn default() -> Self {
        Self {
            counts: HashMap::new(),
            total: 0,
        }
    }
}

impl<S: StatusSet> StatusCounts<S> {
    pub fn add(&mut self, status: S) {
        *self.counts.entry(status).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn get(&self, status: S) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Every status of the set in display order, zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (S, usize)> + '_ {
        S::DISPLAY_ORDER.iter().map(move |s| (*s, self.get(*s)))
    }
}

impl<S: StatusSet> FromIterator<S> for StatusCounts<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut counts = Self::default();
        for s in iter {
            counts.add(s);
        }
        counts
    }
}

pub fn tally<S: StatusSet>(statuses: impl IntoIterator<Item = S>) -> StatusCounts<S> {
    statuses.into_iter().collect()
}

/// Counts per group, in the order groups were first seen.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedCounts<S: StatusSet> {
    groups: Vec<(String, StatusCounts<S>)>,
}

impl<S: StatusSet> GroupedCounts<S> {
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(g, _)| g.as_str())
    }

    pub fn get(&self, group: &str) -> Option<&StatusCounts<S>> {
        self.groups.iter().find(|(g, _)| g == group).map(|(_, c)| c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatusCounts<S>)> {
        self.groups.iter().map(|(g, c)| (g.as_str(), c))
    }
}

/// Records with no group value are left out.
pub fn group_by<'a, T, S, K, F>(records: &'a [T], key: K, status: F) -> GroupedCounts<S>
where
    S: StatusSet,
    K: Fn(&'a T) -> Option<&'a str>,
    F: Fn(&T) -> S,
{
    let mut groups: Vec<(String, StatusCounts<S>)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for r in records {
        let Some(k) = key(r) else { continue };
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k.to_string(), StatusCounts::default()));
            groups.len() - 1
        });
        groups[slot].1.add(status(r));
    }
    GroupedCounts { groups }
}

/// Distinct non-empty values in first-seen order.
pub fn categories<'a, T>(
    records: &'a [T],
    key: impl Fn(&'a T) -> Option<&'a str>,
) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter_map(key)
        .filter(|k| seen.insert(*k))
        .map(str::to_string)
        .collect()
}

// ---- KPI views ----

pub fn kpi_global_counts(records: &[KpiRecord]) -> StatusCounts<KpiStatus> {
    tally(records.iter().map(KpiRecord::status))
}

pub fn kpi_perspective_counts(records: &[KpiRecord]) -> GroupedCounts<KpiStatus> {
    group_by(records, |r| r.perspective.as_deref(), KpiRecord::status)
}

pub fn count_rows<S: StatusSet>(group: &str, counts: &StatusCounts<S>) -> Vec<StatusCountRow> {
    counts
        .iter()
        .map(|(s, n)| StatusCountRow::new(group, s, n))
        .collect()
}

pub fn grouped_count_rows<S: StatusSet>(grouped: &GroupedCounts<S>) -> Vec<StatusCountRow> {
    grouped
        .iter()
        .flat_map(|(g, c)| count_rows(g, c))
        .collect()
}

/// One series per status (display order) with one point per group.
pub fn stacked_bars<S: StatusSet>(grouped: &GroupedCounts<S>) -> Vec<BarSeries> {
    S::DISPLAY_ORDER
        .iter()
        .map(|s| BarSeries {
            status: s.to_string(),
            color: s.palette().background.to_string(),
            x: grouped.groups().map(str::to_string).collect(),
            y: grouped.iter().map(|(_, c)| c.get(*s)).collect(),
        })
        .collect()
}

pub fn global_bars(counts: &StatusCounts<KpiStatus>) -> Vec<BarSeries> {
    counts
        .iter()
        .map(|(s, n)| BarSeries {
            status: s.to_string(),
            color: s.palette().background.to_string(),
            x: vec![s.to_string()],
            y: vec![n],
        })
        .collect()
}

pub fn kpi_rows_for<'a>(
    records: &'a [KpiRecord],
    perspective: &'a str,
) -> impl Iterator<Item = &'a KpiRecord> {
    records
        .iter()
        .filter(move |r| r.perspective.as_deref() == Some(perspective))
}

pub fn kpi_table_rows(records: &[KpiRecord], perspective: &str) -> Vec<KpiTableRow> {
    kpi_rows_for(records, perspective)
        .map(KpiTableRow::from_record)
        .collect()
}

pub fn black_kpis(records: &[KpiRecord]) -> Vec<BlackKpiRow> {
    records
        .iter()
        .filter(|r| r.status() == KpiStatus::Hitam)
        .map(|r| BlackKpiRow {
            code: r.code.clone(),
            name: r.name.clone(),
        })
        .collect()
}

// ---- initiative views ----

pub fn program_counts(records: &[InitiativeRecord]) -> GroupedCounts<InitiativeStatus> {
    group_by(records, |r| r.program.as_deref(), InitiativeRecord::status)
}

/// Known statuses always get a slice; `Other` only when something fell outside them.
pub fn program_donuts(grouped: &GroupedCounts<InitiativeStatus>) -> Vec<ProgramDonut> {
    grouped
        .iter()
        .map(|(program, counts)| ProgramDonut {
            program: program.to_string(),
            total: counts.total(),
            slices: counts
                .iter()
                .filter(|(s, n)| *s != InitiativeStatus::Unrecognized || *n > 0)
                .map(|(s, n)| DonutSlice {
                    status: s.to_string(),
                    color: s.palette().background.to_string(),
                    count: n,
                })
                .collect(),
        })
        .collect()
}

pub fn initiative_table_rows(
    records: &[InitiativeRecord],
    program: &str,
) -> Vec<InitiativeTableRow> {
    records
        .iter()
        .filter(|r| r.program.as_deref() == Some(program))
        .map(InitiativeTableRow::from_record)
        .collect()
}

// ---- detail chart ----

#[derive(Debug, Clone, PartialEq)]
pub enum DetailChart {
    /// Latest actual is missing or `NA`.
    NoData,
    Series(DetailSeries),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailSeries {
    months: Vec<String>,
    annual_target: Option<f64>,
    targets: Vec<Option<f64>>,
    actuals: Vec<Option<f64>>,
    period_target: Option<f64>,
}

impl DetailSeries {
    pub fn months(&self) -> &[String] {
        &self.months
    }

    pub fn annual_target(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        let v = self.annual_target;
        self.months.iter().map(move |m| (m.as_str(), v))
    }

    /// Each month's own target column.
    pub fn monthly_targets(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        self.months
            .iter()
            .map(String::as_str)
            .zip(self.targets.iter().copied())
    }

    /// Gaps stay `None`; they are never zero-filled.
    pub fn actuals(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        self.months
            .iter()
            .map(String::as_str)
            .zip(self.actuals.iter().copied())
    }

    pub fn period_target(&self) -> Option<impl Iterator<Item = (&str, f64)> + '_> {
        let v = self.period_target?;
        Some(self.months.iter().map(move |m| (m.as_str(), v)))
    }
}

pub fn build_detail(record: &KpiRecord, months: &[String]) -> DetailChart {
    if record.latest_actual.is_absent() {
        return DetailChart::NoData;
    }
    let is_sum = record
        .ytd_achievement_type
        .as_deref()
        .is_some_and(|t| t.trim() == "SUM");
    DetailChart::Series(DetailSeries {
        months: months.to_vec(),
        annual_target: record.annual_target.value(),
        targets: months
            .iter()
            .map(|m| record.month(m).and_then(|f| f.target.value()))
            .collect(),
        actuals: months
            .iter()
            .map(|m| record.month(m).and_then(|f| f.actual.value()))
            .collect(),
        period_target: if is_sum {
            record.period_target.value()
        } else {
            None
        },
    })
}

pub fn detail_rows(series: &DetailSeries) -> Vec<DetailPointRow> {
    let fmt = |v: Option<f64>| v.map(format_value).unwrap_or_default();
    let period: Vec<Option<f64>> = match series.period_target() {
        Some(line) => line.map(|(_, v)| Some(v)).collect(),
        None => vec![None; series.months().len()],
    };
    series
        .annual_target()
        .zip(series.monthly_targets())
        .zip(series.actuals())
        .zip(period)
        .map(
            |((((month, annual), (_, target)), (_, actual)), pt)| DetailPointRow {
                month: month.to_string(),
                annual_target: fmt(annual),
                period_target: fmt(pt),
                target: fmt(target),
                actual: fmt(actual),
            },
        )
        .collect()
}

pub fn generate_summary(
    kpis: &KpiTable,
    initiatives: Option<&[InitiativeRecord]>,
    generated_at: String,
) -> DashboardSummary {
    DashboardSummary {
        generated_at,
        period: kpis.period.clone(),
        total_kpis: kpis.records.len(),
        global: global_bars(&kpi_global_counts(&kpis.records)),
        by_perspective: stacked_bars(&kpi_perspective_counts(&kpis.records)),
        black_kpis: black_kpis(&kpis.records),
        programs: initiatives.map(|rows| program_donuts(&program_counts(rows))),
    }
}
