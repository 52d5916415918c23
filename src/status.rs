// Status classification and the fixed status sets used for display.
use std::fmt;
use std::hash::Hash;

/// A closed set of statuses with a fixed display order.
pub trait StatusSet: Copy + Eq + Hash + fmt::Display + 'static {
    /// Every member, in the order charts and count tables list them.
    const DISPLAY_ORDER: &'static [Self];

    fn palette(&self) -> Palette;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub foreground: &'static str,
}

const WHITE: &str = "#ffffff";
const BLACK: &str = "#000000";

impl Palette {
    const fn new(background: &'static str, foreground: &'static str) -> Self {
        Self {
            background,
            foreground,
        }
    }

    pub fn css(&self) -> String {
        format!(
            "background-color: {}; color: {};",
            self.background, self.foreground
        )
    }
}

/// KPI health, derived from the achievement percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KpiStatus {
    /// Incomplete data.
    Hitam,
    Merah,
    Kuning,
    Hijau,
}

impl KpiStatus {
    /// Total over every input. `70 <= a <= 99` is Yellow and anything above 99,
    /// however small the excess, is Green.
    pub fn classify(achievement: Option<f64>) -> Self {
        match achievement {
            Some(a) if a.is_nan() => KpiStatus::Hitam,
            None => KpiStatus::Hitam,
            Some(a) if a < 70.0 => KpiStatus::Merah,
            Some(a) if a <= 99.0 => KpiStatus::Kuning,
            Some(_) => KpiStatus::Hijau,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            KpiStatus::Hitam => "Hitam",
            KpiStatus::Merah => "Merah",
            KpiStatus::Kuning => "Kuning",
            KpiStatus::Hijau => "Hijau",
        }
    }
}

impl fmt::Display for KpiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl StatusSet for KpiStatus {
    const DISPLAY_ORDER: &'static [Self] = &[
        KpiStatus::Hitam,
        KpiStatus::Hijau,
        KpiStatus::Kuning,
        KpiStatus::Merah,
    ];

    fn palette(&self) -> Palette {
        match self {
            KpiStatus::Merah => Palette::new("#b42020", WHITE),
            KpiStatus::Kuning => Palette::new("#ffe600", BLACK),
            KpiStatus::Hijau => Palette::new("#1bb934", WHITE),
            KpiStatus::Hitam => Palette::new("#222222", WHITE),
        }
    }
}

/// Progress label of a strategic initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitiativeStatus {
    UnspecifiedTimeline,
    UnspecifiedDod,
    NotStarted,
    Achieved,
    Done,
    Delay,
    AtRisk,
    OnTrack,
    /// Any label outside the known set; the record keeps the raw text.
    Unrecognized,
}

impl InitiativeStatus {
    pub const KNOWN: [InitiativeStatus; 8] = [
        InitiativeStatus::UnspecifiedTimeline,
        InitiativeStatus::UnspecifiedDod,
        InitiativeStatus::NotStarted,
        InitiativeStatus::Achieved,
        InitiativeStatus::Done,
        InitiativeStatus::Delay,
        InitiativeStatus::AtRisk,
        InitiativeStatus::OnTrack,
    ];

    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        Self::KNOWN
            .iter()
            .copied()
            .find(|s| s.label() == raw)
            .unwrap_or(InitiativeStatus::Unrecognized)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InitiativeStatus::UnspecifiedTimeline => "Unspecified Timeline",
            InitiativeStatus::UnspecifiedDod => "Unspecified DoD",
            InitiativeStatus::NotStarted => "Not Started",
            InitiativeStatus::Achieved => "Achieved",
            InitiativeStatus::Done => "Done",
            InitiativeStatus::Delay => "Delay",
            InitiativeStatus::AtRisk => "At Risk",
            InitiativeStatus::OnTrack => "On Track",
            InitiativeStatus::Unrecognized => "Other",
        }
    }
}

impl fmt::Display for InitiativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl StatusSet for InitiativeStatus {
    const DISPLAY_ORDER: &'static [Self] = &[
        InitiativeStatus::UnspecifiedTimeline,
        InitiativeStatus::UnspecifiedDod,
        InitiativeStatus::NotStarted,
        InitiativeStatus::Achieved,
        InitiativeStatus::Done,
        InitiativeStatus::Delay,
        InitiativeStatus::AtRisk,
        InitiativeStatus::OnTrack,
        InitiativeStatus::Unrecognized,
    ];

    fn palette(&self) -> Palette {
        match self {
            InitiativeStatus::UnspecifiedTimeline => Palette::new("#fbc4dc", BLACK),
            InitiativeStatus::UnspecifiedDod => Palette::new("#f6b8f3", WHITE),
            InitiativeStatus::NotStarted => Palette::new("#dcdcdc", BLACK),
            InitiativeStatus::Achieved => Palette::new("#009245", WHITE),
            InitiativeStatus::Done => Palette::new("#a9e7fa", WHITE),
            InitiativeStatus::Delay => Palette::new("#ff5a5a", WHITE),
            InitiativeStatus::AtRisk => Palette::new("#ff914d", WHITE),
            InitiativeStatus::OnTrack => Palette::new("#a7f4cb", BLACK),
            InitiativeStatus::Unrecognized => Palette::new(WHITE, BLACK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::parse_number;
    use proptest::prelude::*;

    fn classify_raw(raw: &str) -> KpiStatus {
        KpiStatus::classify(parse_number(Some(raw)))
    }

    #[test]
    fn boundaries() {
        assert_eq!(KpiStatus::classify(Some(70.0)), KpiStatus::Kuning);
        assert_eq!(KpiStatus::classify(Some(69.999)), KpiStatus::Merah);
        assert_eq!(KpiStatus::classify(Some(99.0)), KpiStatus::Kuning);
        assert_eq!(KpiStatus::classify(Some(99.0001)), KpiStatus::Hijau);
        assert_eq!(KpiStatus::classify(Some(99.5)), KpiStatus::Hijau);
        assert_eq!(KpiStatus::classify(Some(-5.0)), KpiStatus::Merah);
        assert_eq!(KpiStatus::classify(Some(250.0)), KpiStatus::Hijau);
    }

    #[test]
    fn null_like_inputs_are_black() {
        assert_eq!(KpiStatus::classify(None), KpiStatus::Hitam);
        assert_eq!(KpiStatus::classify(Some(f64::NAN)), KpiStatus::Hitam);
        assert_eq!(classify_raw("NA"), KpiStatus::Hitam);
        assert_eq!(classify_raw(""), KpiStatus::Hitam);
        assert_eq!(classify_raw("pending"), KpiStatus::Hitam);
    }

    #[test]
    fn normalizes_before_classifying() {
        assert_eq!(classify_raw("85,5%"), KpiStatus::classify(Some(85.5)));
        assert_eq!(classify_raw("85,5%"), KpiStatus::Kuning);
        assert_eq!(classify_raw("100%"), KpiStatus::Hijau);
    }

    #[test]
    fn kpi_display_order_is_black_green_yellow_red() {
        let labels: Vec<&str> = KpiStatus::DISPLAY_ORDER.iter().map(|s| s.label()).collect();
        assert_eq!(labels, ["Hitam", "Hijau", "Kuning", "Merah"]);
    }

    #[test]
    fn kpi_palette_foregrounds() {
        assert_eq!(KpiStatus::Kuning.palette().foreground, "#000000");
        for s in [KpiStatus::Merah, KpiStatus::Hijau, KpiStatus::Hitam] {
            assert_eq!(s.palette().foreground, "#ffffff");
        }
    }

    #[test]
    fn initiative_labels_round_trip_through_parse() {
        for s in InitiativeStatus::KNOWN {
            assert_eq!(InitiativeStatus::parse(s.label()), s);
        }
        assert_eq!(InitiativeStatus::parse(" On Track "), InitiativeStatus::OnTrack);
        assert_eq!(InitiativeStatus::parse("on track"), InitiativeStatus::Unrecognized);
        assert_eq!(InitiativeStatus::parse("Cancelled"), InitiativeStatus::Unrecognized);
    }

    #[test]
    fn unknown_initiative_label_gets_readable_fallback() {
        let p = InitiativeStatus::parse("Cancelled").palette();
        assert_eq!(p, Palette::new("#ffffff", "#000000"));
        assert_eq!(p.css(), "background-color: #ffffff; color: #000000;");
        assert_eq!(InitiativeStatus::Delay.palette().background, "#ff5a5a");
        assert_eq!(InitiativeStatus::NotStarted.palette().foreground, "#000000");
    }

    proptest! {
        #[test]
        fn proptest_classify_is_total_and_matches_ranges(
            a in prop::option::of(prop_oneof![
                any::<f64>(),
                0.0f64..150.0,
                Just(f64::NAN),
                Just(f64::INFINITY),
                Just(f64::NEG_INFINITY),
            ])
        ) {
            let expected = match a {
                None => KpiStatus::Hitam,
                Some(v) if v.is_nan() => KpiStatus::Hitam,
                Some(v) if v < 70.0 => KpiStatus::Merah,
                Some(v) if v <= 99.0 => KpiStatus::Kuning,
                Some(_) => KpiStatus::Hijau,
            };
            let status = KpiStatus::classify(a);
            prop_assert_eq!(status, expected);
            prop_assert!(KpiStatus::DISPLAY_ORDER.contains(&status));
        }

        #[test]
        fn proptest_comma_percent_text_classifies_like_the_number(v in -1000.0f64..1000.0) {
            let text = format!("{v}%").replace('.', ",");
            prop_assert_eq!(classify_raw(&text), KpiStatus::classify(Some(v)));
        }
    }
}
