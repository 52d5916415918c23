// Per-session selection state.
//
// One `Session` is created per run and handed to whatever renders a view;
// nothing here is global.
use crate::error::{DashboardError, Result};
use crate::reports::categories;
use crate::types::{InitiativeRecord, KpiRecord};

/// The options offered by one filter and the one currently active.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    options: Vec<String>,
    current: String,
}

impl Selector {
    /// Starts on the first option; an empty list has no valid selection.
    pub fn new(dimension: &'static str, options: Vec<String>) -> Result<Self> {
        let current = options
            .first()
            .cloned()
            .ok_or(DashboardError::NoCategories(dimension))?;
        Ok(Self { options, current })
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Overwrites the current value. The category is not checked against the options.
    pub fn select(&mut self, category: impl Into<String>) {
        self.current = category.into();
    }

    pub fn is_selected(&self, category: &str) -> bool {
        self.current == category
    }

    /// Option labels with the active one marked.
    pub fn labels(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|o| {
                if self.is_selected(o) {
                    format!("✔ {o}")
                } else {
                    o.clone()
                }
            })
            .collect()
    }
}

const PERSPECTIVE: &str = "perspective";
const PROGRAM: &str = "program";

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    perspective: Option<Selector>,
    program: Option<Selector>,
}

impl Session {
    pub fn new(kpis: &[KpiRecord], initiatives: Option<&[InitiativeRecord]>) -> Self {
        let perspective =
            Selector::new(PERSPECTIVE, categories(kpis, |r| r.perspective.as_deref())).ok();
        let program = Selector::new(
            PROGRAM,
            categories(initiatives.unwrap_or_default(), |r| r.program.as_deref()),
        )
        .ok();
        Self {
            perspective,
            program,
        }
    }

    pub fn perspective(&self) -> Result<&Selector> {
        self.perspective
            .as_ref()
            .ok_or(DashboardError::NoCategories(PERSPECTIVE))
    }

    pub fn program(&self) -> Result<&Selector> {
        self.program
            .as_ref()
            .ok_or(DashboardError::NoCategories(PROGRAM))
    }

    pub fn perspective_mut(&mut self) -> Result<&mut Selector> {
        self.perspective
            .as_mut()
            .ok_or(DashboardError::NoCategories(PERSPECTIVE))
    }

    pub fn program_mut(&mut self) -> Result<&mut Selector> {
        self.program
            .as_mut()
            .ok_or(DashboardError::NoCategories(PROGRAM))
    }

    pub fn select_perspective(&mut self, category: impl Into<String>) -> Result<()> {
        self.perspective_mut()?.select(category);
        Ok(())
    }

    pub fn select_program(&mut self, category: impl Into<String>) -> Result<()> {
        self.program_mut()?.select(category);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::tests::{initiative, kpi};

    #[test]
    fn starts_on_first_category_in_row_order() {
        let rows = vec![
            kpi(None, "0", None),
            kpi(Some("Internal"), "1", None),
            kpi(Some("Financial"), "2", None),
        ];
        let session = Session::new(&rows, None);
        let sel = session.perspective().unwrap();
        assert_eq!(sel.current(), "Internal");
        assert_eq!(
            sel.options(),
            &["Internal".to_string(), "Financial".to_string()]
        );
    }

    #[test]
    fn select_overwrites_unconditionally() {
        let rows = vec![kpi(Some("A"), "1", None), kpi(Some("B"), "2", None)];
        let mut session = Session::new(&rows, None);
        session.select_perspective("B").unwrap();
        assert_eq!(session.perspective().unwrap().current(), "B");
        session.select_perspective("Not offered").unwrap();
        assert_eq!(session.perspective().unwrap().current(), "Not offered");
    }

    #[test]
    fn labels_mark_the_active_option() {
        let mut sel = Selector::new("program", vec!["X".into(), "Y".into()]).unwrap();
        sel.select("Y");
        assert_eq!(sel.labels(), vec!["X".to_string(), "✔ Y".to_string()]);
    }

    #[test]
    fn empty_tables_leave_selection_undefined() {
        let mut session = Session::new(&[], None);
        assert!(matches!(
            session.perspective(),
            Err(DashboardError::NoCategories("perspective"))
        ));
        assert!(matches!(
            session.program(),
            Err(DashboardError::NoCategories("program"))
        ));
        assert!(session.select_program("X").is_err());
        assert!(session.perspective_mut().is_err());
    }

    #[test]
    fn programs_come_from_initiatives() {
        let si = vec![
            initiative(Some("Ops"), "1", "Done"),
            initiative(Some("Digital"), "2", "Delay"),
            initiative(Some("Ops"), "3", "Done"),
        ];
        let mut session = Session::new(&[], Some(si.as_slice()));
        assert_eq!(session.program().unwrap().current(), "Ops");
        session.program_mut().unwrap().select("Digital");
        assert!(session.program().unwrap().is_selected("Digital"));
    }
}
