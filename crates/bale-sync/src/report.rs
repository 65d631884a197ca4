/// One record that could not be pushed this run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushFailure {
    pub name: String,
    pub error: String,
}

/// Outcome of one push run, in push order.
///
/// `warnings` holds the benign inconsistencies: relation records that
/// could not be created after the main record was already accepted.
/// Those records stay confirmed; a later run does not retry relations.
#[derive(Clone, Debug, Default)]
pub struct SyncReport {
    pub pushed: Vec<String>,
    pub skipped: usize,
    pub failed: Vec<PushFailure>,
    pub warnings: Vec<String>,
    pub aborted: bool,
}

impl SyncReport {
    /// True when nothing failed and nothing was aborted.
    pub fn clean(&self) -> bool {
        self.failed.is_empty() && !self.aborted
    }

    /// True when the run had nothing left to do.
    pub fn quiet(&self) -> bool {
        self.pushed.is_empty() && self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_defaults() {
        let r = SyncReport::default();
        assert!(r.clean());
        assert!(r.quiet());
        assert_eq!(r.skipped, 0);
    }

    #[test]
    fn failures_make_a_report_unclean() {
        let mut r = SyncReport::default();
        r.failed.push(PushFailure {
            name: "a.c".into(),
            error: "refused".into(),
        });
        assert!(!r.clean());
        assert!(!r.quiet());
    }

    #[test]
    fn warnings_leave_a_report_clean() {
        let mut r = SyncReport::default();
        r.pushed.push("a.c".into());
        r.warnings.push("relation for 'a.c' not recorded".into());
        assert!(r.clean());
    }
}
