//! Per-session workflow state
//!
//! The whole paste/refresh/confirm/download flow is explicit state owned by
//! the caller; nothing ambient survives between sessions. Transitions:
//!
//! `Idle -> Parsed -> Validated -> {Blocked | ReadyToDownload} -> Downloaded`
//!
//! `Blocked` only leaves through a new paste or a new validation pass, with
//! one exception: confirming unpublished SKUs moves a session blocked solely
//! on unpublished rows to `ReadyToDownload`.

use crate::checks::merge_and_validate;
use crate::config::ToolConfig;
use crate::error::StateError;
use crate::input::{InputRow, parse_pasted};
use crate::reference::{ReferenceMap, fetch_reference};
use crate::report::ValidationReport;
use crate::writer::fill_template;
use anyhow::{Context, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Parsed,
    Blocked,
    ReadyToDownload,
    Downloaded,
}

#[derive(Debug)]
pub struct Session {
    config: ToolConfig,
    inputs: Vec<InputRow>,
    report: Option<ValidationReport>,
    unpublished_confirmed: bool,
    state: SessionState,
}

impl Session {
    pub fn new(config: ToolConfig) -> Self {
        Self {
            config,
            inputs: Vec::new(),
            report: None,
            unpublished_confirmed: false,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    /// Replace the pasted rows. Allowed from any state; a new paste discards
    /// the previous validation result and confirmation.
    pub fn paste(&mut self, text: &str) -> Result<usize> {
        self.inputs = parse_pasted(text, self.config.max_rows)?;
        self.report = None;
        self.unpublished_confirmed = false;
        self.state = SessionState::Parsed;
        Ok(self.inputs.len())
    }

    /// Fetch the reference sheet and run a validation pass.
    pub fn refresh(&mut self) -> Result<&ValidationReport> {
        if self.state == SessionState::Idle {
            return Err(StateError("nothing pasted yet".to_string()).into());
        }
        let reference = fetch_reference(&self.config.sheet_url, self.config.fetch_timeout_secs)
            .context("failed to read the reference Google Sheet; check the link and sharing")?;
        Ok(self.validate_with(&reference))
    }

    /// Run a validation pass against an already-fetched reference snapshot.
    ///
    /// Recomputes the whole merged set; no state is carried from previous
    /// passes.
    pub fn validate_with(&mut self, reference: &ReferenceMap) -> &ValidationReport {
        let report = merge_and_validate(&self.inputs, reference, &self.config.published_status);
        self.state = gate_for(&report, self.unpublished_confirmed);
        self.report.insert(report)
    }

    /// Set the "proceed even if unpublished" confirmation flag.
    pub fn confirm_unpublished(&mut self, confirmed: bool) {
        self.unpublished_confirmed = confirmed;
        if let Some(report) = &self.report {
            self.state = gate_for(report, confirmed);
        }
    }

    pub fn can_download(&self) -> bool {
        self.state == SessionState::ReadyToDownload
    }

    /// Fill the template with the validated rows and write the output file.
    pub fn download<P: AsRef<Path>>(&mut self, output_path: P) -> Result<()> {
        if self.state != SessionState::ReadyToDownload {
            return Err(StateError(format!(
                "download is not allowed in state {:?}",
                self.state
            ))
            .into());
        }
        let Some(report) = self.report.as_ref() else {
            return Err(StateError("no validation report".to_string()).into());
        };
        let rows: Vec<(String, f64)> = report
            .writable_rows()
            .map(|(sku, price)| (sku.to_string(), price))
            .collect();

        fill_template(
            self.config.template_path.as_path(),
            output_path.as_ref(),
            &rows,
        )
        .context("failed to fill the upload template")?;

        self.state = SessionState::Downloaded;
        Ok(())
    }
}

fn gate_for(report: &ValidationReport, unpublished_confirmed: bool) -> SessionState {
    if report.can_download(unpublished_confirmed) {
        SessionState::ReadyToDownload
    } else {
        SessionState::Blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{ReferenceMap, ReferenceRow};

    fn reference() -> ReferenceMap {
        ReferenceMap::from_rows(vec![
            ReferenceRow {
                sku: "A-1".to_string(),
                publish_status: "Published".to_string(),
                current_price: Some(10.0),
            },
            ReferenceRow {
                sku: "B-2".to_string(),
                publish_status: "Unpublished".to_string(),
                current_price: None,
            },
        ])
    }

    fn session() -> Session {
        Session::new(ToolConfig::default())
    }

    #[test]
    fn test_initial_state_is_idle() {
        assert_eq!(session().state(), SessionState::Idle);
    }

    #[test]
    fn test_clean_flow_reaches_ready() {
        let mut s = session();
        s.paste("A-1\t12.50").unwrap();
        assert_eq!(s.state(), SessionState::Parsed);
        s.validate_with(&reference());
        assert_eq!(s.state(), SessionState::ReadyToDownload);
    }

    #[test]
    fn test_hard_fail_blocks() {
        let mut s = session();
        s.paste("ZZZ\t12.50").unwrap();
        s.validate_with(&reference());
        assert_eq!(s.state(), SessionState::Blocked);
        // confirmation does not unblock a hard fail
        s.confirm_unpublished(true);
        assert_eq!(s.state(), SessionState::Blocked);
    }

    #[test]
    fn test_unpublished_needs_confirmation() {
        let mut s = session();
        s.paste("B-2\t9.99").unwrap();
        s.validate_with(&reference());
        assert_eq!(s.state(), SessionState::Blocked);
        s.confirm_unpublished(true);
        assert_eq!(s.state(), SessionState::ReadyToDownload);
        s.confirm_unpublished(false);
        assert_eq!(s.state(), SessionState::Blocked);
    }

    #[test]
    fn test_empty_paste_stays_blocked() {
        let mut s = session();
        s.paste("").unwrap();
        s.validate_with(&reference());
        assert_eq!(s.state(), SessionState::Blocked);
        s.confirm_unpublished(true);
        assert_eq!(s.state(), SessionState::Blocked);
        assert!(s.download("out.xlsx").is_err());
    }

    #[test]
    fn test_download_rejected_when_blocked() {
        let mut s = session();
        s.paste("\t12.50").unwrap();
        s.validate_with(&reference());
        let err = s.download("out.xlsx").unwrap_err();
        assert!(err.to_string().contains("invalid session transition"));
    }

    #[test]
    fn test_download_rejected_before_validation() {
        let mut s = session();
        s.paste("A-1\t12.50").unwrap();
        assert!(s.download("out.xlsx").is_err());
    }

    #[test]
    fn test_new_paste_resets_confirmation() {
        let mut s = session();
        s.paste("B-2\t9.99").unwrap();
        s.validate_with(&reference());
        s.confirm_unpublished(true);
        assert_eq!(s.state(), SessionState::ReadyToDownload);

        s.paste("B-2\t8.88").unwrap();
        assert_eq!(s.state(), SessionState::Parsed);
        s.validate_with(&reference());
        assert_eq!(s.state(), SessionState::Blocked);
    }

    #[test]
    fn test_refresh_requires_paste() {
        let mut s = session();
        assert!(s.refresh().is_err());
    }
}
