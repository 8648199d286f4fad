//! Diagnostics collected while converting transformers.
//!
//! Conversion never throws for recoverable conditions. Instead each condition is
//! recorded here and the conversion completes with a best-effort result:
//!
//! - [`ConditionKind::ConflictingRegulation`]: two combined tap changers both regulate
//! - [`ConditionKind::UnsupportedModeling`]: a feature the destination model cannot hold
//! - [`ConditionKind::MalformedInput`]: recorded by batch drivers when a transformer fails
//!
//! # Example
//!
//! ```
//! use xfc_core::diagnostics::{ConditionKind, Diagnostics};
//!
//! let mut diag = Diagnostics::new();
//! diag.add_warning_with_entity(
//!     ConditionKind::UnsupportedModeling,
//!     "phase angle clock at winding 1 dropped",
//!     "T3W-1",
//! );
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.count_of(ConditionKind::UnsupportedModeling), 1);
//! ```

use serde::{Deserialize, Serialize};

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Conversion continued with a documented fallback
    Warning,
    /// The transformer could not be converted
    Error,
}

/// Closed taxonomy of conditions raised by the conversion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionKind {
    ConflictingRegulation,
    UnsupportedModeling,
    MalformedInput,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::ConflictingRegulation => "conflicting-regulation",
            ConditionKind::UnsupportedModeling => "unsupported-modeling",
            ConditionKind::MalformedInput => "malformed-input",
        }
    }
}

/// A single condition encountered during a conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub kind: ConditionKind,
    /// Human-readable description of the issue
    pub message: String,
    /// Optional entity reference (transformer id, tap changer id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(severity: Severity, kind: ConditionKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            entity: None,
        }
    }

    /// Add entity reference to the issue
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };

        write!(f, "[{}:{}] {}", severity, self.kind.as_str(), self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues for one conversion or one batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw issue directly
    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn add_warning(&mut self, kind: ConditionKind, message: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, kind, message));
    }

    pub fn add_warning_with_entity(&mut self, kind: ConditionKind, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Warning, kind, message).with_entity(entity));
    }

    pub fn add_error_with_entity(&mut self, kind: ConditionKind, message: &str, entity: &str) {
        self.issues
            .push(DiagnosticIssue::new(Severity::Error, kind, message).with_entity(entity));
    }

    // =========================================================================
    // Query Methods
    // =========================================================================

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Number of issues of one condition kind
    pub fn count_of(&self, kind: ConditionKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn issues_of_kind(&self, kind: ConditionKind) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    /// Merge another diagnostics into this one
    pub fn merge(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    pub fn summary(&self) -> String {
        let warnings = self.warning_count();
        let errors = self.error_count();

        match (warnings, errors) {
            (0, 0) => "No issues".to_string(),
            (w, 0) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (0, e) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (w, e) => format!(
                "{} warning{}, {} error{}",
                w,
                if w == 1 { "" } else { "s" },
                e,
                if e == 1 { "" } else { "s" }
            ),
        }
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics: {}", self.summary())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}
