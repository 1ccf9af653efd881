//! Consistency checks over catalog contents.

use std::collections::HashSet;
use std::fmt;

use super::Catalog;

/// Typical games use between these many differences per set.
const MIN_COMFORTABLE_DIFFERENCES: usize = 2;
const MAX_COMFORTABLE_DIFFERENCES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    NoDifferences,
    FewDifferences,
    ManyDifferences,
    InvalidSize,
    DuplicateId,
    MissingTags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub set_id: u32,
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    fn new(severity: Severity, set_id: u32, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            set_id,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}] set {}: {}", level, self.set_id, self.message)
    }
}

impl Catalog {
    /// Check every set for structural problems and questionable counts.
    ///
    /// Image file existence is not checked; that needs the filesystem.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for set in &self.sets {
            if !seen.insert(set.id) {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    set.id,
                    IssueKind::DuplicateId,
                    format!("Duplicate set id {}", set.id),
                ));
            }

            if set.tags.iter().all(|t| t.trim().is_empty()) {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    set.id,
                    IssueKind::MissingTags,
                    "No tags specified",
                ));
            }

            let count = set.differences.len();
            if count == 0 {
                issues.push(ValidationIssue::new(
                    Severity::Error,
                    set.id,
                    IssueKind::NoDifferences,
                    "No differences defined",
                ));
                continue;
            }
            if count < MIN_COMFORTABLE_DIFFERENCES {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    set.id,
                    IssueKind::FewDifferences,
                    format!("Only {} difference(s) - may be too easy", count),
                ));
            } else if count > MAX_COMFORTABLE_DIFFERENCES {
                issues.push(ValidationIssue::new(
                    Severity::Warning,
                    set.id,
                    IssueKind::ManyDifferences,
                    format!("{} differences - may be too hard", count),
                ));
            }

            for (i, region) in set.differences.iter().enumerate() {
                if region.width == 0 || region.height == 0 {
                    issues.push(ValidationIssue::new(
                        Severity::Error,
                        set.id,
                        IssueKind::InvalidSize,
                        format!("Difference {} has zero width or height", i + 1),
                    ));
                }
            }
        }

        issues
    }
}
