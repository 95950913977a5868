use crate::archive::ArchiveInspection;
use crate::balance::check_tag_balance;
use crate::structure::{check_basic_structure, check_css_link};
use serde::Serialize;

/// The verdict for one submission, serialised as the per-archive JSON file.
///
/// `format_ok` is computed from the issue list at construction and the fields
/// are private, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    student_id: Option<String>,
    filename: String,
    #[serde(rename = "assignment")]
    assignment_name: String,
    format_ok: bool,
    format_issues: Vec<String>,
}

impl Report {
    pub fn new(
        student_id: Option<String>,
        filename: impl Into<String>,
        assignment_name: impl Into<String>,
        format_issues: Vec<String>,
    ) -> Self {
        Self {
            student_id,
            filename: filename.into(),
            assignment_name: assignment_name.into(),
            format_ok: format_issues.is_empty(),
            format_issues,
        }
    }

    /// Merge the archive pass with the document checks. Structure issues come
    /// first, then balance issues, then the CSS-link issue. Without a document
    /// only the archive issues are reported.
    pub fn assemble(
        student_id: Option<String>,
        filename: impl Into<String>,
        assignment_name: impl Into<String>,
        inspection: ArchiveInspection,
    ) -> Self {
        let mut issues = inspection.issues;
        if let Some(doc) = inspection.document.as_deref() {
            issues.extend(check_basic_structure(doc));
            issues.extend(check_tag_balance(doc));
            issues.extend(check_css_link(doc));
        }
        Self::new(student_id, filename, assignment_name, issues)
    }

    pub fn student_id(&self) -> Option<&str> {
        self.student_id.as_deref()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn assignment_name(&self) -> &str {
        &self.assignment_name
    }

    pub fn format_ok(&self) -> bool {
        self.format_ok
    }

    pub fn format_issues(&self) -> &[String] {
        &self.format_issues
    }

    /// Pretty JSON with two-space indentation and a trailing newline.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}
