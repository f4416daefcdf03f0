//! Diff rendering for previewing fixes.

use std::fmt::Write;
use std::path::Path;

use similar::{ChangeTag, TextDiff};

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Renders a unified diff between the original and fixed source, optionally
/// colorized for terminal display.
pub fn render(original: &str, fixed: &str, path: &Path, color: bool) -> String {
    let diff = TextDiff::from_lines(original, fixed);
    let mut output = String::new();

    if color {
        let _ = writeln!(&mut output, "{CYAN}--- a/{}{RESET}", path.display());
        let _ = writeln!(&mut output, "{CYAN}+++ b/{}{RESET}", path.display());
    } else {
        let _ = writeln!(&mut output, "--- a/{}", path.display());
        let _ = writeln!(&mut output, "+++ b/{}", path.display());
    }

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            let _ = writeln!(&mut output);
        }

        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, tint) = match change.tag() {
                    ChangeTag::Delete => ("-", RED),
                    ChangeTag::Insert => ("+", GREEN),
                    ChangeTag::Equal => (" ", ""),
                };

                if color && !tint.is_empty() {
                    let _ = write!(&mut output, "{tint}{sign}{}{RESET}", change.value());
                } else {
                    let _ = write!(&mut output, "{sign}{}", change.value());
                }
            }
        }
    }

    output
}

/// Aggregate change counts across a run.
#[derive(Debug, Default)]
pub struct DiffSummary {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    pub fn from_diff(original: &str, fixed: &str) -> Self {
        let diff = TextDiff::from_lines(original, fixed);
        let mut insertions = 0;
        let mut deletions = 0;

        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => insertions += 1,
                ChangeTag::Delete => deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        Self {
            files_changed: usize::from(insertions > 0 || deletions > 0),
            insertions,
            deletions,
        }
    }

    pub fn merge(&mut self, other: &DiffSummary) {
        self.files_changed += other.files_changed;
        self.insertions += other.insertions;
        self.deletions += other.deletions;
    }
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file(s) changed, {} insertions(+), {} deletions(-)",
            self.files_changed, self.insertions, self.deletions
        )
    }
}
