//! Analyzer and fixer: runs the rule catalog over whole source files.
//!
//! Each candidate expression statement is linearized and offered to every
//! rule in catalog order; the first rule that matches wins for that
//! statement. A rule whose operations fail on a matched chain is recorded
//! as a failure and never aborts the other candidates or rules.

use serde::Serialize;

use crate::chain::Chain;
use crate::error::Result;
use crate::lang::{self, Candidate};
use crate::rules::{Rule, builtin_rules};

/// One reportable finding: where an old-pattern chain sits and what it
/// should become.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub rule: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_url: Option<&'static str>,
    /// 1-based position of the expression in the file.
    pub line: usize,
    pub column: usize,
    pub matched: String,
    pub replacement: String,
    #[serde(skip)]
    pub start_byte: usize,
    #[serde(skip)]
    pub end_byte: usize,
}

/// A rule that matched a chain but failed while rewriting it. These point
/// at recipe configuration errors and are reported, never silently dropped.
#[derive(Debug, Clone, Serialize)]
pub struct RuleFailure {
    pub rule: String,
    pub line: usize,
    pub error: String,
}

/// Everything found in one pass over a source file.
#[derive(Debug, Default)]
pub struct Analysis {
    pub diagnostics: Vec<Diagnostic>,
    pub failures: Vec<RuleFailure>,
}

/// An [`Analysis`] plus the source with every diagnostic's replacement
/// applied.
#[derive(Debug)]
pub struct FixOutcome {
    pub fixed: String,
    pub diagnostics: Vec<Diagnostic>,
    pub failures: Vec<RuleFailure>,
}

impl FixOutcome {
    pub fn is_modified(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Runs a rule catalog over source files.
pub struct Analyzer {
    rules: Vec<Rule>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    /// An analyzer with the built-in rule catalog.
    pub fn new() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// An analyzer over a custom catalog.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Reports every old-pattern chain in the source, without changing it.
    pub fn analyze(&self, source: &str) -> Result<Analysis> {
        let mut analysis = Analysis::default();

        for candidate in lang::candidates(source)? {
            self.evaluate(&candidate, &mut analysis);
        }

        Ok(analysis)
    }

    /// Rewrites every old-pattern chain, splicing replacements by byte
    /// range from the end of the file backwards so earlier ranges stay
    /// valid.
    pub fn fix(&self, source: &str) -> Result<FixOutcome> {
        let analysis = self.analyze(source)?;
        let mut fixed = source.to_string();

        let mut ordered: Vec<&Diagnostic> = analysis.diagnostics.iter().collect();
        ordered.sort_by(|a, b| b.start_byte.cmp(&a.start_byte));
        for diagnostic in ordered {
            fixed.replace_range(diagnostic.start_byte..diagnostic.end_byte, &diagnostic.replacement);
        }

        Ok(FixOutcome {
            fixed,
            diagnostics: analysis.diagnostics,
            failures: analysis.failures,
        })
    }

    fn evaluate(&self, candidate: &Candidate, analysis: &mut Analysis) {
        let Some(chain) = Chain::linearize(&candidate.expr) else {
            return;
        };

        for rule in &self.rules {
            match rule.try_rewrite(&chain) {
                Ok(Some(rewritten)) => {
                    analysis.diagnostics.push(Diagnostic {
                        rule: rule.id.to_string(),
                        message: rule.message_for(&chain),
                        help_url: rule.help_url(),
                        line: candidate.start_row + 1,
                        column: candidate.start_col + 1,
                        matched: candidate.text.clone(),
                        replacement: rewritten.chain.to_expr().to_string(),
                        start_byte: candidate.start_byte,
                        end_byte: candidate.end_byte,
                    });
                    return;
                }
                Ok(None) => {}
                Err(error) => {
                    analysis.failures.push(RuleFailure {
                        rule: rule.id.to_string(),
                        line: candidate.start_row + 1,
                        error: error.to_string(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::EditOp;
    use crate::pattern::{CapturePolicy, Pattern};

    const SOURCE: &str = r#"
public class Tests
{
    public void TestMethod()
    {
        actual.Any().Should().BeTrue();
        other.Should().Be(42);
        actual.Any(x => x.Flag).Should().BeFalse("it is {0}", reason);
    }
}
"#;

    #[test]
    fn analyze_reports_matches_with_locations() {
        let analysis = Analyzer::new().analyze(SOURCE).unwrap();

        assert_eq!(analysis.diagnostics.len(), 2);
        assert!(analysis.failures.is_empty());

        let first = &analysis.diagnostics[0];
        assert_eq!(first.rule, "collection-should-not-be-empty");
        assert_eq!(first.line, 6);
        assert_eq!(first.message, "Use actual.Should().NotBeEmpty() instead.");
        assert_eq!(first.replacement, "actual.Should().NotBeEmpty()");

        let second = &analysis.diagnostics[1];
        assert_eq!(second.rule, "collection-should-not-contain");
        assert_eq!(
            second.replacement,
            "actual.Should().NotContain(x => x.Flag, \"it is {0}\", reason)"
        );
    }

    #[test]
    fn fix_splices_replacements_in_place() {
        let outcome = Analyzer::new().fix(SOURCE).unwrap();

        assert!(outcome.is_modified());
        assert!(outcome.fixed.contains("actual.Should().NotBeEmpty();"));
        assert!(
            outcome
                .fixed
                .contains("actual.Should().NotContain(x => x.Flag, \"it is {0}\", reason);")
        );
        // Untouched statements stay verbatim.
        assert!(outcome.fixed.contains("other.Should().Be(42);"));
    }

    #[test]
    fn a_misconfigured_rule_does_not_abort_the_batch() {
        // The pattern matches, but the operation anchors on a step that is
        // never present.
        let broken = Rule::new(
            "broken",
            "broken",
            Pattern::new().step("Should"),
            CapturePolicy::new(),
            vec![EditOp::rename("DoesNotExist", "Whatever")],
        );

        let outcome = Analyzer::with_rules(vec![broken]).fix(SOURCE).unwrap();

        assert_eq!(outcome.failures.len(), 3);
        assert!(!outcome.is_modified());
        assert_eq!(outcome.fixed, SOURCE);
    }
}
