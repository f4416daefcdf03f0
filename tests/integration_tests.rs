//! End-to-end tests: discover files, analyze them and apply fixes.

use std::fs;

use chainfix::prelude::*;
use tempfile::TempDir;

const FIXTURE: &str = r#"
using FluentAssertions;

public class OrderTests
{
    public void Orders_are_present()
    {
        orders.Any().Should().BeTrue();
    }

    public void Cancelled_orders_are_flagged()
    {
        orders.Any(o => o.Cancelled).Should().BeFalse("cancellations are {0}", policy);
    }

    public void Totals_are_sorted()
    {
        orders.OrderBy(o => o.Total).Should().Equal(orders);
    }

    public void Unrelated_assertions_stay()
    {
        orders.Count.Should().Be(3);
    }
}
"#;

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn analyze_reports_every_old_chain_in_a_file() {
    let dir = TempDir::new().unwrap();
    write_fixture(&dir, "OrderTests.cs", FIXTURE);

    let files = SourceFinder::new().collect(dir.path()).unwrap();
    assert_eq!(files.len(), 1);

    let source = fs::read_to_string(&files[0]).unwrap();
    let analysis = Analyzer::new().analyze(&source).unwrap();

    assert!(analysis.failures.is_empty());
    let rules: Vec<&str> = analysis.diagnostics.iter().map(|d| d.rule.as_str()).collect();
    assert_eq!(
        rules,
        [
            "collection-should-not-be-empty",
            "collection-should-not-contain",
            "collection-should-be-in-ascending-order",
        ]
    );
    assert!(analysis.diagnostics.iter().all(|d| d.help_url.is_some()));
}

#[test]
fn fix_rewrites_a_file_in_place() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "OrderTests.cs", FIXTURE);

    let source = fs::read_to_string(&path).unwrap();
    let outcome = Analyzer::new().fix(&source).unwrap();
    fs::write(&path, &outcome.fixed).unwrap();

    let fixed = fs::read_to_string(&path).unwrap();
    assert!(fixed.contains("orders.Should().NotBeEmpty();"));
    assert!(fixed.contains(
        "orders.Should().NotContain(o => o.Cancelled, \"cancellations are {0}\", policy);"
    ));
    assert!(fixed.contains("orders.Should().BeInAscendingOrder(o => o.Total);"));
    assert!(fixed.contains("orders.Count.Should().Be(3);"));
    assert!(!fixed.contains("BeTrue"));
    assert!(!fixed.contains("OrderBy"));
}

#[test]
fn fixing_twice_changes_nothing_more() {
    let outcome = Analyzer::new().fix(FIXTURE).unwrap();
    let again = Analyzer::new().fix(&outcome.fixed).unwrap();

    assert!(!again.is_modified());
    assert_eq!(again.fixed, outcome.fixed);
}

#[test]
fn diff_preview_shows_the_rewrite() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "OrderTests.cs", FIXTURE);

    let source = fs::read_to_string(&path).unwrap();
    let outcome = Analyzer::new().fix(&source).unwrap();

    let diff = chainfix::diff::render(&source, &outcome.fixed, &path, false);
    assert!(diff.contains("-        orders.Any().Should().BeTrue();"));
    assert!(diff.contains("+        orders.Should().NotBeEmpty();"));

    let summary = DiffSummary::from_diff(&source, &outcome.fixed);
    assert_eq!(summary.files_changed, 1);
    assert_eq!(summary.insertions, 3);
    assert_eq!(summary.deletions, 3);
}

#[test]
fn a_failing_rule_is_reported_and_other_statements_still_fix() {
    // First rule matches every Should-chain but anchors an operation on a
    // step that never exists; the catalog rules after it still run.
    let broken = Rule::new(
        "broken",
        "broken",
        Pattern::new().step("Should"),
        CapturePolicy::new(),
        vec![EditOp::rename("DoesNotExist", "Whatever")],
    );
    let mut rules = vec![broken];
    rules.extend(builtin_rules());

    let outcome = Analyzer::with_rules(rules).fix(FIXTURE).unwrap();

    assert!(!outcome.failures.is_empty());
    assert!(outcome.failures.iter().all(|f| f.rule == "broken"));
    assert!(outcome.fixed.contains("orders.Should().NotBeEmpty();"));
}

#[test]
fn sorted_against_a_different_collection_is_not_touched() {
    let source = r#"
public class T
{
    public void M()
    {
        actual.OrderBy(o => o.Total).Should().Equal(expected);
    }
}
"#;
    let outcome = Analyzer::new().fix(source).unwrap();
    assert!(!outcome.is_modified());
    assert_eq!(outcome.fixed, source);
}
