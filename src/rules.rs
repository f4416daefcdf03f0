//! Built-in rewrite rules.
//!
//! A rule is pure configuration over the engine: a pattern, a capture
//! policy, an ordered list of edit operations and a message template. The
//! catalog here covers the collection assertions; the engine itself knows
//! nothing about any of them.

use crate::chain::Chain;
use crate::error::Result;
use crate::ops::{ArgSource, EditOp};
use crate::pattern::{CapturePolicy, Pattern};
use crate::rewrite::{Rewritten, rewrite};

/// Documentation links, keyed by rule id. Injected, read-only data.
const HELP_LINKS: &[(&str, &str)] = &[
    (
        "collection-should-not-be-empty",
        "https://fluentassertions.com/collections/",
    ),
    (
        "collection-should-contain",
        "https://fluentassertions.com/collections/",
    ),
    (
        "collection-should-not-contain",
        "https://fluentassertions.com/collections/",
    ),
    (
        "collection-should-be-in-ascending-order",
        "https://fluentassertions.com/collections/",
    ),
];

/// One rewrite rule: a recognizable old shape and the operations that turn
/// it into the new shape.
pub struct Rule {
    pub id: &'static str,
    /// Template for the diagnostic message; `{receiver}` is replaced with
    /// the chain's receiver expression.
    pub message: &'static str,
    pattern: Pattern,
    policy: CapturePolicy,
    operations: Vec<EditOp>,
}

impl Rule {
    pub fn new(
        id: &'static str,
        message: &'static str,
        pattern: Pattern,
        policy: CapturePolicy,
        operations: Vec<EditOp>,
    ) -> Self {
        Self {
            id,
            message,
            pattern,
            policy,
            operations,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The documentation link for this rule, if one is registered.
    pub fn help_url(&self) -> Option<&'static str> {
        HELP_LINKS
            .iter()
            .find(|(id, _)| *id == self.id)
            .map(|&(_, url)| url)
    }

    /// The diagnostic message for a concrete chain.
    pub fn message_for(&self, chain: &Chain) -> String {
        self.message
            .replace("{receiver}", &chain.receiver().to_string())
    }

    /// Matches the chain and, on a match, applies this rule's operations.
    ///
    /// `Ok(None)` is the normal no-match outcome. An `Err` means the chain
    /// matched but an operation's structural assumption was violated — a
    /// configuration error worth surfacing, not a silent skip.
    pub fn try_rewrite(&self, chain: &Chain) -> Result<Option<Rewritten>> {
        if !self.pattern.match_with(chain, &self.policy).matched {
            return Ok(None);
        }
        rewrite(chain, &self.operations).map(Some)
    }
}

/// The built-in catalog. Order matters: the first rule whose pattern and
/// hooks accept a chain wins, so the more constrained `Any()` rules come
/// before the predicate forms.
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        // actual.Any().Should().BeTrue() => actual.Should().NotBeEmpty()
        Rule::new(
            "collection-should-not-be-empty",
            "Use {receiver}.Should().NotBeEmpty() instead.",
            Pattern::new().step("Any").step("Should").step("BeTrue"),
            CapturePolicy::new().require_no_arguments("Any"),
            vec![
                EditOp::remove_and_extract_arguments("Any", "args"),
                EditOp::rename_and_prepend_arguments("BeTrue", "NotBeEmpty", ArgSource::slot("args")),
            ],
        ),
        // actual.Any(x => ...).Should().BeTrue() => actual.Should().Contain(x => ...)
        Rule::new(
            "collection-should-contain",
            "Use {receiver}.Should().Contain() instead.",
            Pattern::new().step("Any").step("Should").step("BeTrue"),
            CapturePolicy::new().require_lambda_argument("Any"),
            vec![
                EditOp::remove_and_extract_arguments("Any", "predicate"),
                EditOp::rename_and_prepend_arguments("BeTrue", "Contain", ArgSource::slot("predicate")),
            ],
        ),
        // actual.Where(x => ...).Should().NotBeEmpty() => actual.Should().Contain(x => ...)
        Rule::new(
            "collection-should-contain",
            "Use {receiver}.Should().Contain() instead.",
            Pattern::new().step("Where").step("Should").step("NotBeEmpty"),
            CapturePolicy::new().require_lambda_argument("Where"),
            vec![
                EditOp::remove_and_extract_arguments("Where", "predicate"),
                EditOp::rename_and_prepend_arguments(
                    "NotBeEmpty",
                    "Contain",
                    ArgSource::slot("predicate"),
                ),
            ],
        ),
        // actual.Any(x => ...).Should().BeFalse() => actual.Should().NotContain(x => ...)
        Rule::new(
            "collection-should-not-contain",
            "Use {receiver}.Should().NotContain() instead.",
            Pattern::new().step("Any").step("Should").step("BeFalse"),
            CapturePolicy::new().require_lambda_argument("Any"),
            vec![
                EditOp::remove_and_extract_arguments("Any", "predicate"),
                EditOp::rename_and_prepend_arguments(
                    "BeFalse",
                    "NotContain",
                    ArgSource::slot("predicate"),
                ),
            ],
        ),
        // list.OrderBy(x => ...).Should().Equal(list)
        //   => list.Should().BeInAscendingOrder(x => ...)
        // Only when Equal's argument is the receiver itself; comparing an
        // ordered copy against a different collection is a real assertion.
        Rule::new(
            "collection-should-be-in-ascending-order",
            "Use {receiver}.Should().BeInAscendingOrder() instead.",
            Pattern::new().step("OrderBy").step("Should").step("Equal"),
            CapturePolicy::new()
                .require_lambda_argument("OrderBy")
                .require_first_argument_is_receiver("Equal"),
            vec![
                EditOp::remove_and_extract_arguments("OrderBy", "selector"),
                EditOp::rename_and_remove_first_argument("Equal", "BeInAscendingOrder", "expected"),
                EditOp::prepend_arguments("BeInAscendingOrder", ArgSource::slot("selector")),
            ],
        ),
    ]
}
