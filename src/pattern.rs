//! Pattern matcher: recognizes an ordered template of step names inside a
//! fluent chain.
//!
//! Matching is a single greedy pass with no backtracking. The chain is
//! scanned outermost-first (from the last-written step toward the receiver)
//! and the pattern is consumed outermost-first too — the final assertion
//! method is the first requirement checked, the innermost anchor the last.
//! A wildcard requirement consumes exactly one step unconditionally; a step
//! that satisfies the current requirement consumes both cursors; any other
//! step is passed over, keeping the pattern progress. The chain matches iff
//! the pattern is exhausted before the chain is.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::ast::Expr;
use crate::chain::{Chain, ChainLink};

/// One slot of a pattern: a step name, or a wildcard that matches any step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub wildcard: bool,
}

impl Requirement {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wildcard: false,
        }
    }

    pub fn wildcard(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wildcard: true,
        }
    }
}

/// An ordered template of requirements, written in chain order (first-written
/// step first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    requirements: Vec<Requirement>,
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named requirement.
    pub fn step(mut self, name: impl Into<String>) -> Self {
        self.requirements.push(Requirement::named(name));
        self
    }

    /// Appends a wildcard requirement. The name only identifies the slot for
    /// capture hooks; any step satisfies it.
    pub fn wildcard(mut self, name: impl Into<String>) -> Self {
        self.requirements.push(Requirement::wildcard(name));
        self
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Matches without hooks.
    pub fn match_chain(&self, chain: &Chain) -> MatchResult {
        self.match_with(chain, &CapturePolicy::new())
    }

    /// Matches the chain, invoking the policy's hooks for every satisfied
    /// requirement. Hooks run at most once per requirement, in left-to-right
    /// pattern order, after the scan has succeeded; any hook may veto the
    /// match.
    pub fn match_with(&self, chain: &Chain, policy: &CapturePolicy) -> MatchResult {
        let links = chain.links();
        let requirements = &self.requirements;

        if requirements.is_empty() {
            return MatchResult {
                matched: true,
                window: Some(links.len()..links.len()),
                captures: BTreeMap::new(),
            };
        }

        // (requirement index, link index) pairs, recorded outermost-first.
        let mut bindings: Vec<(usize, usize)> = Vec::new();
        let mut remaining = requirements.len();
        let mut cursor = links.len();

        while remaining > 0 && cursor > 0 {
            cursor -= 1;
            let requirement = &requirements[remaining - 1];
            let link = &links[cursor];
            if requirement.wildcard || link.name == requirement.name {
                bindings.push((remaining - 1, cursor));
                remaining -= 1;
            }
        }

        if remaining > 0 {
            return MatchResult::no_match();
        }

        let outermost = bindings.first().map(|&(_, i)| i).unwrap_or(0);
        let innermost = bindings.last().map(|&(_, i)| i).unwrap_or(0);

        let mut captures = BTreeMap::new();
        for &(requirement_index, link_index) in bindings.iter().rev() {
            let requirement = &requirements[requirement_index];
            match policy.invoke(&requirement.name, &links[link_index], chain) {
                HookAction::Accept => {}
                HookAction::Capture(capture) => {
                    captures.insert(requirement.name.clone(), capture);
                }
                HookAction::Reject => return MatchResult::no_match(),
            }
        }

        MatchResult {
            matched: true,
            window: Some(innermost..outermost + 1),
            captures,
        }
    }
}

/// A value extracted while a requirement was being satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    Arguments(Vec<crate::ast::Argument>),
    Expression(Expr),
}

/// The outcome of a match attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    /// `[start, end)` over the chain's links, spanning from the innermost to
    /// the outermost consumed step. `None` when there was no match.
    pub window: Option<Range<usize>>,
    /// Requirement name to extracted value, for requirements whose hook
    /// chose to record one.
    pub captures: BTreeMap<String, Capture>,
}

impl MatchResult {
    fn no_match() -> Self {
        Self {
            matched: false,
            window: None,
            captures: BTreeMap::new(),
        }
    }

    pub fn capture(&self, requirement: &str) -> Option<&Capture> {
        self.captures.get(requirement)
    }
}

/// What a capture hook decided about a satisfied requirement.
pub enum HookAction {
    /// The requirement stands; nothing recorded.
    Accept,
    /// The requirement stands; record this value under the requirement name.
    Capture(Capture),
    /// Veto the whole match.
    Reject,
}

type Hook = Box<dyn Fn(&ChainLink, &Chain) -> HookAction + Send + Sync>;

/// Rule-specific capture hooks, keyed by requirement name.
#[derive(Default)]
pub struct CapturePolicy {
    hooks: Vec<(String, Hook)>,
}

impl CapturePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an arbitrary hook for the named requirement.
    pub fn on(
        mut self,
        requirement: impl Into<String>,
        hook: impl Fn(&ChainLink, &Chain) -> HookAction + Send + Sync + 'static,
    ) -> Self {
        self.hooks.push((requirement.into(), Box::new(hook)));
        self
    }

    /// Records the satisfied step's argument list.
    pub fn capture_arguments(self, requirement: &str) -> Self {
        self.on(requirement, |link, _| {
            HookAction::Capture(Capture::Arguments(link.arguments.clone()))
        })
    }

    /// Requires the step's first argument to be a lambda and records it.
    pub fn require_lambda_argument(self, requirement: &str) -> Self {
        self.on(requirement, |link, _| match link.arguments.first() {
            Some(argument) if argument.value.is_lambda() => {
                HookAction::Capture(Capture::Expression(argument.value.clone()))
            }
            _ => HookAction::Reject,
        })
    }

    /// Requires the step to be invoked without arguments.
    pub fn require_no_arguments(self, requirement: &str) -> Self {
        self.on(requirement, |link, _| {
            if link.arguments.is_empty() {
                HookAction::Accept
            } else {
                HookAction::Reject
            }
        })
    }

    /// Requires the step's first argument to be the same identifier as the
    /// chain's receiver (e.g. `list.OrderBy(x => x).Should().Equal(list)`).
    pub fn require_first_argument_is_receiver(self, requirement: &str) -> Self {
        self.on(requirement, |link, chain| {
            let is_receiver = match (link.arguments.first(), chain.receiver().as_ident()) {
                (Some(argument), Some(receiver)) => argument.value.as_ident() == Some(receiver),
                _ => false,
            };
            if is_receiver {
                HookAction::Accept
            } else {
                HookAction::Reject
            }
        })
    }

    fn invoke(&self, requirement: &str, link: &ChainLink, chain: &Chain) -> HookAction {
        for (name, hook) in &self.hooks {
            if name == requirement {
                return hook(link, chain);
            }
        }
        HookAction::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::parse_expression;
    use std::sync::Mutex;

    fn chain(source: &str) -> Chain {
        Chain::linearize(&parse_expression(source).unwrap()).unwrap()
    }

    #[test]
    fn matches_exact_chain() {
        let pattern = Pattern::new().step("Any").step("Should").step("BeTrue");
        let result = pattern.match_chain(&chain("actual.Any().Should().BeTrue()"));

        assert!(result.matched);
        assert_eq!(result.window, Some(0..3));
    }

    #[test]
    fn wildcard_bridges_one_step() {
        let pattern = Pattern::new()
            .step("Should")
            .step("NotBeNull")
            .wildcard("And")
            .step("NotBeEmpty");
        let result = pattern.match_with(
            &chain("x.Should().NotBeNull(a).And.ContainSingle().Which.Should().NotBeEmpty()"),
            &CapturePolicy::new(),
        );

        assert!(result.matched);
        // The window spans from the first Should to the trailing NotBeEmpty.
        assert_eq!(result.window, Some(0..7));
    }

    #[test]
    fn wildcard_consumes_exactly_one_step() {
        let two_wildcards = Pattern::new().wildcard("a").wildcard("b");
        assert!(two_wildcards.match_chain(&chain("x.A().B()")).matched);

        let three = Pattern::new().wildcard("a").wildcard("b").wildcard("c");
        assert!(!three.match_chain(&chain("x.A().B()")).matched);
    }

    #[test]
    fn empty_pattern_matches_trivially() {
        let result = Pattern::new().match_chain(&chain("x.A()"));
        assert!(result.matched);
        assert_eq!(result.window, Some(1..1));
    }

    #[test]
    fn pattern_longer_than_chain_never_matches() {
        let pattern = Pattern::new().step("A").step("B").step("C");
        assert!(!pattern.match_chain(&chain("x.A().B()")).matched);
    }

    #[test]
    fn excess_outer_chain_is_permitted() {
        let pattern = Pattern::new().step("Any").step("Should");
        let result = pattern.match_chain(&chain("actual.Any().Should().BeTrue()"));

        assert!(result.matched);
        assert_eq!(result.window, Some(0..2));
    }

    #[test]
    fn mismatched_steps_are_passed_over() {
        let pattern = Pattern::new().step("Any").step("BeTrue");
        assert!(pattern.match_chain(&chain("actual.Any().Should().BeTrue()")).matched);
    }

    #[test]
    fn missing_step_fails() {
        let pattern = Pattern::new().step("Any").step("Should").step("BeTrue");
        assert!(!pattern.match_chain(&chain("actual.Should().BeTrue()")).matched);
    }

    #[test]
    fn hooks_capture_arguments() {
        let pattern = Pattern::new().step("Any").step("Should").step("BeFalse");
        let policy = CapturePolicy::new().require_lambda_argument("Any");
        let result = pattern.match_with(&chain("actual.Any(x => x.Flag).Should().BeFalse()"), &policy);

        assert!(result.matched);
        match result.capture("Any") {
            Some(Capture::Expression(expr)) => assert_eq!(expr.to_string(), "x => x.Flag"),
            other => panic!("expected lambda capture, got {other:?}"),
        }
    }

    #[test]
    fn hook_can_veto_the_match() {
        let pattern = Pattern::new().step("OrderBy").step("Should").step("Equal");
        let policy = CapturePolicy::new().require_first_argument_is_receiver("Equal");

        let same = chain("list.OrderBy(x => x).Should().Equal(list)");
        assert!(pattern.match_with(&same, &policy).matched);

        // Names align but the argument is a different identifier.
        let different = chain("list.OrderBy(x => x).Should().Equal(other)");
        assert!(!pattern.match_with(&different, &policy).matched);
    }

    #[test]
    fn hooks_run_in_pattern_order() {
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let pattern = Pattern::new().step("Any").step("Should").step("BeTrue");

        let policy = {
            let first = seen.clone();
            let second = seen.clone();
            let third = seen.clone();
            CapturePolicy::new()
                .on("Any", move |_, _| {
                    first.lock().unwrap().push("Any");
                    HookAction::Accept
                })
                .on("Should", move |_, _| {
                    second.lock().unwrap().push("Should");
                    HookAction::Accept
                })
                .on("BeTrue", move |_, _| {
                    third.lock().unwrap().push("BeTrue");
                    HookAction::Accept
                })
        };

        let result = pattern.match_with(&chain("actual.Any().Should().BeTrue()"), &policy);
        assert!(result.matched);
        assert_eq!(*seen.lock().unwrap(), ["Any", "Should", "BeTrue"]);
    }

    #[test]
    fn require_no_arguments_rejects_predicates() {
        let pattern = Pattern::new().step("Any").step("Should").step("BeTrue");
        let policy = CapturePolicy::new().require_no_arguments("Any");

        assert!(pattern.match_with(&chain("actual.Any().Should().BeTrue()"), &policy).matched);
        assert!(
            !pattern
                .match_with(&chain("actual.Any(x => x.Flag).Should().BeTrue()"), &policy)
                .matched
        );
    }
}
