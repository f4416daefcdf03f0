//! # chainfix
//!
//! A syntactic rewrite engine for fluent C# assertion chains.
//!
//! `chainfix` parses C# test sources with tree-sitter, linearizes fluent
//! call chains such as `actual.Any(x => x.Flag).Should().BeTrue()` into an
//! ordered step model, matches them against rule patterns and rewrites the
//! matches into their modern equivalents with small composable edit
//! operations.
//!
//! ## Quick start
//!
//! Run the built-in rule catalog over a source file:
//!
//! ```rust,no_run
//! use chainfix::analyzer::Analyzer;
//!
//! # fn main() -> chainfix::error::Result<()> {
//! let source = std::fs::read_to_string("Tests.cs")?;
//! let analyzer = Analyzer::new();
//!
//! for diagnostic in analyzer.analyze(&source)?.diagnostics {
//!     println!("{}:{} {}", diagnostic.line, diagnostic.column, diagnostic.message);
//! }
//!
//! let outcome = analyzer.fix(&source)?;
//! if outcome.is_modified() {
//!     std::fs::write("Tests.cs", outcome.fixed)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Building a rule
//!
//! Rules are plain data over the engine: a pattern over step names, capture
//! hooks, and an ordered list of edit operations.
//!
//! ```rust,no_run
//! use chainfix::ops::{ArgSource, EditOp};
//! use chainfix::pattern::{CapturePolicy, Pattern};
//! use chainfix::rules::Rule;
//!
//! let rule = Rule::new(
//!     "collection-should-not-be-empty",
//!     "Use {receiver}.Should().NotBeEmpty() instead.",
//!     Pattern::new().step("Any").step("Should").step("BeTrue"),
//!     CapturePolicy::new().require_no_arguments("Any"),
//!     vec![
//!         EditOp::remove_and_extract_arguments("Any", "args"),
//!         EditOp::rename_and_prepend_arguments("BeTrue", "NotBeEmpty", ArgSource::slot("args")),
//!     ],
//! );
//! ```

pub mod analyzer;
pub mod ast;
pub mod chain;
pub mod diff;
pub mod error;
pub mod files;
pub mod lang;
pub mod ops;
pub mod pattern;
pub mod rewrite;
pub mod rules;

/// Common imports for typical usage.
pub mod prelude {
    pub use crate::analyzer::{Analysis, Analyzer, Diagnostic, FixOutcome, RuleFailure};
    pub use crate::ast::{Argument, Expr};
    pub use crate::chain::{Chain, ChainLink, LinkKind};
    pub use crate::diff::DiffSummary;
    pub use crate::error::{ChainfixError, Result};
    pub use crate::files::SourceFinder;
    pub use crate::ops::{ArgSource, CaptureBag, EditOp};
    pub use crate::pattern::{CapturePolicy, MatchResult, Pattern};
    pub use crate::rewrite::{Rewritten, rewrite};
    pub use crate::rules::{Rule, builtin_rules};
}

pub use prelude::*;
