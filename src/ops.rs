//! Edit operation combinators.
//!
//! Each operation computes one local substitution anchored at a named step
//! of a chain. Operations are composed into recipes by the rewrite driver;
//! some extract argument lists into a named slot of a [`CaptureBag`] for a
//! later operation in the same recipe to reuse. State flows strictly
//! forward through a recipe, never backward.
//!
//! The set of operations is closed; rules are configuration over this enum,
//! never new variants.

use std::collections::BTreeMap;

use crate::ast::{Argument, Expr};
use crate::chain::{Chain, ChainLink, LinkKind};
use crate::error::{ChainfixError, Result};

/// Arguments handed to an operation: either given inline by the rule, or
/// read from a slot an earlier operation extracted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgSource {
    Inline(Vec<Argument>),
    Slot(String),
}

impl ArgSource {
    pub fn inline(arguments: Vec<Argument>) -> Self {
        ArgSource::Inline(arguments)
    }

    pub fn slot(name: impl Into<String>) -> Self {
        ArgSource::Slot(name.into())
    }

    fn resolve(&self, bag: &CaptureBag) -> Result<Vec<Argument>> {
        match self {
            ArgSource::Inline(arguments) => Ok(arguments.clone()),
            ArgSource::Slot(name) => bag
                .arguments(name)
                .map(<[Argument]>::to_vec)
                .ok_or_else(|| ChainfixError::EmptySlot { slot: name.clone() }),
        }
    }
}

/// Captured argument lists, keyed by slot name, threaded through one recipe
/// application. Reads are non-destructive; a slot may feed more than one
/// later operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureBag {
    slots: BTreeMap<String, Vec<Argument>>,
}

impl CaptureBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&mut self, slot: impl Into<String>, arguments: Vec<Argument>) {
        self.slots.insert(slot.into(), arguments);
    }

    pub fn arguments(&self, slot: &str) -> Option<&[Argument]> {
        self.slots.get(slot).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// A named, parameterized local transformation anchored at one chain step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// Replace the step's name; arguments untouched.
    Rename { old: String, new: String },
    /// Splice the named step out of the chain.
    Remove { name: String },
    /// Splice out only the k-th step (1-based, in chain order) with the
    /// given name.
    RemoveOccurrence { name: String, occurrence: usize },
    /// Splice out the step written immediately before the named step.
    RemoveMethodBefore { name: String },
    /// Splice the named step out and extract its arguments into `slot`.
    RemoveAndExtractArguments { name: String, slot: String },
    /// Rename, then prepend the supplied arguments before the step's own.
    RenameAndPrependArguments {
        old: String,
        new: String,
        arguments: ArgSource,
    },
    /// Rename, then remove the first argument, extracting it into `slot`.
    RenameAndRemoveFirstArgument {
        old: String,
        new: String,
        slot: String,
    },
    /// Rename and extract the full argument list without removing any.
    RenameAndExtractArguments {
        old: String,
        new: String,
        slot: String,
    },
    /// Rename, then replace the first argument — which must be an invocation
    /// of a method on an expression — with that expression:
    /// `.Old(expected.ToList())` becomes `.New(expected)`.
    RenameAndRemoveInvocationOfMethodOnFirstArgument { old: String, new: String },
    /// Remove the first argument, extracting it into `slot`; name kept.
    RemoveFirstArgument { name: String, slot: String },
    /// Prepend the supplied arguments before the step's own.
    PrependArguments { name: String, arguments: ArgSource },
    /// Replace the step's entire argument list.
    WithArguments { name: String, arguments: ArgSource },
    /// The named step must be preceded by an indexer access; extract the
    /// indexer's arguments into `slot` and collapse it away, turning
    /// `xs[i].Name()` into `xs.Name()`.
    RemoveAndRetrieveIndexerArguments { name: String, slot: String },
    /// Rename, then logically negate the step's lambda argument. No
    /// negation policy is defined yet; applying this operation fails loudly
    /// rather than producing a rewrite that silently changes meaning.
    RenameAndNegateLambda { old: String, new: String },
}

impl EditOp {
    pub fn rename(old: impl Into<String>, new: impl Into<String>) -> Self {
        EditOp::Rename {
            old: old.into(),
            new: new.into(),
        }
    }

    pub fn remove(name: impl Into<String>) -> Self {
        EditOp::Remove { name: name.into() }
    }

    pub fn remove_occurrence(name: impl Into<String>, occurrence: usize) -> Self {
        EditOp::RemoveOccurrence {
            name: name.into(),
            occurrence,
        }
    }

    pub fn remove_method_before(name: impl Into<String>) -> Self {
        EditOp::RemoveMethodBefore { name: name.into() }
    }

    pub fn remove_and_extract_arguments(name: impl Into<String>, slot: impl Into<String>) -> Self {
        EditOp::RemoveAndExtractArguments {
            name: name.into(),
            slot: slot.into(),
        }
    }

    pub fn rename_and_prepend_arguments(
        old: impl Into<String>,
        new: impl Into<String>,
        arguments: ArgSource,
    ) -> Self {
        EditOp::RenameAndPrependArguments {
            old: old.into(),
            new: new.into(),
            arguments,
        }
    }

    pub fn rename_and_remove_first_argument(
        old: impl Into<String>,
        new: impl Into<String>,
        slot: impl Into<String>,
    ) -> Self {
        EditOp::RenameAndRemoveFirstArgument {
            old: old.into(),
            new: new.into(),
            slot: slot.into(),
        }
    }

    pub fn rename_and_extract_arguments(
        old: impl Into<String>,
        new: impl Into<String>,
        slot: impl Into<String>,
    ) -> Self {
        EditOp::RenameAndExtractArguments {
            old: old.into(),
            new: new.into(),
            slot: slot.into(),
        }
    }

    pub fn rename_and_remove_invocation_of_method_on_first_argument(
        old: impl Into<String>,
        new: impl Into<String>,
    ) -> Self {
        EditOp::RenameAndRemoveInvocationOfMethodOnFirstArgument {
            old: old.into(),
            new: new.into(),
        }
    }

    pub fn remove_first_argument(name: impl Into<String>, slot: impl Into<String>) -> Self {
        EditOp::RemoveFirstArgument {
            name: name.into(),
            slot: slot.into(),
        }
    }

    pub fn prepend_arguments(name: impl Into<String>, arguments: ArgSource) -> Self {
        EditOp::PrependArguments {
            name: name.into(),
            arguments,
        }
    }

    pub fn with_arguments(name: impl Into<String>, arguments: ArgSource) -> Self {
        EditOp::WithArguments {
            name: name.into(),
            arguments,
        }
    }

    pub fn remove_and_retrieve_indexer_arguments(
        name: impl Into<String>,
        slot: impl Into<String>,
    ) -> Self {
        EditOp::RemoveAndRetrieveIndexerArguments {
            name: name.into(),
            slot: slot.into(),
        }
    }

    pub fn rename_and_negate_lambda(old: impl Into<String>, new: impl Into<String>) -> Self {
        EditOp::RenameAndNegateLambda {
            old: old.into(),
            new: new.into(),
        }
    }

    /// The operation name used in error messages.
    pub fn operation(&self) -> &'static str {
        match self {
            EditOp::Rename { .. } => "Rename",
            EditOp::Remove { .. } => "Remove",
            EditOp::RemoveOccurrence { .. } => "RemoveOccurrence",
            EditOp::RemoveMethodBefore { .. } => "RemoveMethodBefore",
            EditOp::RemoveAndExtractArguments { .. } => "RemoveAndExtractArguments",
            EditOp::RenameAndPrependArguments { .. } => "RenameAndPrependArguments",
            EditOp::RenameAndRemoveFirstArgument { .. } => "RenameAndRemoveFirstArgument",
            EditOp::RenameAndExtractArguments { .. } => "RenameAndExtractArguments",
            EditOp::RenameAndRemoveInvocationOfMethodOnFirstArgument { .. } => {
                "RenameAndRemoveInvocationOfMethodOnFirstArgument"
            }
            EditOp::RemoveFirstArgument { .. } => "RemoveFirstArgument",
            EditOp::PrependArguments { .. } => "PrependArguments",
            EditOp::WithArguments { .. } => "WithArguments",
            EditOp::RemoveAndRetrieveIndexerArguments { .. } => "RemoveAndRetrieveIndexerArguments",
            EditOp::RenameAndNegateLambda { .. } => "RenameAndNegateLambda",
        }
    }

    /// Applies this operation, returning a new chain. Captured arguments are
    /// written to and read from `bag`.
    ///
    /// Fails loudly when no link anchors the operation or when a structural
    /// assumption does not hold; those are recipe configuration errors, not
    /// expected runtime conditions.
    pub fn apply(&self, chain: &Chain, bag: &mut CaptureBag) -> Result<Chain> {
        match self {
            EditOp::Rename { old, new } => {
                let index = self.require_anchor(chain, old)?;
                Ok(chain.replace_link(index, renamed(&chain.links()[index], new)))
            }
            EditOp::Remove { name } => {
                let index = self.require_anchor(chain, name)?;
                Ok(chain.remove_link(index))
            }
            EditOp::RemoveOccurrence { name, occurrence } => {
                let index = chain
                    .links()
                    .iter()
                    .enumerate()
                    .filter(|(_, link)| link.name == *name)
                    .map(|(index, _)| index)
                    .nth(occurrence.saturating_sub(1))
                    .ok_or_else(|| self.anchor_not_found(name))?;
                Ok(chain.remove_link(index))
            }
            EditOp::RemoveMethodBefore { name } => {
                let index = chain
                    .links()
                    .iter()
                    .enumerate()
                    .position(|(index, link)| index > 0 && link.name == *name)
                    .ok_or_else(|| self.anchor_not_found(name))?;
                Ok(chain.remove_link(index - 1))
            }
            EditOp::RemoveAndExtractArguments { name, slot } => {
                let index = self.require_anchor(chain, name)?;
                bag.store(slot.clone(), chain.links()[index].arguments.clone());
                Ok(chain.remove_link(index))
            }
            EditOp::RenameAndPrependArguments {
                old,
                new,
                arguments,
            } => {
                let index = self.require_anchor(chain, old)?;
                let link = &chain.links()[index];
                let mut combined = arguments.resolve(bag)?;
                combined.extend(link.arguments.iter().cloned());
                Ok(chain.replace_link(index, with_name_and_arguments(link, new, combined)))
            }
            EditOp::RenameAndRemoveFirstArgument { old, new, slot } => {
                let index = self.require_anchor(chain, old)?;
                let link = &chain.links()[index];
                let (first, rest) = self.split_first_argument(link, old)?;
                bag.store(slot.clone(), vec![first]);
                Ok(chain.replace_link(index, with_name_and_arguments(link, new, rest)))
            }
            EditOp::RenameAndExtractArguments { old, new, slot } => {
                let index = self.require_anchor(chain, old)?;
                let link = &chain.links()[index];
                bag.store(slot.clone(), link.arguments.clone());
                Ok(chain.replace_link(index, renamed(link, new)))
            }
            EditOp::RenameAndRemoveInvocationOfMethodOnFirstArgument { old, new } => {
                let index = self.require_anchor(chain, old)?;
                let link = &chain.links()[index];
                let first = link
                    .arguments
                    .first()
                    .ok_or_else(|| self.missing_argument(old))?;
                let unwrapped = match &first.value {
                    Expr::Invoke { callee, .. } => match callee.as_ref() {
                        Expr::Member { receiver, .. } => receiver.as_ref().clone(),
                        _ => return Err(self.expected_invocation_on_member(old)),
                    },
                    _ => return Err(self.expected_invocation_on_member(old)),
                };
                let mut arguments = link.arguments.clone();
                arguments[0] = Argument {
                    label: first.label.clone(),
                    value: unwrapped,
                };
                Ok(chain.replace_link(index, with_name_and_arguments(link, new, arguments)))
            }
            EditOp::RemoveFirstArgument { name, slot } => {
                let index = self.require_anchor(chain, name)?;
                let link = &chain.links()[index];
                let (first, rest) = self.split_first_argument(link, name)?;
                bag.store(slot.clone(), vec![first]);
                Ok(chain.replace_link(index, with_name_and_arguments(link, &link.name.clone(), rest)))
            }
            EditOp::PrependArguments { name, arguments } => {
                let index = self.require_anchor(chain, name)?;
                let link = &chain.links()[index];
                let mut combined = arguments.resolve(bag)?;
                combined.extend(link.arguments.iter().cloned());
                Ok(chain.replace_link(index, with_name_and_arguments(link, &link.name.clone(), combined)))
            }
            EditOp::WithArguments { name, arguments } => {
                let index = self.require_anchor(chain, name)?;
                let link = &chain.links()[index];
                let replaced = arguments.resolve(bag)?;
                Ok(chain.replace_link(index, with_name_and_arguments(link, &link.name.clone(), replaced)))
            }
            EditOp::RemoveAndRetrieveIndexerArguments { name, slot } => {
                let index = self.require_anchor(chain, name)?;
                if index > 0 && chain.links()[index - 1].kind == LinkKind::Indexer {
                    bag.store(slot.clone(), chain.links()[index - 1].arguments.clone());
                    return Ok(chain.remove_link(index - 1));
                }
                if index == 0 {
                    if let Expr::Index {
                        receiver,
                        arguments,
                    } = chain.receiver()
                    {
                        bag.store(slot.clone(), arguments.clone());
                        return Ok(chain.replace_receiver(receiver.as_ref().clone()));
                    }
                }
                Err(ChainfixError::ExpectedIndexer {
                    operation: self.operation(),
                    name: name.clone(),
                })
            }
            EditOp::RenameAndNegateLambda { old, new } => {
                let index = self.require_anchor(chain, old)?;
                let link = &chain.links()[index];
                match link.arguments.first() {
                    Some(argument) if argument.value.is_lambda() => {
                        Err(ChainfixError::Unsupported {
                            operation: self.operation(),
                            reason: format!(
                                "no negation policy is defined for the lambda argument of '{old}' (renaming to '{new}')"
                            ),
                        })
                    }
                    _ => Err(ChainfixError::ExpectedLambda {
                        operation: self.operation(),
                        name: old.clone(),
                    }),
                }
            }
        }
    }

    fn require_anchor(&self, chain: &Chain, name: &str) -> Result<usize> {
        chain
            .links()
            .iter()
            .position(|link| link.name == name)
            .ok_or_else(|| self.anchor_not_found(name))
    }

    fn split_first_argument(&self, link: &ChainLink, name: &str) -> Result<(Argument, Vec<Argument>)> {
        let mut rest = link.arguments.clone();
        if rest.is_empty() {
            return Err(self.missing_argument(name));
        }
        let first = rest.remove(0);
        Ok((first, rest))
    }

    fn anchor_not_found(&self, name: &str) -> ChainfixError {
        ChainfixError::AnchorNotFound {
            operation: self.operation(),
            name: name.to_string(),
        }
    }

    fn missing_argument(&self, name: &str) -> ChainfixError {
        ChainfixError::MissingArgument {
            operation: self.operation(),
            name: name.to_string(),
        }
    }

    fn expected_invocation_on_member(&self, name: &str) -> ChainfixError {
        ChainfixError::ExpectedInvocationOnMember {
            operation: self.operation(),
            name: name.to_string(),
        }
    }
}

fn renamed(link: &ChainLink, new: &str) -> ChainLink {
    ChainLink {
        name: new.to_string(),
        kind: link.kind,
        arguments: link.arguments.clone(),
    }
}

fn with_name_and_arguments(link: &ChainLink, name: &str, arguments: Vec<Argument>) -> ChainLink {
    ChainLink {
        name: name.to_string(),
        kind: link.kind,
        arguments,
    }
}
