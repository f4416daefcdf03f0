//! Chain model and linearizer.
//!
//! A fluent expression like `actual.Any().Should().BeTrue()` nests outward:
//! the outermost node is the *last-written* call. [`Chain::linearize`] walks
//! the nested tree down to its receiver and stores the steps left-to-right
//! (step 0 is the first-written call), which is the order rules and edit
//! operations think in. [`Chain::to_expr`] is the inverse fold.
//!
//! Chains are persistent: every transformation builds a new `Chain`, the
//! input is never mutated.

use crate::ast::{Argument, Expr};

/// The kind of one chain step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Property,
    Invocation,
    Indexer,
}

/// One step of a fluent chain: a member name plus its arguments, if any.
///
/// Indexer links carry no name; they never satisfy a named requirement and
/// are matched only by wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    pub name: String,
    pub kind: LinkKind,
    pub arguments: Vec<Argument>,
}

impl ChainLink {
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LinkKind::Property,
            arguments: Vec::new(),
        }
    }

    pub fn invocation(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            kind: LinkKind::Invocation,
            arguments,
        }
    }

    pub fn indexer(arguments: Vec<Argument>) -> Self {
        Self {
            name: String::new(),
            kind: LinkKind::Indexer,
            arguments,
        }
    }
}

/// An ordered, bidirectionally navigable sequence of chain links over a
/// receiver expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    receiver: Expr,
    links: Vec<ChainLink>,
}

impl Chain {
    pub fn new(receiver: Expr, links: Vec<ChainLink>) -> Self {
        Self { receiver, links }
    }

    /// Builds a chain from a nested expression.
    ///
    /// Returns `None` when the expression root is not built from member
    /// access, invocation or indexer nodes (e.g. a bare literal or a free
    /// function call) — that is a normal outcome, not an error.
    pub fn linearize(expr: &Expr) -> Option<Self> {
        let mut links = Vec::new();
        let receiver = collect(expr, &mut links);
        if links.is_empty() {
            return None;
        }
        Some(Self { receiver, links })
    }

    /// Rebuilds the nested expression by folding the links left-to-right
    /// over the receiver.
    pub fn to_expr(&self) -> Expr {
        embed(self.receiver.clone(), &self.links)
    }

    /// Rebuilds the nested expression over a different receiver.
    pub fn embed_on(&self, receiver: Expr) -> Expr {
        embed(receiver, &self.links)
    }

    pub fn receiver(&self) -> &Expr {
        &self.receiver
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// A new chain with the link at `index` replaced.
    pub fn replace_link(&self, index: usize, link: ChainLink) -> Self {
        let mut links = self.links.clone();
        links[index] = link;
        Self {
            receiver: self.receiver.clone(),
            links,
        }
    }

    /// A new chain with the link at `index` spliced out.
    pub fn remove_link(&self, index: usize) -> Self {
        let mut links = self.links.clone();
        links.remove(index);
        Self {
            receiver: self.receiver.clone(),
            links,
        }
    }

    /// A new chain over a different receiver.
    pub fn replace_receiver(&self, receiver: Expr) -> Self {
        Self {
            receiver,
            links: self.links.clone(),
        }
    }
}

/// Recurses to the innermost receiver before appending, so the produced
/// order is left-to-right even though discovery is right-to-left.
fn collect(expr: &Expr, links: &mut Vec<ChainLink>) -> Expr {
    match expr {
        Expr::Invoke { callee, arguments } => match callee.as_ref() {
            Expr::Member { receiver, name } => {
                let base = collect(receiver, links);
                links.push(ChainLink::invocation(name.clone(), arguments.clone()));
                base
            }
            // A free call like `Factory()` is an opaque receiver, not a step.
            _ => expr.clone(),
        },
        Expr::Member { receiver, name } => {
            let base = collect(receiver, links);
            links.push(ChainLink::property(name.clone()));
            base
        }
        Expr::Index {
            receiver,
            arguments,
        } => {
            let base = collect(receiver, links);
            links.push(ChainLink::indexer(arguments.clone()));
            base
        }
        other => other.clone(),
    }
}

fn embed(receiver: Expr, links: &[ChainLink]) -> Expr {
    links.iter().fold(receiver, |inner, link| match link.kind {
        LinkKind::Property => Expr::member(inner, link.name.clone()),
        LinkKind::Invocation => Expr::invoke(
            Expr::member(inner, link.name.clone()),
            link.arguments.clone(),
        ),
        LinkKind::Indexer => Expr::index(inner, link.arguments.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Argument;
    use crate::lang::parse_expression;

    #[test]
    fn linearizes_left_to_right() {
        let expr = parse_expression("actual.Any().Should().BeTrue()").unwrap();
        let chain = Chain::linearize(&expr).unwrap();

        assert_eq!(chain.receiver().to_string(), "actual");
        let names: Vec<&str> = chain.links().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Any", "Should", "BeTrue"]);
        assert!(chain.links().iter().all(|l| l.kind == LinkKind::Invocation));
    }

    #[test]
    fn linearizes_properties_and_indexers() {
        let expr = parse_expression("xs[0].Items.Should().NotBeEmpty()").unwrap();
        let chain = Chain::linearize(&expr).unwrap();

        assert_eq!(chain.receiver().to_string(), "xs");
        let kinds: Vec<LinkKind> = chain.links().iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            [
                LinkKind::Indexer,
                LinkKind::Property,
                LinkKind::Invocation,
                LinkKind::Invocation
            ]
        );
        assert_eq!(chain.links()[0].arguments[0].value.to_string(), "0");
    }

    #[test]
    fn bare_expressions_are_not_chains() {
        assert!(Chain::linearize(&Expr::raw("42")).is_none());
        assert!(Chain::linearize(&Expr::ident("x")).is_none());
        // A free function call is not a chain either.
        let free_call = Expr::invoke(Expr::ident("Create"), vec![]);
        assert!(Chain::linearize(&free_call).is_none());
    }

    #[test]
    fn free_call_receiver_is_opaque() {
        let expr = parse_expression("Create().Should().NotBeNull()").unwrap();
        let chain = Chain::linearize(&expr).unwrap();

        assert_eq!(chain.receiver().to_string(), "Create()");
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn round_trip_law() {
        for source in [
            "actual.Any().Should().BeTrue()",
            "x.Should().NotBeNull(a).And.ContainSingle().Which.Should().NotBeEmpty()",
            "xs[i].Should().Be(42)",
            "dict.Keys.Count.Should().BeGreaterThan(0, \"why\")",
        ] {
            let expr = parse_expression(source).unwrap();
            let chain = Chain::linearize(&expr).unwrap();
            let rebuilt = Chain::linearize(&chain.to_expr()).unwrap();
            assert_eq!(chain, rebuilt, "round trip failed for {source}");
        }
    }

    #[test]
    fn embed_on_replaces_receiver() {
        let chain = Chain::new(
            Expr::ident("old"),
            vec![ChainLink::invocation(
                "Should",
                vec![Argument::positional(Expr::raw("1"))],
            )],
        );

        let expr = chain.embed_on(Expr::ident("new"));
        assert_eq!(expr.to_string(), "new.Should(1)");
    }
}
