//! C# parsing front end.
//!
//! Parses source text with tree-sitter and lowers candidate fluent
//! expressions into the [`crate::ast`] model. Lowering is deliberately
//! shallow: member accesses, invocations, indexers and lambdas become
//! structured nodes because the engine inspects them; every other
//! sub-expression is carried verbatim as [`Expr::Raw`].

use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language as TsLanguage, Node, Parser, Query, QueryCursor, Tree};

use crate::ast::{Argument, Expr};
use crate::error::{ChainfixError, Result};

/// Finds candidate expression statements: any statement whose expression is
/// an invocation (fluent chains always end in a call).
const CANDIDATE_QUERY: &str = "(expression_statement (invocation_expression) @chain)";

/// The C# grammar and parsing helpers.
pub struct CSharp;

impl CSharp {
    pub fn grammar() -> TsLanguage {
        tree_sitter_c_sharp::LANGUAGE.into()
    }

    /// Parses source code into a tree-sitter AST.
    pub fn parse(source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&Self::grammar())
            .map_err(|e| ChainfixError::Parse {
                path: Path::new("<source>").to_path_buf(),
                message: format!("Failed to set language: {e}"),
            })?;

        parser.parse(source, None).ok_or_else(|| ChainfixError::Parse {
            path: Path::new("<source>").to_path_buf(),
            message: "Failed to parse source".to_string(),
        })
    }

    /// Creates a tree-sitter query against the C# grammar.
    pub fn query(pattern: &str) -> Result<Query> {
        Ok(Query::new(&Self::grammar(), pattern)?)
    }
}

/// One candidate fluent expression found in a source file, with enough
/// location information to report a diagnostic and splice a replacement.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub expr: Expr,
    pub text: String,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_row: usize,
    pub start_col: usize,
}

/// Collects every candidate expression statement in the source.
pub fn candidates(source: &str) -> Result<Vec<Candidate>> {
    let tree = CSharp::parse(source)?;
    let query = CSharp::query(CANDIDATE_QUERY)?;
    let mut cursor = QueryCursor::new();
    let source_bytes = source.as_bytes();
    let mut found = Vec::new();

    let mut matches = cursor.matches(&query, tree.root_node(), source_bytes);
    while let Some(query_match) = matches.next() {
        for capture in query_match.captures {
            let node = capture.node;
            found.push(Candidate {
                expr: lower(node, source),
                text: node.utf8_text(source_bytes).unwrap_or("").to_string(),
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                start_row: node.start_position().row,
                start_col: node.start_position().column,
            });
        }
    }

    Ok(found)
}

/// Parses a single expression snippet, e.g. `"actual.Should().BeTrue()"`.
pub fn parse_expression(snippet: &str) -> Result<Expr> {
    let source = format!("{snippet};");
    let tree = CSharp::parse(&source)?;

    let statement = find_kind(tree.root_node(), "expression_statement").ok_or_else(|| {
        ChainfixError::Parse {
            path: Path::new("<snippet>").to_path_buf(),
            message: format!("not an expression: {snippet}"),
        }
    })?;
    let expression = statement.named_child(0).ok_or_else(|| ChainfixError::Parse {
        path: Path::new("<snippet>").to_path_buf(),
        message: format!("empty statement: {snippet}"),
    })?;

    Ok(lower(expression, &source))
}

fn find_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    if node.kind() == kind {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if let Some(found) = find_kind(child, kind) {
            return Some(found);
        }
    }
    None
}

fn text(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

/// Lowers a tree-sitter node into the expression model.
fn lower(node: Node<'_>, source: &str) -> Expr {
    match node.kind() {
        "invocation_expression" => {
            let Some(function) = node.child_by_field_name("function") else {
                return Expr::raw(text(node, source));
            };
            let arguments = node
                .child_by_field_name("arguments")
                .map(|list| lower_argument_list(list, source))
                .unwrap_or_default();
            Expr::invoke(lower(function, source), arguments)
        }
        "member_access_expression" => {
            let (Some(receiver), Some(name)) = (
                node.child_by_field_name("expression"),
                node.child_by_field_name("name"),
            ) else {
                return Expr::raw(text(node, source));
            };
            Expr::member(lower(receiver, source), text(name, source))
        }
        "element_access_expression" => {
            let Some(receiver) = node.child_by_field_name("expression") else {
                return Expr::raw(text(node, source));
            };
            let arguments = find_child_of_kind(node, "bracketed_argument_list")
                .map(|list| lower_argument_list(list, source))
                .unwrap_or_default();
            Expr::index(lower(receiver, source), arguments)
        }
        "lambda_expression" => lower_lambda(node, source),
        "identifier" => Expr::Ident(text(node, source)),
        "integer_literal" | "real_literal" | "string_literal" | "verbatim_string_literal"
        | "character_literal" | "boolean_literal" | "null_literal" => {
            Expr::Literal(text(node, source))
        }
        _ => Expr::raw(text(node, source)),
    }
}

fn find_child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).find(|c| c.kind() == kind)
}

fn lower_argument_list(list: Node<'_>, source: &str) -> Vec<Argument> {
    let mut cursor = list.walk();
    list.named_children(&mut cursor)
        .filter(|c| c.kind() == "argument")
        .map(|argument| lower_argument(argument, source))
        .collect()
}

fn lower_argument(node: Node<'_>, source: &str) -> Argument {
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    let labeled = children.iter().any(|c| c.kind() == ":");
    let named: Vec<&Node> = children.iter().filter(|c| c.is_named()).collect();

    match (labeled, named.as_slice()) {
        (true, [label, .., value]) => Argument::labeled(text(**label, source), lower(**value, source)),
        (_, [.., value]) => Argument::positional(lower(**value, source)),
        _ => Argument::positional(Expr::raw(text(node, source))),
    }
}

/// Lambdas keep their parameter text and body so rules can capture a
/// predicate verbatim; the body is lowered in case a rule needs to look at
/// it, and falls back to raw text otherwise.
fn lower_lambda(node: Node<'_>, source: &str) -> Expr {
    let mut cursor = node.walk();
    let arrow = node.children(&mut cursor).find(|c| c.kind() == "=>");
    let Some(arrow) = arrow else {
        return Expr::raw(text(node, source));
    };

    let parameter = source[node.start_byte()..arrow.start_byte()].trim().to_string();

    let mut cursor = node.walk();
    let body = node
        .named_children(&mut cursor)
        .find(|c| c.start_byte() >= arrow.end_byte());
    let body = match body {
        Some(body) => lower(body, source),
        None => Expr::raw(source[arrow.end_byte()..node.end_byte()].trim().to_string()),
    };

    Expr::lambda(parameter, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_a_fluent_chain() {
        let expr = parse_expression("actual.Any(x => x.Flag).Should().BeFalse()").unwrap();
        assert_eq!(expr.to_string(), "actual.Any(x => x.Flag).Should().BeFalse()");
    }

    #[test]
    fn lowers_indexers_and_literals() {
        let expr = parse_expression("xs[0].Should().Be(42, \"why\")").unwrap();
        assert_eq!(expr.to_string(), "xs[0].Should().Be(42, \"why\")");
    }

    #[test]
    fn lowers_labeled_arguments() {
        let expr = parse_expression("xs.Should().HaveCount(expected: 3)").unwrap();
        assert_eq!(expr.to_string(), "xs.Should().HaveCount(expected: 3)");
    }

    #[test]
    fn opaque_arguments_are_verbatim() {
        let expr = parse_expression(
            "x.Should().NotBeNull(\"because I said {0} so\".Substring(\"because\".Length), Environment.MachineName)",
        )
        .unwrap();
        assert_eq!(
            expr.to_string(),
            "x.Should().NotBeNull(\"because I said {0} so\".Substring(\"because\".Length), Environment.MachineName)"
        );
    }

    #[test]
    fn rejects_non_expressions() {
        assert!(parse_expression("").is_err());
    }

    #[test]
    fn finds_candidates_with_locations() {
        let source = r#"
public class Tests
{
    public void TestMethod()
    {
        var list = new List<int>();
        list.Any().Should().BeTrue();
        list.Count.Should().Be(0);
    }
}
"#;
        let found = candidates(source).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].text, "list.Any().Should().BeTrue()");
        assert_eq!(found[0].start_row, 6);
        assert_eq!(
            &source[found[0].start_byte..found[0].end_byte],
            "list.Any().Should().BeTrue()"
        );
        assert_eq!(found[1].text, "list.Count.Should().Be(0)");
    }
}
