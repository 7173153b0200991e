//! isotest parser
//!
//! Converts script source into AST nodes with source location tracking.
//! Purely syntactic: special forms and arity are checked by the evaluator.

use std::sync::Arc;

use pest::{
    error::{Error, LineColLocation},
    iterators::Pair,
    Parser,
};
use pest_derive::Parser;
use thiserror::Error;

use crate::syntax::{AstNode, Expr, Span, Spanned};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct ScriptParser;

/// A syntax error with the 1-based position it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse script source into top-level AST nodes.
pub fn parse(source_text: &str) -> Result<Vec<AstNode>, ParseError> {
    let mut pairs = ScriptParser::parse(Rule::program, source_text).map_err(convert_parse_error)?;

    let Some(program) = pairs.next() else {
        return Ok(vec![]);
    };

    program
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(build_ast_node)
        .collect()
}

// ============================================================================
// AST BUILDERS
// ============================================================================

fn build_ast_node(pair: Pair<Rule>) -> Result<AstNode, ParseError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::integer => {
            let text = pair.as_str();
            let value = text
                .parse::<i64>()
                .map_err(|_| make_error(&pair, format!("integer literal out of range: {text}")))?;
            Ok(make_node(Expr::Int(value), span))
        }

        Rule::float => {
            let text = pair.as_str();
            let value = text
                .parse::<f64>()
                .map_err(|_| make_error(&pair, format!("invalid float literal: {text}")))?;
            Ok(make_node(Expr::Float(value), span))
        }

        Rule::boolean => Ok(make_node(Expr::Bool(pair.as_str() == "true"), span)),

        Rule::nil => Ok(make_node(Expr::Nil, span)),

        Rule::string => Ok(make_node(Expr::String(unescape_string(pair.as_str())), span)),

        Rule::symbol => Ok(make_node(Expr::Symbol(pair.as_str().to_string()), span)),

        Rule::params => {
            let names = pair.into_inner().map(|p| p.as_str().to_string()).collect();
            Ok(make_node(Expr::Params(names), span))
        }

        Rule::list => {
            let children = pair
                .into_inner()
                .map(build_ast_node)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(make_node(Expr::List(children), span))
        }

        rule => Err(make_error(&pair, format!("unsupported rule: {rule:?}"))),
    }
}

fn make_node(expr: Expr, span: Span) -> AstNode {
    Spanned {
        value: Arc::new(expr),
        span,
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    let span = pair.as_span();
    Span {
        start: span.start(),
        end: span.end(),
        line: span.start_pos().line_col().0,
    }
}

fn unescape_string(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    result
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn make_error(pair: &Pair<Rule>, message: String) -> ParseError {
    let (line, column) = pair.as_span().start_pos().line_col();
    ParseError {
        line,
        column,
        message,
    }
}

fn convert_parse_error(error: Error<Rule>) -> ParseError {
    let (line, column) = match error.line_col {
        LineColLocation::Pos(pos) => pos,
        LineColLocation::Span(start, _) => start,
    };

    let expected = error.variant.message().to_string();
    let message = if expected.contains("list") && expected.contains("symbol") {
        "unexpected token or missing closing parenthesis".to_string()
    } else {
        expected
    };

    ParseError {
        line,
        column,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(source: &str) -> AstNode {
        let mut nodes = parse(source).unwrap();
        assert_eq!(nodes.len(), 1, "expected one node in {source:?}");
        nodes.remove(0)
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  ; only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn test_literals() {
        assert_eq!(*single("42").value, Expr::Int(42));
        assert_eq!(*single("-7").value, Expr::Int(-7));
        assert_eq!(*single("1.5").value, Expr::Float(1.5));
        assert_eq!(*single("true").value, Expr::Bool(true));
        assert_eq!(*single("nil").value, Expr::Nil);
        assert_eq!(*single("-").value, Expr::Symbol("-".into()));
        assert_eq!(*single("nil?").value, Expr::Symbol("nil?".into()));
        assert_eq!(*single("assert-equal").value, Expr::Symbol("assert-equal".into()));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            *single(r#""a\n\"b\"""#).value,
            Expr::String("a\n\"b\"".into())
        );
    }

    #[test]
    fn test_spans_carry_lines() {
        let nodes = parse("(a)\n\n  (b\n c)").unwrap();
        assert_eq!(nodes[0].span.line, 1);
        assert_eq!(nodes[1].span.line, 3);
        let Expr::List(items) = &*nodes[1].value else {
            panic!("expected list");
        };
        assert_eq!(items[1].span.line, 4);
    }

    #[test]
    fn test_params() {
        let node = single("(fn [a b] a)");
        let Expr::List(items) = &*node.value else {
            panic!("expected list");
        };
        assert_eq!(items[1].value.as_params(), Some(&["a".to_string(), "b".to_string()][..]));
    }

    #[test]
    fn test_unmatched_paren_reports_position() {
        let err = parse("(a\n  (b c)").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.column > 0);
    }
}
