//! Lexer and recursive-descent parser for filter expressions.

use crate::ast::{CompareOp, FilterNode, FilterValue};
use crate::{FilterError, FilterResult};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Int(i64),
    Float(f64),
    Op(CompareOp),
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    position: usize,
}

fn lex(input: &str) -> FilterResult<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            ' ' | '\t' | '\r' | '\n' => {
                i += 1;
            }
            '(' => {
                tokens.push(Spanned {
                    token: Token::LParen,
                    position: i,
                });
                i += 1;
            }
            ')' => {
                tokens.push(Spanned {
                    token: Token::RParen,
                    position: i,
                });
                i += 1;
            }
            ',' => {
                tokens.push(Spanned {
                    token: Token::Comma,
                    position: i,
                });
                i += 1;
            }
            ':' => {
                tokens.push(Spanned {
                    token: Token::Op(CompareOp::Eq),
                    position: i,
                });
                i += 1;
            }
            '!' => {
                tokens.push(Spanned {
                    token: Token::Op(CompareOp::Ne),
                    position: i,
                });
                i += 1;
            }
            '~' => {
                tokens.push(Spanned {
                    token: Token::Op(CompareOp::Like),
                    position: i,
                });
                i += 1;
            }
            '>' => {
                if bytes.get(i + 1) == Some(&b':') {
                    tokens.push(Spanned {
                        token: Token::Op(CompareOp::Gte),
                        position: i,
                    });
                    i += 2;
                } else {
                    tokens.push(Spanned {
                        token: Token::Op(CompareOp::Gt),
                        position: i,
                    });
                    i += 1;
                }
            }
            '<' => {
                if bytes.get(i + 1) == Some(&b':') {
                    tokens.push(Spanned {
                        token: Token::Op(CompareOp::Lte),
                        position: i,
                    });
                    i += 2;
                } else {
                    tokens.push(Spanned {
                        token: Token::Op(CompareOp::Lt),
                        position: i,
                    });
                    i += 1;
                }
            }
            '\'' => {
                let start = i;
                i += 1;
                let mut value = String::new();
                let mut closed = false;
                while i < bytes.len() {
                    let c = bytes[i] as char;
                    if c == '\\' && i + 1 < bytes.len() {
                        value.push(bytes[i + 1] as char);
                        i += 2;
                    } else if c == '\'' {
                        closed = true;
                        i += 1;
                        break;
                    } else {
                        // Strings are quoted ASCII-or-UTF-8; copy char-wise
                        let ch_len = input[i..].chars().next().map(char::len_utf8).unwrap_or(1);
                        value.push_str(&input[i..i + ch_len]);
                        i += ch_len;
                    }
                }
                if !closed {
                    return Err(FilterError::malformed(start, "unterminated string literal"));
                }
                tokens.push(Spanned {
                    token: Token::Str(value),
                    position: start,
                });
            }
            c if c.is_ascii_digit() || c == '-' => {
                let start = i;
                i += 1;
                let mut is_float = false;
                while i < bytes.len() {
                    let c = bytes[i] as char;
                    if c.is_ascii_digit() {
                        i += 1;
                    } else if c == '.' && !is_float && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()) {
                        is_float = true;
                        i += 1;
                    } else {
                        break;
                    }
                }
                let raw = &input[start..i];
                let token = if is_float {
                    Token::Float(raw.parse().map_err(|_| {
                        FilterError::malformed(start, format!("invalid number '{}'", raw))
                    })?)
                } else {
                    Token::Int(raw.parse().map_err(|_| {
                        FilterError::malformed(start, format!("invalid number '{}'", raw))
                    })?)
                };
                tokens.push(Spanned {
                    token,
                    position: start,
                });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < bytes.len() {
                    let c = bytes[i] as char;
                    if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                        i += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Spanned {
                    token: Token::Ident(input[start..i].to_string()),
                    position: start,
                });
            }
            other => {
                return Err(FilterError::malformed(
                    i,
                    format!("unexpected character '{}'", other),
                ));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    input_len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn position(&self) -> usize {
        self.peek().map(|t| t.position).unwrap_or(self.input_len)
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.peek(),
            Some(Spanned {
                token: Token::Ident(word),
                ..
            }) if word.eq_ignore_ascii_case(keyword)
        )
    }

    fn expr(&mut self) -> FilterResult<FilterNode> {
        let mut nodes = vec![self.and_expr()?];
        while self.peek_keyword("or") {
            self.advance();
            nodes.push(self.and_expr()?);
        }
        Ok(if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            FilterNode::Or(nodes)
        })
    }

    fn and_expr(&mut self) -> FilterResult<FilterNode> {
        let mut nodes = vec![self.not_expr()?];
        while self.peek_keyword("and") {
            self.advance();
            nodes.push(self.not_expr()?);
        }
        Ok(if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            FilterNode::And(nodes)
        })
    }

    fn not_expr(&mut self) -> FilterResult<FilterNode> {
        if self.peek_keyword("not") {
            self.advance();
            let inner = self.not_expr()?;
            return Ok(FilterNode::Not(Box::new(inner)));
        }
        self.primary()
    }

    fn primary(&mut self) -> FilterResult<FilterNode> {
        let position = self.position();
        match self.advance() {
            Some(Spanned {
                token: Token::LParen,
                ..
            }) => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Spanned {
                        token: Token::RParen,
                        ..
                    }) => Ok(inner),
                    _ => Err(FilterError::malformed(
                        self.position(),
                        "expected closing parenthesis",
                    )),
                }
            }
            Some(Spanned {
                token: Token::Ident(field),
                ..
            }) => self.comparison(field),
            Some(other) => Err(FilterError::malformed(
                other.position,
                "expected a field name or '('",
            )),
            None => Err(FilterError::malformed(position, "unexpected end of filter")),
        }
    }

    fn comparison(&mut self, field: String) -> FilterResult<FilterNode> {
        if self.peek_keyword("in") {
            self.advance();
            return self.in_list(field);
        }

        let position = self.position();
        match self.advance() {
            Some(Spanned {
                token: Token::Op(op),
                ..
            }) => {
                let value = self.value()?;
                Ok(FilterNode::Compare { field, op, value })
            }
            Some(other) => Err(FilterError::malformed(
                other.position,
                format!("expected an operator after '{}'", field),
            )),
            None => Err(FilterError::malformed(
                position,
                format!("expected an operator after '{}'", field),
            )),
        }
    }

    fn in_list(&mut self, field: String) -> FilterResult<FilterNode> {
        match self.advance() {
            Some(Spanned {
                token: Token::LParen,
                ..
            }) => {}
            _ => {
                return Err(FilterError::malformed(
                    self.position(),
                    "expected '(' after 'in'",
                ))
            }
        }

        let mut values = vec![self.value()?];
        loop {
            match self.advance() {
                Some(Spanned {
                    token: Token::Comma,
                    ..
                }) => values.push(self.value()?),
                Some(Spanned {
                    token: Token::RParen,
                    ..
                }) => break,
                _ => {
                    return Err(FilterError::malformed(
                        self.position(),
                        "expected ',' or ')' in value list",
                    ))
                }
            }
        }

        Ok(FilterNode::In { field, values })
    }

    fn value(&mut self) -> FilterResult<FilterValue> {
        let position = self.position();
        match self.advance() {
            Some(Spanned {
                token: Token::Str(s),
                ..
            }) => Ok(FilterValue::Str(s)),
            Some(Spanned {
                token: Token::Int(n),
                ..
            }) => Ok(FilterValue::Int(n)),
            Some(Spanned {
                token: Token::Float(n),
                ..
            }) => Ok(FilterValue::Float(n)),
            Some(Spanned {
                token: Token::Ident(word),
                position,
            }) => {
                if word.eq_ignore_ascii_case("true") {
                    Ok(FilterValue::Bool(true))
                } else if word.eq_ignore_ascii_case("false") {
                    Ok(FilterValue::Bool(false))
                } else {
                    Err(FilterError::malformed(
                        position,
                        format!("expected a value, found '{}'", word),
                    ))
                }
            }
            Some(other) => Err(FilterError::malformed(other.position, "expected a value")),
            None => Err(FilterError::malformed(position, "expected a value")),
        }
    }
}

/// Parse a filter expression into a [`FilterNode`] tree.
pub fn parse(input: &str) -> FilterResult<FilterNode> {
    if input.trim().is_empty() {
        return Err(FilterError::malformed(0, "empty filter expression"));
    }

    let tokens = lex(input)?;
    let input_len = input.len();
    let mut parser = Parser {
        tokens,
        pos: 0,
        input_len,
    };

    let node = parser.expr()?;

    if let Some(extra) = parser.peek() {
        return Err(FilterError::malformed(
            extra.position,
            "unexpected trailing input",
        ));
    }

    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare(field: &str, op: CompareOp, value: FilterValue) -> FilterNode {
        FilterNode::Compare {
            field: field.to_string(),
            op,
            value,
        }
    }

    #[test]
    fn test_parse_simple_equality() {
        let node = parse("email:'user@example.com'").unwrap();
        assert_eq!(
            node,
            compare(
                "email",
                CompareOp::Eq,
                FilterValue::Str("user@example.com".to_string())
            )
        );
    }

    #[test]
    fn test_parse_all_operators() {
        assert!(matches!(
            parse("salary>:2000").unwrap(),
            FilterNode::Compare {
                op: CompareOp::Gte,
                ..
            }
        ));
        assert!(matches!(
            parse("salary<:2000").unwrap(),
            FilterNode::Compare {
                op: CompareOp::Lte,
                ..
            }
        ));
        assert!(matches!(
            parse("salary>100").unwrap(),
            FilterNode::Compare {
                op: CompareOp::Gt,
                ..
            }
        ));
        assert!(matches!(
            parse("salary<100").unwrap(),
            FilterNode::Compare {
                op: CompareOp::Lt,
                ..
            }
        ));
        assert!(matches!(
            parse("name!'bob'").unwrap(),
            FilterNode::Compare {
                op: CompareOp::Ne,
                ..
            }
        ));
        assert!(matches!(
            parse("name~'rust*'").unwrap(),
            FilterNode::Compare {
                op: CompareOp::Like,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_and_binds_tighter_than_or() {
        let node = parse("a:1 or b:2 and c:3").unwrap();
        assert_eq!(
            node,
            FilterNode::Or(vec![
                compare("a", CompareOp::Eq, FilterValue::Int(1)),
                FilterNode::And(vec![
                    compare("b", CompareOp::Eq, FilterValue::Int(2)),
                    compare("c", CompareOp::Eq, FilterValue::Int(3)),
                ]),
            ])
        );
    }

    #[test]
    fn test_parse_parentheses_override_precedence() {
        let node = parse("(a:1 or b:2) and c:3").unwrap();
        assert_eq!(
            node,
            FilterNode::And(vec![
                FilterNode::Or(vec![
                    compare("a", CompareOp::Eq, FilterValue::Int(1)),
                    compare("b", CompareOp::Eq, FilterValue::Int(2)),
                ]),
                compare("c", CompareOp::Eq, FilterValue::Int(3)),
            ])
        );
    }

    #[test]
    fn test_parse_not() {
        let node = parse("not active:true").unwrap();
        assert_eq!(
            node,
            FilterNode::Not(Box::new(compare(
                "active",
                CompareOp::Eq,
                FilterValue::Bool(true)
            )))
        );
    }

    #[test]
    fn test_parse_in_list() {
        let node = parse("job.id in (1, 2, 3)").unwrap();
        assert_eq!(
            node,
            FilterNode::In {
                field: "job.id".to_string(),
                values: vec![
                    FilterValue::Int(1),
                    FilterValue::Int(2),
                    FilterValue::Int(3)
                ],
            }
        );
    }

    #[test]
    fn test_parse_keywords_case_insensitive() {
        let node = parse("a:1 AND b:2 OR NOT c:3").unwrap();
        assert!(matches!(node, FilterNode::Or(_)));
    }

    #[test]
    fn test_parse_escaped_quote_in_string() {
        let node = parse(r"name:'O\'Brien'").unwrap();
        assert_eq!(
            node,
            compare(
                "name",
                CompareOp::Eq,
                FilterValue::Str("O'Brien".to_string())
            )
        );
    }

    #[test]
    fn test_parse_empty_input_is_malformed() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, FilterError::Malformed { position: 0, .. }));
        assert!(parse("   ").is_err());
    }

    #[test]
    fn test_parse_unterminated_string_reports_position() {
        let err = parse("email:'oops").unwrap_err();
        match err {
            FilterError::Malformed { position, message } => {
                assert_eq!(position, 6);
                assert!(message.contains("unterminated"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_in_list_is_malformed() {
        assert!(parse("id in ()").is_err());
    }

    #[test]
    fn test_parse_trailing_garbage_is_malformed() {
        let err = parse("a:1 b:2").unwrap_err();
        assert!(matches!(err, FilterError::Malformed { .. }));
    }

    #[test]
    fn test_parse_missing_operator_is_malformed() {
        assert!(parse("email").is_err());
        assert!(parse("email 'x'").is_err());
    }

    #[test]
    fn test_parse_deeply_nested_parentheses() {
        let node = parse("(((a:1)))").unwrap();
        assert_eq!(node, compare("a", CompareOp::Eq, FilterValue::Int(1)));
    }

    #[test]
    fn test_parse_negative_and_float_numbers() {
        assert_eq!(
            parse("balance:-5").unwrap(),
            compare("balance", CompareOp::Eq, FilterValue::Int(-5))
        );
        assert_eq!(
            parse("salary>:1500.5").unwrap(),
            compare("salary", CompareOp::Gte, FilterValue::Float(1500.5))
        );
    }

    #[test]
    fn test_round_trip_canonical_form() {
        let inputs = [
            "email:'user@example.com'",
            "a:1 or b:2 and c:3",
            "(a:1 or b:2) and c:3",
            "not (active:true and level:'SENIOR')",
            "job.id in (1,2,3) and status!'REJECTED'",
            "name~'rust*' or salary>:2000.5",
            "salary:2000.0",
        ];

        for input in inputs {
            let tree = parse(input).unwrap();
            let canonical = tree.to_string();
            let reparsed = parse(&canonical)
                .unwrap_or_else(|e| panic!("canonical form '{}' failed to parse: {}", canonical, e));
            assert_eq!(tree, reparsed, "round trip failed for '{}'", input);
        }
    }
}
