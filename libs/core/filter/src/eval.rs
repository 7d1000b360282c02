//! Direct evaluation of filter trees against JSON values.
//!
//! In-memory repositories serialize their models to `serde_json::Value` and
//! run filters through [`matches`], so both repository implementations share
//! one filter semantics.

use serde_json::Value;

use crate::ast::{CompareOp, FilterNode, FilterValue};
use crate::condition::like_pattern;
use crate::{FilterError, FilterResult};

/// Look up a dotted field path (`company.id`) inside a JSON object.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn filter_value_as_f64(value: &FilterValue) -> Option<f64> {
    match value {
        FilterValue::Int(n) => Some(*n as f64),
        FilterValue::Float(n) => Some(*n),
        _ => None,
    }
}

fn equals(actual: &Value, expected: &FilterValue) -> bool {
    match expected {
        FilterValue::Str(s) => actual.as_str() == Some(s.as_str()),
        FilterValue::Bool(b) => actual.as_bool() == Some(*b),
        FilterValue::Int(_) | FilterValue::Float(_) => match (as_f64(actual), filter_value_as_f64(expected)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn ordered(
    actual: &Value,
    expected: &FilterValue,
    field: &str,
    op: CompareOp,
) -> FilterResult<bool> {
    // Numbers compare numerically, strings lexicographically
    if let (Some(a), Some(b)) = (as_f64(actual), filter_value_as_f64(expected)) {
        return Ok(match op {
            CompareOp::Gt => a > b,
            CompareOp::Gte => a >= b,
            CompareOp::Lt => a < b,
            CompareOp::Lte => a <= b,
            _ => false,
        });
    }

    if let (Some(a), FilterValue::Str(b)) = (actual.as_str(), expected) {
        return Ok(match op {
            CompareOp::Gt => a > b.as_str(),
            CompareOp::Gte => a >= b.as_str(),
            CompareOp::Lt => a < b.as_str(),
            CompareOp::Lte => a <= b.as_str(),
            _ => false,
        });
    }

    Err(FilterError::BadOperand {
        field: field.to_string(),
        op: op.symbol().to_string(),
    })
}

/// Match a SQL LIKE pattern (after `*` -> `%` translation), case-insensitive.
fn like_matches(actual: &str, raw_pattern: &str) -> bool {
    let pattern = like_pattern(raw_pattern);
    let actual = actual.to_lowercase();
    let pattern = pattern.to_lowercase();

    let segments: Vec<&str> = pattern.split('%').collect();
    let mut rest = actual.as_str();

    for (i, segment) in segments.iter().enumerate() {
        let segment = segment.replace("\\%", "%");
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            if !rest.starts_with(&segment) {
                return false;
            }
            rest = &rest[segment.len()..];
        } else if i == segments.len() - 1 {
            return rest.ends_with(&segment);
        } else {
            match rest.find(&segment) {
                Some(idx) => rest = &rest[idx + segment.len()..],
                None => return false,
            }
        }
    }

    // Pattern ends with '%' (or consumed everything)
    segments.last().map(|s| s.is_empty()).unwrap_or(true) || rest.is_empty()
}

/// Evaluate a filter tree against a JSON representation of a record.
///
/// Unknown fields are an error so in-memory and SQL repositories reject the
/// same expressions.
pub fn matches(node: &FilterNode, record: &Value) -> FilterResult<bool> {
    match node {
        FilterNode::Compare { field, op, value } => {
            let actual = lookup(record, field)
                .ok_or_else(|| FilterError::UnknownField(field.clone()))?;

            if actual.is_null() {
                // NULL never matches a comparison, mirroring SQL
                return Ok(false);
            }

            match op {
                CompareOp::Eq => Ok(equals(actual, value)),
                CompareOp::Ne => Ok(!equals(actual, value)),
                CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => {
                    ordered(actual, value, field, *op)
                }
                CompareOp::Like => match (actual.as_str(), value) {
                    (Some(actual), FilterValue::Str(pattern)) => Ok(like_matches(actual, pattern)),
                    _ => Err(FilterError::BadOperand {
                        field: field.clone(),
                        op: op.symbol().to_string(),
                    }),
                },
            }
        }
        FilterNode::In { field, values } => {
            let actual = lookup(record, field)
                .ok_or_else(|| FilterError::UnknownField(field.clone()))?;
            if actual.is_null() {
                return Ok(false);
            }
            Ok(values.iter().any(|v| equals(actual, v)))
        }
        FilterNode::And(children) => {
            for child in children {
                if !matches(child, record)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        FilterNode::Or(children) => {
            for child in children {
                if matches(child, record)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        FilterNode::Not(inner) => Ok(!matches(inner, record)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "id": 7,
            "name": "Backend Engineer",
            "salary": 2500,
            "active": true,
            "level": "SENIOR",
            "company": { "id": 3, "name": "Acme" },
            "end_date": null,
        })
    }

    fn eval(expr: &str) -> bool {
        matches(&parse(expr).unwrap(), &record()).unwrap()
    }

    #[test]
    fn test_eq_and_ne() {
        assert!(eval("level:'SENIOR'"));
        assert!(!eval("level:'JUNIOR'"));
        assert!(eval("level!'JUNIOR'"));
        assert!(eval("active:true"));
        assert!(eval("salary:2500"));
    }

    #[test]
    fn test_ordering() {
        assert!(eval("salary>2000"));
        assert!(eval("salary>:2500"));
        assert!(!eval("salary<2500"));
        assert!(eval("salary<:2500"));
    }

    #[test]
    fn test_like() {
        assert!(eval("name~'backend*'"));
        assert!(eval("name~'*engineer'"));
        assert!(eval("name~'ackend'"));
        assert!(!eval("name~'frontend*'"));
    }

    #[test]
    fn test_dotted_path() {
        assert!(eval("company.id:3"));
        assert!(eval("company.name:'Acme'"));
    }

    #[test]
    fn test_in() {
        assert!(eval("company.id in (1,2,3)"));
        assert!(!eval("company.id in (8,9)"));
        assert!(eval("level in ('SENIOR','MIDDLE')"));
    }

    #[test]
    fn test_boolean_combinators() {
        assert!(eval("active:true and salary>2000"));
        assert!(eval("active:false or salary>2000"));
        assert!(eval("not active:false"));
        assert!(!eval("not (active:true and salary>2000)"));
    }

    #[test]
    fn test_null_never_matches() {
        assert!(!eval("end_date:'2024-01-01'"));
        assert!(!eval("end_date in ('2024-01-01')"));
    }

    #[test]
    fn test_unknown_field_errors() {
        let err = matches(&parse("missing:'x'").unwrap(), &record()).unwrap_err();
        assert_eq!(err, FilterError::UnknownField("missing".to_string()));
    }
}
