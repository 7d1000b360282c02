//! Compilation of filter trees into SeaORM [`Condition`]s.

use std::collections::HashMap;

use sea_orm::sea_query::{Alias, Condition, Expr, ExprTrait, SimpleExpr};
use sea_orm::Value;

use crate::ast::{CompareOp, FilterNode, FilterValue};
use crate::{FilterError, FilterResult};

/// Maps public filter field names onto database column names.
///
/// Repositories expose only the fields they want filterable; anything else
/// is rejected with [`FilterError::UnknownField`].
pub trait FieldResolver {
    fn column(&self, field: &str) -> Option<&str>;
}

/// A [`FieldResolver`] backed by a static field -> column map.
#[derive(Debug, Default, Clone)]
pub struct MapResolver {
    columns: HashMap<&'static str, &'static str>,
}

impl MapResolver {
    pub fn new(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            columns: entries.iter().copied().collect(),
        }
    }
}

impl FieldResolver for MapResolver {
    fn column(&self, field: &str) -> Option<&str> {
        self.columns.get(field).copied()
    }
}

fn to_value(value: &FilterValue) -> Value {
    match value {
        FilterValue::Str(s) => Value::from(s.clone()),
        FilterValue::Int(n) => Value::from(*n),
        FilterValue::Float(n) => Value::from(*n),
        FilterValue::Bool(b) => Value::from(*b),
    }
}

/// Translate a `~` pattern into a SQL LIKE pattern.
///
/// `*` becomes `%`; a pattern without wildcards matches as a substring.
pub fn like_pattern(raw: &str) -> String {
    if raw.contains('*') {
        raw.replace('%', "\\%").replace('*', "%")
    } else {
        format!("%{}%", raw.replace('%', "\\%"))
    }
}

fn compare_expr(
    column: &str,
    op: CompareOp,
    value: &FilterValue,
    field: &str,
) -> FilterResult<SimpleExpr> {
    let col = Expr::col(Alias::new(column));
    let expr = match op {
        CompareOp::Eq => col.eq(to_value(value)),
        CompareOp::Ne => col.ne(to_value(value)),
        CompareOp::Gt => col.gt(to_value(value)),
        CompareOp::Gte => col.gte(to_value(value)),
        CompareOp::Lt => col.lt(to_value(value)),
        CompareOp::Lte => col.lte(to_value(value)),
        CompareOp::Like => match value {
            FilterValue::Str(s) => col.like(like_pattern(s)),
            _ => {
                return Err(FilterError::BadOperand {
                    field: field.to_string(),
                    op: op.symbol().to_string(),
                })
            }
        },
    };
    Ok(expr)
}

/// Compile a filter tree into a [`Condition`] using the given resolver.
pub fn to_condition(node: &FilterNode, resolver: &dyn FieldResolver) -> FilterResult<Condition> {
    match node {
        FilterNode::Compare { field, op, value } => {
            let column = resolver
                .column(field)
                .ok_or_else(|| FilterError::UnknownField(field.clone()))?;
            Ok(Condition::all().add(compare_expr(column, *op, value, field)?))
        }
        FilterNode::In { field, values } => {
            let column = resolver
                .column(field)
                .ok_or_else(|| FilterError::UnknownField(field.clone()))?;
            let values: Vec<Value> = values.iter().map(to_value).collect();
            Ok(Condition::all().add(Expr::col(Alias::new(column)).is_in(values)))
        }
        FilterNode::And(children) => {
            let mut condition = Condition::all();
            for child in children {
                condition = condition.add(to_condition(child, resolver)?);
            }
            Ok(condition)
        }
        FilterNode::Or(children) => {
            let mut condition = Condition::any();
            for child in children {
                condition = condition.add(to_condition(child, resolver)?);
            }
            Ok(condition)
        }
        FilterNode::Not(inner) => Ok(to_condition(inner, resolver)?.not()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn resolver() -> MapResolver {
        MapResolver::new(&[
            ("name", "name"),
            ("email", "email"),
            ("salary", "salary"),
            ("active", "active"),
            ("company.id", "company_id"),
        ])
    }

    #[test]
    fn test_compile_comparison() {
        let node = parse("email:'a@b.c'").unwrap();
        assert!(to_condition(&node, &resolver()).is_ok());
    }

    #[test]
    fn test_compile_boolean_tree() {
        let node = parse("active:true and (salary>:1000 or company.id in (1,2))").unwrap();
        assert!(to_condition(&node, &resolver()).is_ok());
    }

    #[test]
    fn test_compile_not() {
        let node = parse("not email~'spam*'").unwrap();
        assert!(to_condition(&node, &resolver()).is_ok());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let node = parse("password:'x'").unwrap();
        let err = to_condition(&node, &resolver()).unwrap_err();
        assert_eq!(err, FilterError::UnknownField("password".to_string()));
    }

    #[test]
    fn test_like_requires_string_operand() {
        let node = parse("salary~5").unwrap();
        let err = to_condition(&node, &resolver()).unwrap_err();
        assert!(matches!(err, FilterError::BadOperand { .. }));
    }

    #[test]
    fn test_like_pattern_translation() {
        assert_eq!(like_pattern("rust*"), "rust%");
        assert_eq!(like_pattern("*corp*"), "%corp%");
        assert_eq!(like_pattern("plain"), "%plain%");
        assert_eq!(like_pattern("50%*"), "50\\%%");
    }
}
