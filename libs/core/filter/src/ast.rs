use std::fmt;

/// A literal value appearing on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Str(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            FilterValue::Int(n) => write!(f, "{}", n),
            // integral floats keep their decimal point so the canonical
            // form reparses as a float, not an int
            FilterValue::Float(n) if n.fract() == 0.0 => write!(f, "{:.1}", n),
            FilterValue::Float(n) => write!(f, "{}", n),
            FilterValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => ":",
            CompareOp::Ne => "!",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">:",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<:",
            CompareOp::Like => "~",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed filter expression.
///
/// `And`/`Or` hold two or more children; single-operand chains collapse to
/// the child itself during parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Compare {
        field: String,
        op: CompareOp,
        value: FilterValue,
    },
    In {
        field: String,
        values: Vec<FilterValue>,
    },
    And(Vec<FilterNode>),
    Or(Vec<FilterNode>),
    Not(Box<FilterNode>),
}

impl FilterNode {
    fn is_composite(&self) -> bool {
        matches!(
            self,
            FilterNode::And(_) | FilterNode::Or(_) | FilterNode::Not(_)
        )
    }

    fn fmt_child(child: &FilterNode, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if child.is_composite() {
            write!(f, "({})", child)
        } else {
            write!(f, "{}", child)
        }
    }
}

impl fmt::Display for FilterNode {
    /// Canonical re-serialization. Composite children are always
    /// parenthesized so the output parses back to an equal tree.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Compare { field, op, value } => write!(f, "{}{}{}", field, op, value),
            FilterNode::In { field, values } => {
                write!(f, "{} in (", field)?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
            FilterNode::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " and ")?;
                    }
                    Self::fmt_child(child, f)?;
                }
                Ok(())
            }
            FilterNode::Or(children) => {
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    Self::fmt_child(child, f)?;
                }
                Ok(())
            }
            FilterNode::Not(inner) => {
                write!(f, "not ")?;
                Self::fmt_child(inner, f)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_comparison() {
        let node = FilterNode::Compare {
            field: "email".to_string(),
            op: CompareOp::Eq,
            value: FilterValue::Str("a@b.c".to_string()),
        };
        assert_eq!(node.to_string(), "email:'a@b.c'");
    }

    #[test]
    fn test_display_escapes_quotes() {
        let value = FilterValue::Str("it's".to_string());
        assert_eq!(value.to_string(), "'it\\'s'");
    }

    #[test]
    fn test_display_integral_float_keeps_decimal_point() {
        assert_eq!(FilterValue::Float(2000.0).to_string(), "2000.0");
        assert_eq!(FilterValue::Float(12.5).to_string(), "12.5");
    }

    #[test]
    fn test_display_in_list() {
        let node = FilterNode::In {
            field: "job.id".to_string(),
            values: vec![FilterValue::Int(1), FilterValue::Int(2)],
        };
        assert_eq!(node.to_string(), "job.id in (1,2)");
    }

    #[test]
    fn test_display_parenthesizes_composite_children() {
        let node = FilterNode::And(vec![
            FilterNode::Or(vec![
                FilterNode::Compare {
                    field: "a".to_string(),
                    op: CompareOp::Eq,
                    value: FilterValue::Int(1),
                },
                FilterNode::Compare {
                    field: "b".to_string(),
                    op: CompareOp::Eq,
                    value: FilterValue::Int(2),
                },
            ]),
            FilterNode::Compare {
                field: "c".to_string(),
                op: CompareOp::Eq,
                value: FilterValue::Bool(true),
            },
        ]);
        assert_eq!(node.to_string(), "(a:1 or b:2) and c:true");
    }
}
