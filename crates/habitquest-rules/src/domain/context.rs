//! Context expressions: AND/OR/NOT trees over roll tags.
//!
//! A [`ContextExpression`] can only be built through its validating
//! constructors (or deserialized through them), so arity and depth rules
//! are enforced before evaluation ever sees a tree.

use std::fmt;

use habitquest_core::error::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ability::{CoreStat, names_match};
use super::effect::ResolutionContext;

/// Maximum operator nesting. A bare tag leaf has depth 0.
pub const MAX_DEPTH: usize = 3;

/// Which tag of the in-flight roll a leaf compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCategory {
    /// The roll's resolution context.
    RollType,
    /// The ability being rolled.
    Ability,
    /// The core stat of the ability being rolled.
    CoreStat,
    /// An organizational tag attached to the roll.
    Tag,
    /// Any category this build does not know. Never matches.
    #[serde(other)]
    Unknown,
}

/// Logical operator of an interior node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// All children must match.
    And,
    /// At least one child must match.
    Or,
    /// Negates its single child.
    Not,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
        })
    }
}

/// Construction-time validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// AND/OR with no children.
    #[error("{op} requires at least one child")]
    EmptyChildren {
        /// The offending operator.
        op: LogicalOp,
    },

    /// NOT with a child count other than one.
    #[error("NOT requires exactly one child, found {found}")]
    NotArity {
        /// Number of children supplied.
        found: usize,
    },

    /// Nesting deeper than [`MAX_DEPTH`].
    #[error("context expression depth {depth} exceeds maximum of {max}")]
    TooDeep {
        /// Depth the expression would have had.
        depth: usize,
        /// The allowed maximum.
        max: usize,
    },
}

impl From<ContextError> for DomainError {
    fn from(err: ContextError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Tag { category: TagCategory, value: String },
    And(Vec<ContextExpression>),
    Or(Vec<ContextExpression>),
    Not(Box<ContextExpression>),
}

/// A validated tag expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContextExpression", into = "RawContextExpression")]
pub struct ContextExpression {
    node: Node,
    depth: usize,
}

impl ContextExpression {
    /// A leaf comparing one tag category against `value`.
    #[must_use]
    pub fn tag(category: TagCategory, value: impl Into<String>) -> Self {
        Self {
            node: Node::Tag {
                category,
                value: value.into(),
            },
            depth: 0,
        }
    }

    /// Conjunction of one or more children.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::EmptyChildren` for an empty list and
    /// `ContextError::TooDeep` if nesting would exceed [`MAX_DEPTH`].
    pub fn and(children: Vec<Self>) -> Result<Self, ContextError> {
        Self::branch(LogicalOp::And, children)
    }

    /// Disjunction of one or more children.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::EmptyChildren` for an empty list and
    /// `ContextError::TooDeep` if nesting would exceed [`MAX_DEPTH`].
    pub fn or(children: Vec<Self>) -> Result<Self, ContextError> {
        Self::branch(LogicalOp::Or, children)
    }

    /// Negation of exactly one child.
    ///
    /// # Errors
    ///
    /// Returns `ContextError::NotArity` unless exactly one child is given and
    /// `ContextError::TooDeep` if nesting would exceed [`MAX_DEPTH`].
    pub fn not(children: Vec<Self>) -> Result<Self, ContextError> {
        Self::branch(LogicalOp::Not, children)
    }

    fn branch(op: LogicalOp, mut children: Vec<Self>) -> Result<Self, ContextError> {
        match op {
            LogicalOp::Not if children.len() != 1 => {
                return Err(ContextError::NotArity {
                    found: children.len(),
                });
            }
            LogicalOp::And | LogicalOp::Or if children.is_empty() => {
                return Err(ContextError::EmptyChildren { op });
            }
            _ => {}
        }

        let depth = 1 + children.iter().map(|c| c.depth).max().unwrap_or(0);
        if depth > MAX_DEPTH {
            return Err(ContextError::TooDeep {
                depth,
                max: MAX_DEPTH,
            });
        }

        let node = match op {
            LogicalOp::And => Node::And(children),
            LogicalOp::Or => Node::Or(children),
            LogicalOp::Not => match children.pop() {
                Some(child) => Node::Not(Box::new(child)),
                None => return Err(ContextError::NotArity { found: 0 }),
            },
        };
        Ok(Self { node, depth })
    }

    /// Operator nesting depth of this expression.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Evaluates the expression against the roll's tags.
    #[must_use]
    pub fn matches(&self, tags: &CurrentTags) -> bool {
        match &self.node {
            Node::Tag { category, value } => tags.has(*category, value),
            Node::And(children) => children.iter().all(|c| c.matches(tags)),
            Node::Or(children) => children.iter().any(|c| c.matches(tags)),
            Node::Not(child) => !child.matches(tags),
        }
    }
}

/// Evaluates an optional expression; absence matches every roll.
#[must_use]
pub fn matches(expr: Option<&ContextExpression>, tags: &CurrentTags) -> bool {
    expr.is_none_or(|e| e.matches(tags))
}

/// Tags describing the roll in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentTags {
    /// The roll's resolution context.
    pub roll_type: ResolutionContext,
    /// Ability being rolled, if any.
    pub ability: Option<String>,
    /// Core stat of that ability, if known.
    pub core_stat: Option<CoreStat>,
    /// Organizational tags attached by the caller.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CurrentTags {
    fn has(&self, category: TagCategory, value: &str) -> bool {
        match category {
            TagCategory::RollType => self.roll_type.as_str().eq_ignore_ascii_case(value),
            TagCategory::Ability => self
                .ability
                .as_deref()
                .is_some_and(|a| names_match(a, value)),
            TagCategory::CoreStat => self
                .core_stat
                .is_some_and(|s| s.as_str().eq_ignore_ascii_case(value)),
            TagCategory::Tag => self.tags.iter().any(|t| t.eq_ignore_ascii_case(value)),
            TagCategory::Unknown => false,
        }
    }
}

/// Storage shape of a context expression, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawContextExpression {
    /// Leaf node.
    Tag {
        /// Category compared.
        category: TagCategory,
        /// Expected value.
        value: String,
    },
    /// Conjunction.
    And {
        /// Operands.
        #[serde(default)]
        children: Vec<RawContextExpression>,
    },
    /// Disjunction.
    Or {
        /// Operands.
        #[serde(default)]
        children: Vec<RawContextExpression>,
    },
    /// Negation.
    Not {
        /// Operand; must hold exactly one entry.
        #[serde(default)]
        children: Vec<RawContextExpression>,
    },
}

impl TryFrom<RawContextExpression> for ContextExpression {
    type Error = ContextError;

    fn try_from(raw: RawContextExpression) -> Result<Self, Self::Error> {
        fn convert(
            children: Vec<RawContextExpression>,
        ) -> Result<Vec<ContextExpression>, ContextError> {
            children.into_iter().map(ContextExpression::try_from).collect()
        }

        match raw {
            RawContextExpression::Tag { category, value } => Ok(Self::tag(category, value)),
            RawContextExpression::And { children } => Self::and(convert(children)?),
            RawContextExpression::Or { children } => Self::or(convert(children)?),
            RawContextExpression::Not { children } => Self::not(convert(children)?),
        }
    }
}

impl From<ContextExpression> for RawContextExpression {
    fn from(expr: ContextExpression) -> Self {
        fn convert(children: Vec<ContextExpression>) -> Vec<RawContextExpression> {
            children.into_iter().map(RawContextExpression::from).collect()
        }

        match expr.node {
            Node::Tag { category, value } => Self::Tag { category, value },
            Node::And(children) => Self::And {
                children: convert(children),
            },
            Node::Or(children) => Self::Or {
                children: convert(children),
            },
            Node::Not(child) => Self::Not {
                children: vec![Self::from(*child)],
            },
        }
    }
}
