//! Activation conditions: `"always"` or `<ability> <op> <integer>`.
//!
//! Conditions arrive from storage as strings and are parsed once into a
//! [`Condition`]. Anything that does not fit the grammar becomes
//! [`Condition::Malformed`], which never evaluates true. Conditions only
//! ever reference abilities, so evaluation cannot recurse.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ability::AbilitySnapshot;

const ALWAYS: &str = "always";

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `==` or `=`
    Eq,
    /// `!=`
    Ne,
}

impl Comparator {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            "==" | "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            _ => None,
        }
    }

    /// Canonical symbol.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }

    /// Applies the comparison `lhs <op> rhs`.
    #[must_use]
    pub fn holds(self, lhs: i32, rhs: i32) -> bool {
        match self {
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
        }
    }
}

/// A parsed activation condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    /// Unconditionally true.
    #[default]
    Always,
    /// Compares an ability's current value against a constant.
    Compare {
        /// Ability name as written; looked up case-insensitively.
        ability: String,
        /// Comparison operator.
        op: Comparator,
        /// Right-hand constant.
        value: i32,
    },
    /// Input that did not match the grammar, kept verbatim.
    Malformed(String),
}

impl Condition {
    /// Parses a condition string. Never fails: unparseable input yields
    /// [`Condition::Malformed`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(ALWAYS) {
            return Self::Always;
        }
        parse_comparison(trimmed).unwrap_or_else(|| Self::Malformed(raw.to_owned()))
    }

    /// Evaluates against the current ability values. Unknown abilities and
    /// malformed conditions evaluate to `false`.
    #[must_use]
    pub fn evaluate(&self, abilities: &AbilitySnapshot) -> bool {
        match self {
            Self::Always => true,
            Self::Compare { ability, op, value } => abilities
                .current_value(ability)
                .is_some_and(|current| op.holds(current, *value)),
            Self::Malformed(_) => false,
        }
    }

    /// Whether the source string matched the grammar.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !matches!(self, Self::Malformed(_))
    }

    /// The ability this condition reads, if any.
    #[must_use]
    pub fn referenced_ability(&self) -> Option<&str> {
        match self {
            Self::Compare { ability, .. } => Some(ability),
            Self::Always | Self::Malformed(_) => None,
        }
    }
}

/// Parses and evaluates `expr` in one step.
#[must_use]
pub fn evaluate(expr: &str, abilities: &AbilitySnapshot) -> bool {
    Condition::parse(expr).evaluate(abilities)
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!')
}

fn is_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn parse_comparison(input: &str) -> Option<Condition> {
    let op_start = input.find(is_operator_char)?;
    let ability = input[..op_start].trim();
    if !is_identifier(ability) {
        return None;
    }

    let rest = &input[op_start..];
    let op_len = rest
        .char_indices()
        .take_while(|(_, c)| is_operator_char(*c))
        .count();
    let op = Comparator::from_symbol(&rest[..op_len])?;
    let value = rest[op_len..].trim().parse::<i32>().ok()?;

    Some(Condition::Compare {
        ability: ability.to_owned(),
        op,
        value,
    })
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str(ALWAYS),
            Self::Compare { ability, op, value } => {
                write!(f, "{ability} {} {value}", op.symbol())
            }
            Self::Malformed(raw) => f.write_str(raw),
        }
    }
}

impl From<String> for Condition {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for Condition {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.to_string()
    }
}
