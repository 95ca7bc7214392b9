//! AQL operator types and conversions

use crate::{Error, Result};
use std::fmt::{self, Display};

/// Type-safe AQL comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operator(&'static str);

impl Operator {
    pub const EQ: Self = Operator("==");
    pub const NEQ: Self = Operator("!=");
    pub const GT: Self = Operator(">");
    pub const LT: Self = Operator("<");
    pub const GTE: Self = Operator(">=");
    pub const LTE: Self = Operator("<=");
    pub const LIKE: Self = Operator("LIKE");
    pub const NOT_LIKE: Self = Operator("NOT LIKE");
    /// Case-insensitive LIKE, compiled to `LIKE(a, b, true)`
    pub const ILIKE: Self = Operator("ILIKE");
    pub const REGEX: Self = Operator("=~");
    pub const NOT_REGEX: Self = Operator("!~");
    pub const IN: Self = Operator("IN");
    pub const NOT_IN: Self = Operator("NOT IN");
    pub const ANY_EQ: Self = Operator("ANY ==");
    pub const ALL_EQ: Self = Operator("ALL ==");
    pub const NONE_EQ: Self = Operator("NONE ==");
    pub const ANY_IN: Self = Operator("ANY IN");
    pub const ALL_IN: Self = Operator("ALL IN");
    pub const NONE_IN: Self = Operator("NONE IN");
    pub const BIT_AND: Self = Operator("&");
    pub const BIT_OR: Self = Operator("|");
    pub const BIT_XOR: Self = Operator("^");
    pub const SHIFT_LEFT: Self = Operator("<<");
    pub const SHIFT_RIGHT: Self = Operator(">>");

    /// Create a custom operator for AQL constructs not covered by the constants
    ///
    /// # Examples
    /// ```
    /// use aqueduct_core::Operator;
    ///
    /// let at_least = Operator::custom("AT LEAST (2) IN");
    /// assert_eq!(at_least.as_str(), "AT LEAST (2) IN");
    /// ```
    pub const fn custom(op: &'static str) -> Self {
        Operator(op)
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &str {
        self.0
    }

    /// `IN` and `NOT IN` need an array or a sub-query on the right-hand side
    pub fn is_membership(&self) -> bool {
        *self == Self::IN || *self == Self::NOT_IN
    }

    pub fn is_bitwise(&self) -> bool {
        self.bit_function().is_some()
    }

    /// The AQL function implementing a bitwise operator
    pub fn bit_function(&self) -> Option<&'static str> {
        match *self {
            Self::BIT_AND => Some("BIT_AND"),
            Self::BIT_OR => Some("BIT_OR"),
            Self::BIT_XOR => Some("BIT_XOR"),
            Self::SHIFT_LEFT => Some("BIT_SHIFT_LEFT"),
            Self::SHIFT_RIGHT => Some("BIT_SHIFT_RIGHT"),
            _ => None,
        }
    }

    /// Operators that may be paired with a `null` value
    pub fn accepts_null(&self) -> bool {
        *self == Self::EQ || *self == Self::NEQ
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for types that can be converted to AQL operators
pub trait IntoOperator {
    fn into_operator(self) -> Result<Operator>;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Result<Operator> {
        Ok(self)
    }
}

/// SQL spellings are accepted and translated to their AQL counterpart
impl IntoOperator for &str {
    fn into_operator(self) -> Result<Operator> {
        let normalized = self
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let operator = match normalized.as_str() {
            "=" | "==" | "<=>" => Operator::EQ,
            "!=" | "<>" => Operator::NEQ,
            ">" => Operator::GT,
            "<" => Operator::LT,
            ">=" => Operator::GTE,
            "<=" => Operator::LTE,
            "like" => Operator::LIKE,
            "not like" => Operator::NOT_LIKE,
            "ilike" => Operator::ILIKE,
            "=~" | "rlike" | "regexp" => Operator::REGEX,
            "!~" | "not rlike" | "not regexp" => Operator::NOT_REGEX,
            "in" => Operator::IN,
            "not in" => Operator::NOT_IN,
            "any ==" => Operator::ANY_EQ,
            "all ==" => Operator::ALL_EQ,
            "none ==" => Operator::NONE_EQ,
            "any in" => Operator::ANY_IN,
            "all in" => Operator::ALL_IN,
            "none in" => Operator::NONE_IN,
            "&" => Operator::BIT_AND,
            "|" => Operator::BIT_OR,
            "^" => Operator::BIT_XOR,
            "<<" => Operator::SHIFT_LEFT,
            ">>" => Operator::SHIFT_RIGHT,
            _ => {
                return Err(Error::invalid_argument(format!(
                    "Illegal operator '{}'. Use the Operator constants or Operator::custom for other AQL operators.",
                    self
                )))
            }
        };

        Ok(operator)
    }
}

impl IntoOperator for String {
    fn into_operator(self) -> Result<Operator> {
        self.as_str().into_operator()
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::Operator;

    pub const EQ: Operator = Operator::EQ;
    pub const NEQ: Operator = Operator::NEQ;
    pub const GT: Operator = Operator::GT;
    pub const LT: Operator = Operator::LT;
    pub const GTE: Operator = Operator::GTE;
    pub const LTE: Operator = Operator::LTE;
    pub const LIKE: Operator = Operator::LIKE;
    pub const NOT_LIKE: Operator = Operator::NOT_LIKE;
    pub const ILIKE: Operator = Operator::ILIKE;
    pub const REGEX: Operator = Operator::REGEX;
    pub const IN: Operator = Operator::IN;
    pub const NOT_IN: Operator = Operator::NOT_IN;
    pub const BIT_AND: Operator = Operator::BIT_AND;
    pub const BIT_OR: Operator = Operator::BIT_OR;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_constants() {
        assert_eq!(Operator::GT.as_str(), ">");
        assert_eq!(Operator::EQ.as_str(), "==");
        assert_eq!(Operator::NOT_IN.as_str(), "NOT IN");
        assert_eq!(Operator::REGEX.as_str(), "=~");
    }

    #[test]
    fn test_custom_operator() {
        let custom_op = Operator::custom("AT LEAST (2) IN");
        assert_eq!(custom_op.as_str(), "AT LEAST (2) IN");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Operator::GTE), ">=");
        assert_eq!(format!("{}", Operator::LIKE), "LIKE");
    }

    #[test]
    fn test_sql_spellings_translate_to_aql() {
        assert_eq!("=".into_operator().unwrap(), Operator::EQ);
        assert_eq!("<>".into_operator().unwrap(), Operator::NEQ);
        assert_eq!("regexp".into_operator().unwrap(), Operator::REGEX);
        assert_eq!("NOT   like".into_operator().unwrap(), Operator::NOT_LIKE);
        assert_eq!("Not In".into_operator().unwrap(), Operator::NOT_IN);
    }

    #[test]
    fn test_invalid_operator_is_rejected() {
        let err = "INVALID".into_operator().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(err.to_string().contains("Illegal operator 'INVALID'"));
    }

    #[test]
    fn test_bitwise_operators() {
        assert!(Operator::BIT_AND.is_bitwise());
        assert_eq!(">>".into_operator().unwrap().bit_function(), Some("BIT_SHIFT_RIGHT"));
        assert!(!Operator::EQ.is_bitwise());
    }

    #[test]
    fn test_null_and_membership_operators() {
        assert!(Operator::EQ.accepts_null());
        assert!(Operator::NEQ.accepts_null());
        assert!(!Operator::GT.accepts_null());
        assert!(Operator::IN.is_membership());
        assert!(!Operator::ANY_IN.is_membership());
    }
}
