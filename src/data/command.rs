use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::CommandError;

// ---------------------------------------------------------------------------
// Operation – the fixed set of aggregates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Mean,
    Median,
    Mode,
    Min,
    Max,
    Std,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::Mean,
        Operation::Median,
        Operation::Mode,
        Operation::Min,
        Operation::Max,
        Operation::Std,
    ];

    /// The statistics computed for every numeric column in bulk mode.
    pub const NUMERIC: [Operation; 5] = [
        Operation::Mean,
        Operation::Median,
        Operation::Min,
        Operation::Max,
        Operation::Std,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Mean => "mean",
            Operation::Median => "median",
            Operation::Mode => "mode",
            Operation::Min => "min",
            Operation::Max => "max",
            Operation::Std => "std",
        }
    }

    /// Whether the operation only makes sense on a numeric column.
    pub fn requires_numeric(self) -> bool {
        !matches!(self, Operation::Mode)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| CommandError::UnknownOperation(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Command / Request – the parsed instruction
// ---------------------------------------------------------------------------

/// `<operation> of <column>`, both parts lower-cased.
///
/// The operation stays a raw token here: an unknown column is reported
/// before an unknown operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub operation: String,
    pub column: String,
}

impl Command {
    pub fn operation(&self) -> Result<Operation, CommandError> {
        self.operation.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Empty input: every statistic for every numeric column.
    Bulk,
    Single(Command),
}

/// Trim and lower-case a raw instruction.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse a raw instruction.
///
/// ```text
///   "Mean of  Home Price"  →  Single { operation: "mean", column: "home price" }
///   "   "                  →  Bulk
///   "of x"                 →  Err(Malformed)
/// ```
pub fn parse(raw: &str) -> Result<Request, CommandError> {
    let normalized = normalize(raw);
    if normalized.is_empty() {
        return Ok(Request::Bulk);
    }

    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if tokens.len() < 3 || tokens[1] != "of" {
        return Err(CommandError::Malformed);
    }

    Ok(Request::Single(Command {
        operation: tokens[0].to_string(),
        column: tokens[2..].join(" "),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(op: &str, col: &str) -> Request {
        Request::Single(Command {
            operation: op.to_string(),
            column: col.to_string(),
        })
    }

    #[test]
    fn parses_operation_and_multi_word_column() {
        assert_eq!(parse("mean of age").unwrap(), single("mean", "age"));
        assert_eq!(
            parse("  MEDIAN of   Home\tPrice  ").unwrap(),
            single("median", "home price")
        );
    }

    #[test]
    fn blank_input_is_bulk_mode() {
        assert_eq!(parse("").unwrap(), Request::Bulk);
        assert_eq!(parse(" \t\n").unwrap(), Request::Bulk);
    }

    #[test]
    fn malformed_commands_are_rejected() {
        for raw in ["of x", "mean", "mean age", "mean for age", "mean of"] {
            assert_eq!(parse(raw), Err(CommandError::Malformed), "input: {raw:?}");
        }
        assert!(CommandError::Malformed
            .to_string()
            .contains("'<operation> of <column>'"));
    }

    #[test]
    fn operation_tokens_map_to_the_fixed_set() {
        assert_eq!("std".parse::<Operation>().unwrap(), Operation::Std);
        assert_eq!(
            "banana".parse::<Operation>(),
            Err(CommandError::UnknownOperation("banana".to_string()))
        );
        assert!(Operation::Mean.requires_numeric());
        assert!(!Operation::Mode.requires_numeric());
    }
}
