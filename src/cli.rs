//! CLI support for siftql
//!
//! Provides programmatic access to the `siftql` binary's behavior for
//! embedding in other tools.

use std::fmt;
use std::io;

use crate::evaluator::EvalError;
use crate::output::{from_json, to_json};
use crate::parser::ParseError;
use crate::value::Value;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Query compilation error (lexing or parsing)
    Parse(ParseError),
    /// Evaluation error
    Eval(EvalError),
    /// JSON parsing error
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
    /// The input JSON was not an array of records
    NotACollection,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Parse(e) => write!(f, "Parse error: {}", e),
            CliError::Eval(e) => write!(f, "Evaluation error: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No input provided. Use --input or pipe JSON to stdin.")
            }
            CliError::NotACollection => {
                write!(f, "Input must be a JSON array of records.")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Parse(e) => Some(e),
            CliError::Eval(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Parse(e)
    }
}

impl From<EvalError> for CliError {
    fn from(e: EvalError) -> Self {
        CliError::Eval(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

/// What to run and against which input.
pub struct RunOptions {
    /// The query text
    pub query: String,
    /// JSON array of records, if any
    pub input: Option<String>,
    /// Only validate syntax, don't execute
    pub check_only: bool,
}

/// The outcome of a CLI run.
pub enum RunOutcome {
    /// The query compiled; execution was not requested
    SyntaxValid,
    /// Query results, one JSON document per result
    Results(Vec<serde_json::Value>),
}

/// Compiles the query and, unless syntax-only, runs it over the input
/// collection.
pub fn run(options: &RunOptions) -> Result<RunOutcome, CliError> {
    let compiled = crate::query(&options.query)?;
    if options.check_only {
        return Ok(RunOutcome::SyntaxValid);
    }

    let input = options.input.as_ref().ok_or(CliError::NoInput)?;
    let document: serde_json::Value = serde_json::from_str(input)?;
    let serde_json::Value::Array(items) = document else {
        return Err(CliError::NotACollection);
    };

    let records: Vec<Value> = items.iter().map(from_json).collect();
    let results = compiled.execute(&records)?;
    Ok(RunOutcome::Results(results.iter().map(to_json).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_query_over_json_input() {
        let options = RunOptions {
            query: "SELECT o.x WHERE o.x > 1".to_string(),
            input: Some(r#"[{"x": 1}, {"x": 2}, {"x": 3}]"#.to_string()),
            check_only: false,
        };
        match run(&options).unwrap() {
            RunOutcome::Results(results) => {
                assert_eq!(results, vec![serde_json::json!(2), serde_json::json!(3)]);
            }
            RunOutcome::SyntaxValid => panic!("expected results"),
        }
    }

    #[test]
    fn check_only_skips_execution() {
        let options = RunOptions {
            query: "SELECT o.x".to_string(),
            input: None,
            check_only: true,
        };
        assert!(matches!(run(&options).unwrap(), RunOutcome::SyntaxValid));
    }

    #[test]
    fn bad_queries_surface_as_parse_errors() {
        let options = RunOptions {
            query: "SELECT WHERE o.x".to_string(),
            input: None,
            check_only: true,
        };
        assert!(matches!(run(&options), Err(CliError::Parse(_))));
    }
}
