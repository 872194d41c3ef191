//! Argument coercion.
//!
//! [`Args`] is a cursor over a directive's raw tokens. Each read either yields
//! a typed value or an [`ArgError`] naming the token position and what was
//! expected; the caller turns that into a line-numbered warning and skips the
//! directive.

use obj8_math::{obj_to_scene, DVec2, DVec3};
use thiserror::Error;

use crate::diagnostics::DiagnosticKind;

/// A recoverable argument problem.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgError {
    #[error("missing argument {index} (expected {expected})")]
    Missing { index: usize, expected: &'static str },

    #[error("argument {index} '{token}' is not a valid {expected}")]
    InvalidNumber {
        index: usize,
        token: String,
        expected: &'static str,
    },

    #[error("argument {index} '{token}' is out of range: {reason}")]
    OutOfRange {
        index: usize,
        token: String,
        reason: String,
    },
}

impl ArgError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ArgError::Missing { .. } => DiagnosticKind::MissingArgument,
            ArgError::InvalidNumber { .. } => DiagnosticKind::InvalidNumber,
            ArgError::OutOfRange { .. } => DiagnosticKind::OutOfRange,
        }
    }
}

pub type ArgResult<T> = Result<T, ArgError>;

/// Cursor over the argument tokens of one directive.
#[derive(Debug)]
pub struct Args<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> Args<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Tokens not consumed yet.
    pub fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn next_token(&mut self, expected: &'static str) -> ArgResult<(usize, &'a str)> {
        let index = self.pos;
        let token = self
            .tokens
            .get(index)
            .ok_or(ArgError::Missing { index, expected })?;
        self.pos += 1;
        Ok((index, token.as_str()))
    }

    /// One whitespace-free word (dataref, command, cursor, light name, path).
    pub fn word(&mut self, expected: &'static str) -> ArgResult<String> {
        self.next_token(expected).map(|(_, t)| t.to_string())
    }

    pub fn float(&mut self) -> ArgResult<f64> {
        let (index, token) = self.next_token("number")?;
        token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ArgError::InvalidNumber {
                index,
                token: token.to_string(),
                expected: "number",
            })
    }

    pub fn int(&mut self) -> ArgResult<i64> {
        let (index, token) = self.next_token("integer")?;
        token.parse::<i64>().map_err(|_| ArgError::InvalidNumber {
            index,
            token: token.to_string(),
            expected: "integer",
        })
    }

    /// Non-negative integer that fits `usize`.
    pub fn count(&mut self) -> ArgResult<usize> {
        let index = self.pos;
        let value = self.int()?;
        usize::try_from(value).map_err(|_| ArgError::OutOfRange {
            index,
            token: value.to_string(),
            reason: "must not be negative".to_string(),
        })
    }

    /// Index table entry: `-1` (sentinel) or a non-negative index.
    pub fn index(&mut self) -> ArgResult<i32> {
        let index = self.pos;
        let value = self.int()?;
        if value < i64::from(crate::mesh::INDEX_SENTINEL) || value > i64::from(i32::MAX) {
            return Err(ArgError::OutOfRange {
                index,
                token: value.to_string(),
                reason: "index must be -1 or a vertex index".to_string(),
            });
        }
        Ok(value as i32)
    }

    /// Three floats taken as-is.
    pub fn vec3_raw(&mut self) -> ArgResult<DVec3> {
        Ok(DVec3::new(self.float()?, self.float()?, self.float()?))
    }

    /// Three floats in OBJ axes, converted to scene axes.
    pub fn vec3(&mut self) -> ArgResult<DVec3> {
        self.vec3_raw().map(obj_to_scene)
    }

    pub fn vec2(&mut self) -> ArgResult<DVec2> {
        Ok(DVec2::new(self.float()?, self.float()?))
    }

    /// Remaining tokens joined by single spaces (possibly empty).
    pub fn tail(&mut self) -> String {
        let rest = self.tokens.get(self.pos..).unwrap_or(&[]);
        self.pos = self.tokens.len();
        rest.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_typed_reads() {
        let t = tokens("1.5 -2 word rest of line");
        let mut args = Args::new(&t);
        assert_eq!(args.float().unwrap(), 1.5);
        assert_eq!(args.int().unwrap(), -2);
        assert_eq!(args.word("dataref").unwrap(), "word");
        assert_eq!(args.tail(), "rest of line");
        assert!(args.is_empty());
        assert_eq!(args.tail(), "");
    }

    #[test]
    fn test_missing_reports_position() {
        let t = tokens("1 2");
        let mut args = Args::new(&t);
        let err = args.vec3_raw().unwrap_err();
        assert_eq!(
            err,
            ArgError::Missing {
                index: 2,
                expected: "number"
            }
        );
        assert_eq!(err.kind(), DiagnosticKind::MissingArgument);
    }

    #[test]
    fn test_invalid_number_names_token() {
        let t = tokens("abc");
        let err = Args::new(&t).float().unwrap_err();
        assert!(err.to_string().contains("'abc'"));
        assert_eq!(err.kind(), DiagnosticKind::InvalidNumber);

        let t = tokens("nan");
        assert!(Args::new(&t).float().is_err());
    }

    #[test]
    fn test_index_domain() {
        let t = tokens("-1 -2 7");
        let mut args = Args::new(&t);
        assert_eq!(args.index().unwrap(), -1);
        assert_eq!(args.index().unwrap_err().kind(), DiagnosticKind::OutOfRange);
        assert_eq!(args.index().unwrap(), 7);
    }

    #[test]
    fn test_vec3_converts_axes() {
        let t = tokens("1 2 3");
        let v = Args::new(&t).vec3().unwrap();
        assert_eq!(v, DVec3::new(1.0, -3.0, 2.0));
    }

    #[test]
    fn test_count_rejects_negative() {
        let t = tokens("-3");
        assert_eq!(Args::new(&t).count().unwrap_err().kind(), DiagnosticKind::OutOfRange);
    }
}
