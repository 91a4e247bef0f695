use crate::token::Range;
use serde::{Serialize, Serializer};
use std::fmt;

/// Stable diagnostic codes. The numeric values are part of the external
/// contract: clients filter and suppress on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    OutputVector = 1,
    ExpectedFnIdent = 2,
    FnDefMissingEnd = 5,
    MissingParen = 6,
    ExpectedCommaParen = 7,
    InvalidArgument = 8,
    InvalidDefaultValue = 9,
    UnexpectedTokenExpr = 12,
    MissingClosingParen = 13,
    OutputNotSuppressed = 15,
    UnexpectedVectorValue = 21,
    UnexpectedDefaultValueArgument = 23,
    UnexpectedToken = 24,
    UnexpectedNl = 50,
    StructBadArgs = 140,
    InvalidFnDefArgument = 200,
    TokenLimitExceeded = 3001,
    ExpectedValidIfStmnt = 4002,
    MissingEndIfStmnt = 4005,
    ExpectedValidForStmnt = 4100,
    MissingEndForStmnt = 4101,
    ExpectedValidWhileStmnt = 4200,
    MissingEndWhileStmnt = 4201,
    ExpectedValidUntilStmnt = 4300,
    MissingUntilStmnt = 4301,
    ExpectedValidSwitchStmnt = 4400,
    MissingEndSwitchStmnt = 4401,
    DuplicateDefinition = 5000,
    UnresolvedReference = 5001,
    TooManyArguments = 5002,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.as_u16())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub range: Range,
}

impl Diagnostic {
    pub fn error(code: ErrorCode, message: impl Into<String>, range: Range) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            range,
        }
    }

    pub fn warning(code: ErrorCode, message: impl Into<String>, range: Range) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            message: message.into(),
            range,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at {}", self.code, self.message, self.range)
    }
}
