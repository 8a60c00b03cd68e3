use serde::Serialize;

use crate::error::CompileError;

pub const E_VAR_REDEFINED: &str = "E_VAR_REDEFINED";
pub const E_TITLE_DUP: &str = "E_TITLE_DUP";
pub const E_REF_UNRESOLVED: &str = "E_REF_UNRESOLVED";

/// 1-indexed source position.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub fn line_start(line: usize) -> Self {
        Self { line, column: 1 }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    pub position: Position,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedDiagnostic>,
}

impl Diagnostic {
    pub fn new(position: Position, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            position,
            code,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// `LINE:COL: error CODE message`, the format the CLI prints.
    pub fn to_pretty(&self) -> String {
        let mut out = format!(
            "{}:{}: error {} {}",
            self.position.line, self.position.column, self.code, self.message
        );
        for related in &self.related {
            out.push_str(&format!(
                "\n  {}:{}: note {}",
                related.position.line,
                related.position.column,
                related.message.as_deref().unwrap_or("related location")
            ));
        }
        out
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RelatedDiagnostic {
    pub position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RelatedDiagnostic {
    pub fn new(position: Position, message: Option<String>) -> Self {
        Self { position, message }
    }
}

impl From<&CompileError> for Diagnostic {
    fn from(error: &CompileError) -> Self {
        match error {
            CompileError::VariableRedefined {
                name, first_line, ..
            } => {
                let mut diag = Diagnostic::new(
                    Position::line_start(error.line()),
                    error.code(),
                    error.to_string(),
                );
                diag.related.push(RelatedDiagnostic::new(
                    Position::line_start(*first_line),
                    Some(format!("first definition of '{}'", name)),
                ));
                diag
            }
            CompileError::DuplicateTitle { first_line, .. } => {
                let mut diag = Diagnostic::new(
                    Position::line_start(error.line()),
                    error.code(),
                    error.to_string(),
                );
                diag.related.push(RelatedDiagnostic::new(
                    Position::line_start(*first_line),
                    Some("first title".to_string()),
                ));
                diag
            }
            CompileError::UnresolvedReference { line, column, .. } => {
                Diagnostic::new(Position::new(*line, *column), error.code(), error.to_string())
            }
        }
    }
}
