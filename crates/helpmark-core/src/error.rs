use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::diagnostic::{E_REF_UNRESOLVED, E_TITLE_DUP, E_VAR_REDEFINED};

/// Input errors. Compilation stops at the first one.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CompileError {
    #[error(
        "variable '{name}' defined in line {first_line} is redefined in line {second_line}, each variable can only be defined once"
    )]
    VariableRedefined {
        name: String,
        first_line: usize,
        second_line: usize,
    },

    #[error(
        "title defined in line {first_line} is redefined in line {second_line}, there can only be one title"
    )]
    DuplicateTitle {
        first_line: usize,
        second_line: usize,
    },

    #[error("unknown link target '{target}' in line {line}, column {column}")]
    UnresolvedReference {
        target: String,
        line: usize,
        column: usize,
    },
}

impl CompileError {
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::VariableRedefined { .. } => E_VAR_REDEFINED,
            CompileError::DuplicateTitle { .. } => E_TITLE_DUP,
            CompileError::UnresolvedReference { .. } => E_REF_UNRESOLVED,
        }
    }

    /// 1-indexed line the error is reported at.
    pub fn line(&self) -> usize {
        match self {
            CompileError::VariableRedefined { second_line, .. }
            | CompileError::DuplicateTitle { second_line, .. } => *second_line,
            CompileError::UnresolvedReference { line, .. } => *line,
        }
    }
}

/// Errors raised while turning a finished document into output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The document still contains a part the resolver should have removed.
    /// This is a bug in the compiler, not in the input.
    #[error("internal error: unhandled document part {kind} reached the renderer")]
    UnresolvedPart { kind: &'static str },

    #[error("error loading image '{name}': {source}")]
    Image {
        name: String,
        #[source]
        source: ImageError,
    },

    #[error("image '{name}' has format {format}, which this output cannot embed")]
    UnsupportedImage { name: String, format: String },

    #[error("cannot embed image '{name}': {reason}")]
    InvalidImage { name: String, reason: String },
}

impl RenderError {
    pub fn is_internal(&self) -> bool {
        matches!(self, RenderError::UnresolvedPart { .. })
    }
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("no image with the name '{name}' found")]
    NotFound { name: String },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
