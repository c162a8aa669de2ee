use std::io;

use thiserror::Error;

use crate::matrix::NotInvertibleError;

/// Errors raised while building or loading a scene.
///
/// Shading itself never fails; every fallible step happens before rendering.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    NotInvertible(#[from] NotInvertibleError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OBJ parse error at line {line}: {message}")]
    ObjParse { line: usize, message: String },

    #[error("scene error: {0}")]
    Scene(String),
}

pub type Result<T> = std::result::Result<T, Error>;
