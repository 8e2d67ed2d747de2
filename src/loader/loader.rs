use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fs;
use std::io::ErrorKind;

use crate::instructions::instructions::Program;
use crate::loader::decoder::decode_instruction;

pub enum LoadError {
    NotFoundError(String),
    IOError(String),
    TruncatedError(String),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::NotFoundError(msg) => write!(f, "{}", msg),
            LoadError::IOError(msg) => write!(f, "{}", msg),
            LoadError::TruncatedError(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Debug for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Error for LoadError {}

/// Loads a program binary: a concatenation of little-endian 32-bit words,
/// decoded in order into the instruction stream.
pub fn load(path: &str) -> Result<Program, LoadError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(LoadError::NotFoundError(format!("File '{}' does not exist", path)));
        }
        Err(err) => {
            return Err(LoadError::IOError(format!("Error reading '{}': {}", path, err)));
        }
    };

    if bytes.len() % 4 != 0 {
        return Err(LoadError::TruncatedError(format!(
            "File '{}' is not a whole number of 32-bit words ({} bytes)",
            path,
            bytes.len()
        )));
    }

    let code = bytes
        .chunks_exact(4)
        .map(|word| decode_instruction(u32::from_le_bytes([word[0], word[1], word[2], word[3]])))
        .collect();

    Ok(Program { code })
}
