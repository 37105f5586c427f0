use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyntaxError {
    #[error("failed to set C# language for parser")]
    LanguageSet,

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("syntax error detected at byte {byte_start}..{byte_end}")]
    Malformed { byte_start: usize, byte_end: usize },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
