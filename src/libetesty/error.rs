use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[cfg(feature = "fetch")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not find `questionList` in the downloaded page")]
    QuestionListNotFound,
    #[error("invalid URL {0:?}")]
    InvalidUrl(String),
    #[error("directory {0:?} not found")]
    MissingDirectory(PathBuf),
    #[error("no Anki profiles found in {0:?}")]
    NoProfiles(PathBuf),
    #[error("invalid column argument {0:?}")]
    InvalidColumn(String),
    #[error("invalid selection {0:?}")]
    InvalidSelection(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
