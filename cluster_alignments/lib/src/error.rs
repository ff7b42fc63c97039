// fatal errors raised by the clustering run

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed fasta {path:?} at line {line}: {reason}")]
    MalformedFasta {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Unable to start aligner {binary:?}: {source}")]
    AlignerSpawn {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Aligner exited with {status} on {input:?}: {stderr}")]
    AlignerFailed {
        input: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Aligner exceeded {seconds}s on {input:?}")]
    AlignerTimeout { input: PathBuf, seconds: u64 },

    #[error("Digest {digest} produced by two different groups")]
    DigestCollision { digest: String },

    #[error("{0} worker thread(s) panicked")]
    WorkerPanicked(usize),
}

impl ClusterError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ClusterError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
