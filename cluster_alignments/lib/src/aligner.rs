/*
    Multiple sequence alignment of one fasta file
        Validation failures (nothing to align) are recoverable per group
        Anything else is fatal to the run
*/

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use log::{debug, trace};
use thiserror::Error;
use crate::error::ClusterError;
use crate::fasta::FastaReader;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("{input:?} is not suitable for alignment: {reason}")]
    Validation { input: PathBuf, reason: String },

    #[error(transparent)]
    Fatal(#[from] ClusterError),
}

pub trait Aligner: Send + Sync {
    /// Align the sequences of `input`, writing the alignment to `output`.
    fn run(&self, input: &Path, output: &Path) -> Result<(), AlignError>;
}

#[derive(Clone, Debug)]
pub struct ClustalW {
    pub binary: PathBuf,
    pub timeout: Option<Duration>,
}

impl Default for ClustalW {
    fn default() -> Self {
        ClustalW {
            binary: PathBuf::from("clustalw"),
            timeout: None,
        }
    }
}

impl ClustalW {
    pub fn new(binary: impl Into<PathBuf>, timeout: Option<Duration>) -> ClustalW {
        ClustalW {
            binary: binary.into(),
            timeout,
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(format!("-INFILE={}", input.display()))
            .arg(format!("-OUTFILE={}", output.display()))
            .arg("-OUTORDER=INPUT");
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> ClusterError {
        ClusterError::AlignerSpawn {
            binary: self.binary.clone(),
            source,
        }
    }

    fn run_to_completion(&self, input: &Path, output: &Path) -> Result<(), ClusterError> {
        let result = self
            .command(input, output)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.spawn_error(e))?;
        if !result.status.success() {
            return Err(ClusterError::AlignerFailed {
                input: input.to_path_buf(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn run_with_deadline(&self, input: &Path, output: &Path, limit: Duration) -> Result<(), ClusterError> {
        // output is discarded so the child never blocks on a full pipe
        let mut child = self
            .command(input, output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;
        let started = Instant::now();
        loop {
            let status = child.try_wait().map_err(|e| self.spawn_error(e))?;
            match status {
                Some(status) if status.success() => return Ok(()),
                Some(status) => {
                    return Err(ClusterError::AlignerFailed {
                        input: input.to_path_buf(),
                        status: status.to_string(),
                        stderr: String::new(),
                    })
                }
                None if started.elapsed() >= limit => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ClusterError::AlignerTimeout {
                        input: input.to_path_buf(),
                        seconds: limit.as_secs(),
                    });
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        }
    }
}

impl Aligner for ClustalW {
    fn run(&self, input: &Path, output: &Path) -> Result<(), AlignError> {
        // records without residues, e.g. translations shorter than a codon, do not count
        let mut sequences = 0usize;
        for record in FastaReader::open(input)? {
            if !record?.sequence.is_empty() {
                sequences += 1;
            }
        }
        if sequences < 2 {
            return Err(AlignError::Validation {
                input: input.to_path_buf(),
                reason: format!("{} non-empty sequence(s), at least 2 required", sequences),
            });
        }
        debug!("Aligning {} sequences from {:?}", sequences, input);
        match self.timeout {
            Some(limit) => self.run_with_deadline(input, output, limit)?,
            None => self.run_to_completion(input, output)?,
        }
        trace!("Alignment written to {:?}", output);
        Ok(())
    }
}
