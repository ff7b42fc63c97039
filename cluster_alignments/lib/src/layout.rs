// output directories: <outdir>/nt and <outdir>/aa

use std::fs;
use std::path::PathBuf;
use log::debug;
use crate::error::{ClusterError, Result};

#[derive(Clone, Debug)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> OutputLayout {
        OutputLayout { root: root.into() }
    }

    pub fn nt_dir(&self) -> PathBuf {
        self.root.join("nt")
    }

    pub fn aa_dir(&self) -> PathBuf {
        self.root.join("aa")
    }

    /// Create the directories, already existing ones are left alone.
    pub fn create(&self) -> Result<()> {
        for dir in [self.root.clone(), self.nt_dir(), self.aa_dir()] {
            debug!("Creating {:?}", dir);
            fs::create_dir_all(&dir).map_err(|e| ClusterError::io(&dir, e))?;
        }
        Ok(())
    }
}
