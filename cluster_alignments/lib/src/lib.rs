/*
    Cluster related sequences across fasta collections and align each cluster
        Load every collection, collapsing identical sequences into local clusters
        Link names that share a local cluster, transitively across collections
        Write one nucleotide and one amino acid fasta per linked group
            <outdir>/nt/<digest>.fasta
            <outdir>/aa/<digest>.fasta
        Align both with an external aligner, dropping groups it cannot align
        Report the file names of the groups that aligned
*/

use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{info, warn};
pub mod aligner;
pub mod cluster_builder;
pub mod collection;
pub mod dispatch;
pub mod error;
pub mod fasta;
pub mod layout;
pub mod lib_utils;
pub mod translate;
use aligner::Aligner;
use collection::Collection;
use dispatch::{DispatchConfig, Dispatcher};
use error::Result;
use layout::OutputLayout;

pub fn run(outdir: &Path, inputs: &[PathBuf], config: &DispatchConfig, aligner: Arc<dyn Aligner>) -> Result<Vec<String>> {
    let layout = OutputLayout::new(outdir);
    layout.create()?;

    let collections = inputs
        .iter()
        .map(|path| Collection::load(path))
        .collect::<Result<Vec<Collection>>>()?;
    info!("Loaded {} collections", collections.len());
    for (label, paths) in collection::colliding_labels(&collections) {
        warn!("{:?} all use the label {}, their records will share names", paths, label);
    }

    let groups = cluster_builder::build(&collections);
    Dispatcher::new(config.clone(), layout, aligner).dispatch(groups, Arc::new(collections))
}
