/*
Cluster related genes predicted across several fasta files and align every cluster
    + collapse identical sequences within a file
    + link names sharing a sequence, across files, transitively
    + write each cluster as nucleotide and amino acid fasta
        + outdir/nt/<md5>.fasta
        + outdir/aa/<md5>.fasta
    + align both with clustalw, clusters with a single sequence are skipped

Arguments
    output directory
    input fasta files, in order
    number of threads
    aligner executable and optional timeout
*/

mod utils;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use cluster_fasta::aligner::ClustalW;
use cluster_fasta::dispatch::DispatchConfig;
use log::{debug, error, info};
use utils::get_args::Cli;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    debug!("Parsing commandline arguments");
    let aligner = ClustalW::new(cli.aligner, cli.timeout.map(Duration::from_secs));
    let config = DispatchConfig::new(cli.nproc);
    match cluster_fasta::run(&cli.outdir, &cli.inputs, &config, Arc::new(aligner)) {
        Ok(filenames) => {
            info!("{} clusters aligned under {:?}", filenames.len(), cli.outdir);
            for filename in filenames {
                println!("{}", filename);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Clustering failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
