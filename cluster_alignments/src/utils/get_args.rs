use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory receiving the nt/ and aa/ cluster fasta files and their alignments
    #[arg(short='o', long="outdir", required = true)]
    pub outdir: PathBuf,
    /// Fasta collection to cluster, repeat for every collection. Record names are prefixed by the file stem
    #[arg(short='i', long="infile", required = true, action=clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Number of clusters aligned concurrently, main thread included. Default: 16
    #[arg(short='n', long="threads", value_parser=validate_threads, default_value_t=16)]
    pub nproc: usize,
    /// Multiple sequence aligner executable (clustalw compatible). Default: "clustalw"
    #[arg(short='a', long="aligner", default_value = "clustalw")]
    pub aligner: PathBuf,
    /// Abort the run when one aligner call takes longer than this many seconds
    #[arg(short='t', long="timeout")]
    pub timeout: Option<u64>,
}

fn validate_threads(input_str: &str) -> Result<usize, String> {
    match input_str.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("Threads must be a whole number of at least 1, got {}", input_str)),
    }
}
