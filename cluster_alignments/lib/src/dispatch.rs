/*
    Turn every linked id group into an aligned pair of fasta files
        Groups are preloaded into a finite queue
        workers - 1 pool threads plus the calling thread drain it
        Each group
            digest of the sorted member names names both files
            one record per touching local cluster of every collection
            nucleotide file under nt/, translated file under aa/
            aligner runs on both, a validation failure drops the group
        The caller joins the pool before reading the result list
        First fatal error stops the workers from taking new groups
*/

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use log::{debug, error, info, warn};
use threadpool::ThreadPool;
use crate::aligner::{AlignError, Aligner};
use crate::cluster_builder::LinkedIdGroup;
use crate::collection::Collection;
use crate::error::{ClusterError, Result};
use crate::fasta::{FastaWriter, Record};
use crate::layout::OutputLayout;
use crate::translate::translate;

pub const DEFAULT_WORKERS: usize = 16;

#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Total concurrency, the calling thread included.
    pub workers: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig { workers: DEFAULT_WORKERS }
    }
}

impl DispatchConfig {
    pub fn new(workers: usize) -> DispatchConfig {
        DispatchConfig { workers: workers.max(1) }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum GroupOutcome {
    Succeeded(String),
    Failed,
}

// state shared by every worker of one dispatch
#[derive(Default)]
struct SharedState {
    queue: Mutex<VecDeque<LinkedIdGroup>>,
    results: Mutex<Vec<String>>,
    claimed: Mutex<HashSet<String>>,
    failure: Mutex<Option<ClusterError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // a panicked worker is reported through the pool, keep going with the data
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SharedState {
    fn next_group(&self) -> Option<LinkedIdGroup> {
        if lock(&self.failure).is_some() {
            return None;
        }
        lock(&self.queue).pop_front()
    }

    fn record_failure(&self, err: ClusterError) {
        let mut failure = lock(&self.failure);
        if failure.is_some() {
            error!("Additional failure: {}", err);
        } else {
            error!("Stopping dispatch: {}", err);
            *failure = Some(err);
        }
    }
}

struct Worker {
    state: Arc<SharedState>,
    collections: Arc<Vec<Collection>>,
    layout: OutputLayout,
    aligner: Arc<dyn Aligner>,
}

impl Worker {
    fn drain(&self) {
        while let Some(group) = self.state.next_group() {
            match self.process(&group) {
                Ok(GroupOutcome::Succeeded(name)) => lock(&self.state.results).push(name),
                Ok(GroupOutcome::Failed) => {}
                Err(e) => self.state.record_failure(e),
            }
        }
    }

    fn claim(&self, digest: &str) -> Result<()> {
        if !lock(&self.state.claimed).insert(digest.to_string()) {
            return Err(ClusterError::DigestCollision {
                digest: digest.to_string(),
            });
        }
        Ok(())
    }

    fn write_pair(&self, group: &LinkedIdGroup, nt_path: &Path, aa_path: &Path) -> Result<usize> {
        let defline = group.defline();
        let mut nt_writer = FastaWriter::create(nt_path)?;
        let mut aa_writer = FastaWriter::create(aa_path)?;
        let mut written = 0usize;
        for collection in self.collections.iter() {
            for (index, cluster) in collection.clusters_touching(&group.members).enumerate() {
                let nucleotide = Record::new(format!("{}_{}", collection.label, index), cluster.sequence.clone())
                    .with_defline(defline.clone());
                let mut protein = translate(&nucleotide);
                protein.name = nucleotide.name.clone();
                nt_writer.write(&nucleotide)?;
                aa_writer.write(&protein)?;
                written += 1;
            }
        }
        nt_writer.close()?;
        aa_writer.close()?;
        Ok(written)
    }

    fn process(&self, group: &LinkedIdGroup) -> Result<GroupOutcome> {
        let digest = group.digest();
        self.claim(&digest)?;
        let file_name = format!("{}.fasta", digest);
        let alignment_name = format!("{}.clustalw", digest);
        let (nt_dir, aa_dir) = (self.layout.nt_dir(), self.layout.aa_dir());
        let nt_path = nt_dir.join(&file_name);
        let aa_path = aa_dir.join(&file_name);

        let written = self.write_pair(group, &nt_path, &aa_path)?;
        debug!("{}: {} members, {} records", digest, group.members.len(), written);

        for (input, output) in [
            (nt_path, nt_dir.join(&alignment_name)),
            (aa_path, aa_dir.join(&alignment_name)),
        ] {
            match self.aligner.run(&input, &output) {
                Ok(()) => debug!("Aligned {:?}", input),
                Err(AlignError::Validation { reason, .. }) => {
                    warn!("Dropping group {}: {}", digest, reason);
                    return Ok(GroupOutcome::Failed);
                }
                Err(AlignError::Fatal(e)) => return Err(e),
            }
        }
        Ok(GroupOutcome::Succeeded(file_name))
    }
}

pub struct Dispatcher {
    config: DispatchConfig,
    layout: OutputLayout,
    aligner: Arc<dyn Aligner>,
}

impl Dispatcher {
    pub fn new(config: DispatchConfig, layout: OutputLayout, aligner: Arc<dyn Aligner>) -> Dispatcher {
        Dispatcher { config, layout, aligner }
    }

    /// Align every group, returning the file names of the groups that aligned.
    ///
    /// Names are relative to the nt/ and aa/ directories; their order is not meaningful.
    pub fn dispatch(&self, groups: Vec<LinkedIdGroup>, collections: Arc<Vec<Collection>>) -> Result<Vec<String>> {
        let total = groups.len();
        let state = Arc::new(SharedState {
            queue: Mutex::new(groups.into_iter().collect()),
            ..Default::default()
        });
        let worker = |state: &Arc<SharedState>| Worker {
            state: Arc::clone(state),
            collections: Arc::clone(&collections),
            layout: self.layout.clone(),
            aligner: Arc::clone(&self.aligner),
        };

        let helpers = self.config.workers.max(1) - 1;
        info!("Dispatching {} groups to {} workers", total, helpers + 1);
        let pool = (helpers > 0).then(|| ThreadPool::new(helpers));
        if let Some(pool) = &pool {
            for _ in 0..helpers {
                let helper = worker(&state);
                pool.execute(move || helper.drain());
            }
        }
        worker(&state).drain();

        let panicked = match &pool {
            Some(pool) => {
                pool.join();
                info!("Threadpool jobs complete");
                pool.panic_count()
            }
            None => 0,
        };
        if let Some(err) = lock(&state.failure).take() {
            return Err(err);
        }
        if panicked > 0 {
            return Err(ClusterError::WorkerPanicked(panicked));
        }

        let results = std::mem::take(&mut *lock(&state.results));
        info!("{} of {} groups aligned", results.len(), total);
        Ok(results)
    }
}
