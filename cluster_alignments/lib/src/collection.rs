/*
    One input collection of records
        Records with byte identical sequences collapse into a local cluster
        Local clusters keep the order in which their sequence was first seen
        Label is derived from the file name and prefixes output record names
*/

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use crate::error::Result;
use crate::fasta::{FastaReader, Record};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalCluster {
    pub names: BTreeSet<String>,
    pub sequence: String,
}

impl LocalCluster {
    pub fn intersects(&self, group: &BTreeSet<String>) -> bool {
        // iterate the smaller set
        if self.names.len() <= group.len() {
            self.names.iter().any(|name| group.contains(name))
        } else {
            group.iter().any(|name| self.names.contains(name))
        }
    }
}

#[derive(Clone, Debug)]
pub struct Collection {
    pub path: PathBuf,
    pub label: String,
    pub clusters: Vec<LocalCluster>,
    pub names: HashSet<String>,
}

impl Collection {
    pub fn load(path: &Path) -> Result<Collection> {
        let records = FastaReader::open(path)?.collect::<Result<Vec<Record>>>()?;
        info!("Loaded {} records from {:?}", records.len(), path);
        let mut collection = Collection::from_records(collection_label(path), records);
        collection.path = path.to_path_buf();
        Ok(collection)
    }

    pub fn from_records(label: impl Into<String>, records: impl IntoIterator<Item = Record>) -> Collection {
        let label = label.into();
        let mut clusters: Vec<LocalCluster> = Vec::new();
        let mut by_sequence: HashMap<String, usize> = HashMap::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for record in records {
            let idx = match by_sequence.get(&record.sequence) {
                Some(&idx) => idx,
                None => {
                    clusters.push(LocalCluster {
                        names: BTreeSet::new(),
                        sequence: record.sequence.clone(),
                    });
                    by_sequence.insert(record.sequence, clusters.len() - 1);
                    clusters.len() - 1
                }
            };
            match seen.get(&record.name) {
                Some(&prev) if prev != idx => warn!(
                    "{} appears in {} with two different sequences, keeping both",
                    record.name, label
                ),
                Some(_) => {}
                None => {
                    seen.insert(record.name.clone(), idx);
                }
            }
            clusters[idx].names.insert(record.name);
        }
        debug!("{}: {} names in {} local clusters", label, seen.len(), clusters.len());

        Collection {
            path: PathBuf::new(),
            label,
            clusters,
            names: seen.into_keys().collect(),
        }
    }

    /// Local clusters sharing at least one name with the group, in load order.
    pub fn clusters_touching<'a>(
        &'a self,
        group: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = &'a LocalCluster> + 'a {
        self.clusters.iter().filter(move |cluster| cluster.intersects(group))
    }
}

/// Labels shared by more than one collection, with the paths that produced them.
///
/// Such collections write records with the same name into one output file.
pub fn colliding_labels(collections: &[Collection]) -> Vec<(&str, Vec<&Path>)> {
    let mut by_label: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();
    for collection in collections {
        by_label
            .entry(collection.label.as_str())
            .or_default()
            .push(collection.path.as_path());
    }
    by_label.into_iter().filter(|(_, paths)| paths.len() > 1).collect()
}

/// File stem up to the first '.', whitespace runs joined by '_'.
pub fn collection_label(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.split('.').next().unwrap_or_default();
    stem.split_whitespace().collect::<Vec<&str>>().join("_")
}
