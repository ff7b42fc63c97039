/*
    Build linked id groups across collections
        Every local cluster links all of its names
        Links are closed transitively across collections
        Groups partition the union of all names

    Disjoint set over name indices, one union per local cluster member.
*/

use std::collections::{BTreeSet, HashMap};
use log::{debug, info};
use crate::collection::Collection;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkedIdGroup {
    pub members: BTreeSet<String>,
}

impl LinkedIdGroup {
    pub fn new(members: BTreeSet<String>) -> LinkedIdGroup {
        LinkedIdGroup { members }
    }

    /// Hex md5 of the sorted member names joined by a space, used as output file stem.
    pub fn digest(&self) -> String {
        let joined = self.members.iter().map(String::as_str).collect::<Vec<&str>>().join(" ");
        format!("{:x}", md5::compute(joined.as_bytes()))
    }

    pub fn defline(&self) -> String {
        self.members.iter().map(String::as_str).collect::<Vec<&str>>().join(", ")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new() -> DisjointSet {
        DisjointSet { parent: Vec::new(), rank: Vec::new() }
    }

    fn make_set(&mut self) -> usize {
        self.parent.push(self.parent.len());
        self.rank.push(0);
        self.parent.len() - 1
    }

    fn find(&mut self, mut x: usize) -> usize {
        // path halving
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Partition every name of every collection into linked id groups.
///
/// Group discovery order is not meaningful and callers must not rely on it.
pub fn build(collections: &[Collection]) -> Vec<LinkedIdGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut names: Vec<&str> = Vec::new();
    let mut sets = DisjointSet::new();

    for collection in collections {
        for cluster in &collection.clusters {
            let mut first: Option<usize> = None;
            for name in &cluster.names {
                let id = *index.entry(name.as_str()).or_insert_with(|| {
                    names.push(name.as_str());
                    sets.make_set()
                });
                match first {
                    Some(root) => sets.union(root, id),
                    None => first = Some(id),
                }
            }
        }
    }
    debug!("{} distinct names across {} collections", names.len(), collections.len());

    let mut by_root: HashMap<usize, BTreeSet<String>> = HashMap::new();
    for (id, name) in names.iter().enumerate() {
        let root = sets.find(id);
        by_root.entry(root).or_default().insert(name.to_string());
    }
    let groups: Vec<LinkedIdGroup> = by_root.into_values().map(LinkedIdGroup::new).collect();
    info!("Built {} linked id groups", groups.len());
    groups
}
