use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use cluster_fasta::aligner::{AlignError, Aligner};
use cluster_fasta::cluster_builder::LinkedIdGroup;
use cluster_fasta::dispatch::DispatchConfig;
use cluster_fasta::error::ClusterError;
use cluster_fasta::fasta::{read_all, Record};
use tempfile::{tempdir, TempDir};

// writes a placeholder alignment, rejects single sequences and any input listed in `reject`
struct MockAligner {
    reject: BTreeSet<String>,
    calls: Mutex<usize>,
}

impl MockAligner {
    fn new(reject: &[String]) -> MockAligner {
        MockAligner {
            reject: reject.iter().cloned().collect(),
            calls: Mutex::new(0),
        }
    }
}

impl Aligner for MockAligner {
    fn run(&self, input: &Path, output: &Path) -> Result<(), AlignError> {
        *self.calls.lock().unwrap() += 1;
        let file_name = input.file_name().unwrap().to_string_lossy().into_owned();
        let records = read_all(input)?;
        if records.len() < 2 || self.reject.contains(&file_name) {
            return Err(AlignError::Validation {
                input: input.to_path_buf(),
                reason: "rejected".to_string(),
            });
        }
        fs::write(output, "CLUSTAL").map_err(|e| ClusterError::io(output, e))?;
        Ok(())
    }
}

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn write_input(dir: &TempDir, file_name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(file_name);
    fs::write(&path, body).unwrap();
    path
}

fn digest_of(names: &[&str]) -> String {
    LinkedIdGroup::new(names.iter().map(|s| s.to_string()).collect()).digest()
}

#[test]
fn shared_name_joins_two_collections() {
    init();
    let dir = tempdir().unwrap();
    let a = write_input(&dir, "A.fasta", ">x\nACGT\n>y\nACGT\n");
    let b = write_input(&dir, "B.fasta", ">y\nTTTT\n");
    let outdir = dir.path().join("clusters");

    let aligner = Arc::new(MockAligner::new(&[]));
    let results = cluster_fasta::run(&outdir, &[a, b], &DispatchConfig::new(2), aligner.clone()).unwrap();

    let file_name = format!("{}.fasta", digest_of(&["x", "y"]));
    assert_eq!(results, vec![file_name.clone()]);

    let nt = read_all(&outdir.join("nt").join(&file_name)).unwrap();
    assert_eq!(
        nt,
        vec![
            Record::new("A_0", "ACGT").with_defline("x, y"),
            Record::new("B_0", "TTTT").with_defline("x, y"),
        ]
    );
    let aa = read_all(&outdir.join("aa").join(&file_name)).unwrap();
    assert_eq!(aa.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(), vec!["A_0", "B_0"]);
    assert_eq!(aa[0].sequence, "T");
    assert_eq!(aa[1].sequence, "F");
    assert!(outdir.join("nt").join(format!("{}.clustalw", digest_of(&["x", "y"]))).exists());
    assert_eq!(*aligner.calls.lock().unwrap(), 2);
}

#[test]
fn name_missing_from_one_collection_is_grouped() {
    init();
    let dir = tempdir().unwrap();
    let a = write_input(&dir, "A.fasta", ">x\nACGT\n>w\nGGGGGG\n");
    let b = write_input(&dir, "B.fasta", ">x\nACGA\n>v\nGGGGGG\n");
    let outdir = dir.path().join("clusters");

    let results =
        cluster_fasta::run(&outdir, &[a, b], &DispatchConfig::new(3), Arc::new(MockAligner::new(&[]))).unwrap();
    let results: BTreeSet<String> = results.into_iter().collect();

    // x has one record per collection; w and v each stand alone with one record
    let expected: BTreeSet<String> = [format!("{}.fasta", digest_of(&["x"]))].into_iter().collect();
    assert_eq!(results, expected);
    for lone in [&["w"], &["v"]] {
        let path = outdir.join("nt").join(format!("{}.fasta", digest_of(lone)));
        assert_eq!(read_all(&path).unwrap().len(), 1);
    }
}

#[test]
fn one_rejected_group_does_not_stop_the_others() {
    init();
    let dir = tempdir().unwrap();
    let a = write_input(&dir, "A.fasta", ">a\nAAA\n>b\nCCC\n>c\nGGG\n");
    let b = write_input(&dir, "B.fasta", ">a\nAAT\n>b\nCCT\n>c\nGGT\n");
    let outdir = dir.path().join("clusters");

    let rejected = format!("{}.fasta", digest_of(&["b"]));
    let aligner = Arc::new(MockAligner::new(&[rejected.clone()]));
    let results = cluster_fasta::run(&outdir, &[a, b], &DispatchConfig::new(4), aligner).unwrap();

    let results: BTreeSet<String> = results.into_iter().collect();
    let expected: BTreeSet<String> = [&["a"], &["c"]]
        .iter()
        .map(|names| format!("{}.fasta", digest_of(*names)))
        .collect();
    assert_eq!(results, expected);
    assert!(outdir.join("nt").join(&rejected).exists());
}

#[test]
fn result_set_does_not_depend_on_worker_count() {
    init();
    let dir = tempdir().unwrap();
    let mut body_a = String::new();
    let mut body_b = String::new();
    for i in 0..40 {
        // pairs share a sequence in A, neighbours of pairs share one in B
        body_a.push_str(&format!(">g{}\nACGT{}\n", i, "A".repeat(i / 2 + 1)));
        body_b.push_str(&format!(">g{}\nTTGA{}\n", i, "C".repeat((i + 1) / 4 + 1)));
    }
    let a = write_input(&dir, "A.fasta", &body_a);
    let b = write_input(&dir, "B.fasta", &body_b);

    let mut previous: Option<BTreeSet<String>> = None;
    for workers in [1, 2, 8] {
        let outdir = dir.path().join(format!("clusters_{}", workers));
        let results = cluster_fasta::run(
            &outdir,
            &[a.clone(), b.clone()],
            &DispatchConfig::new(workers),
            Arc::new(MockAligner::new(&[])),
        )
        .unwrap();
        let results: BTreeSet<String> = results.into_iter().collect();
        assert!(!results.is_empty());
        if let Some(previous) = &previous {
            assert_eq!(previous, &results);
        }
        previous = Some(results);
    }
}

#[test]
fn malformed_input_aborts_the_run() {
    init();
    let dir = tempdir().unwrap();
    let a = write_input(&dir, "A.fasta", "ACGT\n>x\nACGT\n");
    let err = cluster_fasta::run(
        &dir.path().join("clusters"),
        &[a],
        &DispatchConfig::new(2),
        Arc::new(MockAligner::new(&[])),
    )
    .unwrap_err();
    assert!(matches!(err, ClusterError::MalformedFasta { .. }));
}
