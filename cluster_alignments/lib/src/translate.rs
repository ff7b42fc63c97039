/*
    Translate nucleotide records into amino acids
        Standard genetic code, reading frame 0
        Incomplete trailing codon is dropped
        Codons with non ACGTU symbols become X
        Stop codons are written as * and translation continues
*/

use crate::fasta::Record;

const BASES: &[u8; 4] = b"TCAG";
// indexed by 16 * first + 4 * second + third over BASES
const CODON_TABLE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

fn base_index(base: u8) -> Option<usize> {
    let base = match base.to_ascii_uppercase() {
        b'U' => b'T',
        other => other,
    };
    BASES.iter().position(|&b| b == base)
}

fn translate_codon(codon: &[u8]) -> char {
    match (base_index(codon[0]), base_index(codon[1]), base_index(codon[2])) {
        (Some(a), Some(b), Some(c)) => CODON_TABLE[16 * a + 4 * b + c] as char,
        _ => 'X',
    }
}

pub fn translate_sequence(sequence: &str) -> String {
    sequence
        .as_bytes()
        .chunks_exact(3)
        .map(translate_codon)
        .collect()
}

/// Amino acid counterpart of a nucleotide record, name and defline copied.
pub fn translate(record: &Record) -> Record {
    Record {
        name: record.name.clone(),
        defline: record.defline.clone(),
        sequence: translate_sequence(&record.sequence),
    }
}
