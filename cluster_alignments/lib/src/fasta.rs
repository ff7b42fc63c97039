/*
    Read and write fasta records
        Header lines start with ">"
            first token is the record name
            rest of the line is kept as the defline
        Sequence lines are concatenated until the next header
        Empty lines are skipped
*/

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use log::{debug, trace};
use crate::error::{ClusterError, Result};
use crate::lib_utils::struct_helper::FileBufferHelper;

const LINE_WIDTH: usize = 70;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub defline: String,
    pub sequence: String,
}

impl Record {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>) -> Record {
        Record {
            name: name.into(),
            defline: String::new(),
            sequence: sequence.into(),
        }
    }

    pub fn with_defline(mut self, defline: impl Into<String>) -> Record {
        self.defline = defline.into();
        self
    }
}

/// Lazy iterator over the records of a fasta file.
///
/// Iterate to exhaustion; reopen the file to start over.
pub struct FastaReader {
    file: FileBufferHelper,
    pending_header: Option<String>,
    finished: bool,
}

impl FastaReader {
    pub fn open(path: &Path) -> Result<FastaReader> {
        debug!("Opening fasta {:?}", path);
        Ok(FastaReader {
            file: FileBufferHelper::new(path)?,
            pending_header: None,
            finished: false,
        })
    }

    fn malformed(&self, reason: &str) -> ClusterError {
        ClusterError::MalformedFasta {
            path: self.file.path.clone(),
            line: self.file.line_number,
            reason: reason.to_string(),
        }
    }

    fn read_record(&mut self) -> Result<Option<Record>> {
        // find the header, either carried over or the first non empty line
        let header = match self.pending_header.take() {
            Some(header) => header,
            None => loop {
                if !self.file.next_line()? {
                    return Ok(None);
                }
                let line = self.file.line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Some(header) = line.strip_prefix('>') {
                    break header.to_string();
                }
                return Err(self.malformed("Encountered sequence before header"));
            },
        };

        let mut sequence = String::new();
        while self.file.next_line()? {
            let line = self.file.line.trim();
            if let Some(next_header) = line.strip_prefix('>') {
                self.pending_header = Some(next_header.to_string());
                break;
            }
            sequence.extend(line.chars().filter(|c| !c.is_whitespace()));
        }

        let header = header.trim();
        let (name, defline) = match header.split_once(char::is_whitespace) {
            Some((name, defline)) => (name, defline.trim()),
            None => (header, ""),
        };
        if name.is_empty() {
            return Err(self.malformed("Header without a record name"));
        }
        trace!("Read {} ({} residues)", name, sequence.len());
        Ok(Some(Record::new(name, sequence).with_defline(defline)))
    }
}

impl Iterator for FastaReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

pub struct FastaWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FastaWriter {
    pub fn create(path: &Path) -> Result<FastaWriter> {
        let file = File::create(path).map_err(|e| ClusterError::io(path, e))?;
        debug!("Writing fasta {:?}", path);
        Ok(FastaWriter {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, record: &Record) -> Result<()> {
        self.write_record(record)
            .map_err(|e| ClusterError::io(&self.path, e))
    }

    fn write_record(&mut self, record: &Record) -> std::io::Result<()> {
        if record.defline.is_empty() {
            writeln!(self.writer, ">{}", record.name)?;
        } else {
            writeln!(self.writer, ">{} {}", record.name, record.defline)?;
        }
        for chunk in record.sequence.as_bytes().chunks(LINE_WIDTH) {
            self.writer.write_all(chunk)?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Flush the buffer and release the file handle.
    pub fn close(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| ClusterError::io(&self.path, e))
    }
}

pub fn read_all(path: &Path) -> Result<Vec<Record>> {
    FastaReader::open(path)?.collect()
}
