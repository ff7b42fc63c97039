// struct to handle file buffers


use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use log::debug;
use crate::error::{ClusterError, Result};

pub struct FileBufferHelper {
    pub path: PathBuf,
    pub buffer_reader: BufReader<File>,
    pub line: String,
    pub line_number: usize,
    bytes: Vec<u8>,
}

impl FileBufferHelper {
    pub fn new(file: &Path) -> Result<FileBufferHelper> {
        // initialise instant of FileBufferHelper
        debug!("FileHelper created for: {:?}", file);
        let file_open = File::open(file).map_err(|e| ClusterError::io(file, e))?;
        Ok(Self {
            path: file.to_path_buf(),
            buffer_reader: BufReader::new(file_open),
            line: String::new(),
            line_number: 0,
            bytes: Vec::new(),
        })
    }

    pub fn next_line(&mut self) -> Result<bool> {
        // read the following line into `line`, false at end of file
        // invalid utf-8 becomes U+FFFD rather than failing the read
        self.bytes.clear();
        let read = self
            .buffer_reader
            .read_until(b'\n', &mut self.bytes)
            .map_err(|e| ClusterError::io(&self.path, e))?;
        self.line.clear();
        self.line.push_str(&String::from_utf8_lossy(&self.bytes));
        if read > 0 {
            self.line_number += 1;
        }
        Ok(read > 0)
    }
}
