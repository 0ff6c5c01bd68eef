// src/file.rs

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::config::consts::COLUMNS;
use crate::csv::{write_table, SEP};
use crate::data::ClimateRecord;
use crate::error::{Result, ScrapeError};

/// What `write_export` did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    /// A file already sat at `path` and was replaced.
    pub overwrote: bool,
}

/// Write the header and one row per record, in order, to `path`.
/// An existing file is replaced after a single warning.
pub fn write_export(records: &[ClimateRecord], path: &Path) -> Result<WriteOutcome> {
    let overwrote = path.is_file();
    if overwrote {
        logw!("\"{}\" exists already. Will be overwritten.", path.display());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    let rows: Vec<Vec<String>> = records.iter().map(ClimateRecord::to_row).collect();

    let write = || -> io::Result<()> {
        let file = File::create(path)?; // truncate/overwrite
        let mut out = BufWriter::new(file);
        write_table(&mut out, COLUMNS, &rows, SEP)?;
        out.flush()
    };
    write().map_err(|e| ScrapeError::io(path, e))?;

    logd!("Export: {} rows → {}", rows.len(), path.display());
    Ok(WriteOutcome { path: path.to_path_buf(), overwrote })
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        let e = io::Error::new(io::ErrorKind::AlreadyExists, "exists but is not a directory");
        return Err(ScrapeError::io(dir, e));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| ScrapeError::io(dir, e))?;
    }
    Ok(())
}
