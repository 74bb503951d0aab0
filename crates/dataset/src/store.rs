use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::DatasetError;
use crate::table::Table;

/// Read a whole CSV table. Tables are read and written whole, once per run.
pub fn read_table(path: &Path) -> Result<Table, DatasetError> {
    let data = fs::read_to_string(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Table::from_csv(&data)
}

pub fn write_table(path: &Path, table: &Table) -> Result<(), DatasetError> {
    let data = table.to_csv()?;
    fs::write(path, data).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Append conflict keys to the durable side file, creating it (with a
/// header) on first use. Conflicts accumulate across runs for review;
/// nothing ever removes them automatically.
pub fn write_conflicts(
    path: &Path,
    key_name: &str,
    conflicts: &[String],
) -> Result<(), DatasetError> {
    if conflicts.is_empty() {
        return Ok(());
    }
    let mut table = if path.exists() {
        read_table(path)?
    } else {
        Table::new(vec![key_name.to_string()])
    };
    for key in conflicts {
        table.push_row(vec![key.clone()]);
    }
    write_table(path, &table)
}

/// Single-writer guard. The pipeline assumes exactly one run mutates the
/// dataset directory at a time; the lock file turns a violated assumption
/// into a startup error instead of a corrupted table.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Create the lock file, failing if it already exists. The lock is
    /// released when the returned guard drops.
    pub fn acquire(path: &Path) -> Result<RunLock, DatasetError> {
        match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => Ok(RunLock {
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(DatasetError::Locked {
                path: path.display().to_string(),
            }),
            Err(e) => Err(DatasetError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
