// Persistent slot: the single storage location holding the serialized list

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A named storage location holding one serialized value
pub trait Slot {
    /// Read the stored value, or `None` if nothing has been written yet
    fn read(&self) -> Result<Option<String>>;

    /// Replace the stored value. Must be durable when this returns.
    fn write(&mut self, data: &str) -> Result<()>;
}

/// Slot backed by a single file on disk
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<slot file name><suffix>` in the slot's directory
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Write `data` to `tmp_path`, flush it, then rename it over the slot.
    /// Readers see either the old list or the new one, never a partial file.
    fn replace_with(&self, tmp_path: &Path, data: &str) -> Result<()> {
        let mut tmp = File::create(tmp_path).context("Failed to create temporary slot file")?;
        tmp.write_all(data.as_bytes())?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(tmp_path, &self.path)
            .with_context(|| format!("Failed to replace slot file {}", self.path.display()))?;

        // Make the rename itself durable (Unix only)
        #[cfg(unix)]
        {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                File::open(parent)?.sync_all()?;
            }
        }

        Ok(())
    }
}

impl Slot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read slot file {}", self.path.display())),
        }
    }

    fn write(&mut self, data: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create slot directory")?;
        }

        // Writers serialize on a sidecar lock file; the slot itself is only ever replaced by rename
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.sibling(".lock"))
            .context("Failed to open slot lock file")?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let tmp_path = self.sibling(".tmp");
        if let Err(e) = self.replace_with(&tmp_path, data) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        debug!(path = ?self.path, bytes = data.len(), "Wrote slot file");

        // Lock is released when the lock file is dropped
        Ok(())
    }
}

/// In-process slot, useful for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    data: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot that already holds `data`
    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Make every subsequent read fail
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        if self.fail_reads {
            return Err(eyre!("Storage unavailable"));
        }
        Ok(self.data.clone())
    }

    fn write(&mut self, data: &str) -> Result<()> {
        if self.fail_writes {
            return Err(eyre!("Storage unavailable"));
        }
        self.data = Some(data.to_string());
        self.writes += 1;
        Ok(())
    }
}
