// Planckrs Default Layer Storage
// Non-volatile home of the default layer id (EEPROM on hardware, a file on a host)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::layer::LayerId;

/// Errors that can occur reading or writing the persisted default layer
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("stored default layer is unreadable: '{0}'")]
    Corrupt(String),

    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// Storage collaborator for the default layer.
///
/// `load` runs once at boot and `persist` on every default-layer switch.
/// Both are blocking and expected to finish before the next key event.
pub trait DefaultLayerStore {
    /// Read the persisted layer; `Ok(None)` when nothing was ever written
    fn load(&mut self) -> Result<Option<LayerId>, StorageError>;

    /// Write the layer id
    fn persist(&mut self, id: LayerId) -> Result<(), StorageError>;
}

/// In-memory store, for tests and boards without non-volatile memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<LayerId>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds a value, as if written on a previous boot
    pub fn with_value(id: LayerId) -> Self {
        Self {
            value: Some(id),
            ..Self::default()
        }
    }

    /// Make every `persist` fail, leaving the stored value untouched
    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn value(&self) -> Option<LayerId> {
        self.value
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DefaultLayerStore for MemoryStore {
    fn load(&mut self) -> Result<Option<LayerId>, StorageError> {
        Ok(self.value)
    }

    fn persist(&mut self, id: LayerId) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteRejected("memory store is read-only".to_string()));
        }
        self.value = Some(id);
        self.writes += 1;
        Ok(())
    }
}

/// File-backed store holding one decimal layer id
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Default location: `<data dir>/planckrs/default_layer`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("planckrs").join("default_layer"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DefaultLayerStore for FileStore {
    fn load(&mut self) -> Result<Option<LayerId>, StorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let trimmed = content.trim();
        trimmed
            .parse::<u8>()
            .map(|id| Some(LayerId(id)))
            .map_err(|_| StorageError::Corrupt(trimmed.to_string()))
    }

    fn persist(&mut self, id: LayerId) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, format!("{}\n", id.0))?;
        Ok(())
    }
}

impl<T: DefaultLayerStore + ?Sized> DefaultLayerStore for Box<T> {
    fn load(&mut self) -> Result<Option<LayerId>, StorageError> {
        (**self).load()
    }

    fn persist(&mut self, id: LayerId) -> Result<(), StorageError> {
        (**self).persist(id)
    }
}
