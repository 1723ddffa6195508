use std::{
    fs, io,
    path::{Path, PathBuf},
};

use bodytrack_domain::StorageError;

use crate::{Backend, Document};

/// Keeps the document in a JSON file.
///
/// A missing file is treated as an empty document. The file is replaced
/// atomically on every store.
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Document, JsonFileError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Document::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, document: &Document) -> Result<(), JsonFileError> {
        let content = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Backend for JsonFile {
    fn load(&self) -> Result<Document, StorageError> {
        Ok(self.read()?)
    }

    fn store(&self, document: &Document) -> Result<(), StorageError> {
        Ok(self.write(document)?)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum JsonFileError {
    #[error("failed to access file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid file content: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<JsonFileError> for StorageError {
    fn from(value: JsonFileError) -> Self {
        StorageError::Other(Box::new(value))
    }
}
