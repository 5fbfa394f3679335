use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::TempDir;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VfsError {
    #[error("'{0}' is not a plain file name")]
    InvalidName(String),
    #[error("'{0}' does not exist")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Flat scratch directory shared by the staged inputs, the engine and its
/// outputs. Removed when dropped.
#[derive(Debug)]
pub struct VirtualFs {
    dir: TempDir,
}

impl VirtualFs {
    pub fn new() -> Result<Self, VfsError> {
        let dir = tempfile::Builder::new().prefix("mediakit-").tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub async fn write(&self, name: &str, data: &[u8]) -> Result<(), VfsError> {
        let path = self.resolve(name)?;
        tokio::fs::write(path, data).await?;
        Ok(())
    }

    pub async fn read(&self, name: &str) -> Result<Bytes, VfsError> {
        let path = self.resolve(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(VfsError::NotFound(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, VfsError> {
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0'])
            && Path::new(name).components().count() == 1;
        if plain {
            Ok(self.dir.path().join(name))
        } else {
            Err(VfsError::InvalidName(name.to_string()))
        }
    }
}
