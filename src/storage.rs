//! Durable cart storage.
//!
//! The cart snapshot is persisted under a fixed file name so it survives
//! reloads of the embedding process. Nothing else in the crate persists
//! state; the stock ledger in particular is deliberately in-memory only.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use mockall::automock;
use thiserror::Error;

use crate::cart::Cart;

/// Fixed storage key for the cart snapshot.
pub const CART_STORAGE_KEY: &str = "vitrine-cart.json";

/// Errors from loading or saving the cart snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("storage io error")]
    Io(#[from] std::io::Error),

    /// The snapshot exists but cannot be decoded.
    #[error("corrupt cart snapshot")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable storage for the cart snapshot.
#[automock]
pub trait CartStorage: Send + Sync {
    /// Loads the persisted snapshot, if one exists.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] on read failure or a corrupt snapshot.
    fn load(&self) -> Result<Option<Cart>, StorageError>;

    /// Persists the full cart snapshot, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] on write failure.
    fn save(&self, cart: &Cart) -> Result<(), StorageError>;

    /// Removes the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] on removal failure.
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON-file storage under a configured directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Creates storage rooted at `dir`, using the fixed
    /// [`CART_STORAGE_KEY`] file name.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(CART_STORAGE_KEY),
        }
    }

    /// The snapshot file path.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<Cart>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;

        fs::write(&self.path, json)?;

        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}
