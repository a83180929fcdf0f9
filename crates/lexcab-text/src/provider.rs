//! Where a built index lives between a rebuild and the next query.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;
use tracing::debug;

use lexcab_core::{Error, LoadError, Result};

use crate::index::SearchIndex;

pub trait IndexProvider: Send + Sync {
	/// Load the most recently stored index. Any error is recoverable by a rebuild.
	fn load(&self) -> std::result::Result<SearchIndex, LoadError>;
	/// Replace the stored index wholesale. On error the previous index stays loadable.
	fn store(&self, index: &SearchIndex) -> Result<()>;
}

/// JSON artifact on disk, re-read on every `load`.
pub struct FileIndexProvider {
	path: PathBuf,
}

impl FileIndexProvider {
	pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

	pub fn path(&self) -> &Path { &self.path }
}

impl IndexProvider for FileIndexProvider {
	fn load(&self) -> std::result::Result<SearchIndex, LoadError> {
		let bytes = match fs::read(&self.path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Err(LoadError::Missing),
			Err(e) => return Err(LoadError::Unreadable(e)),
		};
		debug!(path = %self.path.display(), bytes = bytes.len(), "loading search index");
		SearchIndex::from_slice(&bytes)
	}

	fn store(&self, index: &SearchIndex) -> Result<()> {
		let bytes = index.to_vec()?;
		write_atomic(&self.path, &bytes)?;
		debug!(path = %self.path.display(), bytes = bytes.len(), "stored search index");
		Ok(())
	}
}

/// Write `bytes` to a temp file next to `path`, fsync, then rename over `path`.
/// Readers see either the old file or the new one, never a partial write.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
	let fail = |reason: String| Error::ArtifactWrite { path: path.to_path_buf(), reason };
	let dir = match path.parent() {
		Some(p) if !p.as_os_str().is_empty() => p,
		_ => Path::new("."),
	};
	fs::create_dir_all(dir).map_err(|e| fail(e.to_string()))?;
	let mut tmp = NamedTempFile::new_in(dir).map_err(|e| fail(e.to_string()))?;
	tmp.write_all(bytes).map_err(|e| fail(e.to_string()))?;
	tmp.as_file().sync_all().map_err(|e| fail(e.to_string()))?;
	tmp.persist(path).map_err(|e| fail(e.error.to_string()))?;
	Ok(())
}

/// Keeps the index in process memory. Useful for tests and for hosts that
/// rebuild at startup and never persist.
#[derive(Default)]
pub struct MemoryIndexProvider {
	index: Mutex<Option<SearchIndex>>,
	stores: AtomicUsize,
}

impl MemoryIndexProvider {
	pub fn new() -> Self { Self::default() }

	/// Drop the held index, as if the artifact had been deleted.
	pub fn clear(&self) { *self.index.lock().unwrap_or_else(PoisonError::into_inner) = None; }

	pub fn store_count(&self) -> usize { self.stores.load(Ordering::SeqCst) }
}

impl IndexProvider for MemoryIndexProvider {
	fn load(&self) -> std::result::Result<SearchIndex, LoadError> {
		self.index.lock().unwrap_or_else(PoisonError::into_inner).clone().ok_or(LoadError::Missing)
	}

	fn store(&self, index: &SearchIndex) -> Result<()> {
		*self.index.lock().unwrap_or_else(PoisonError::into_inner) = Some(index.clone());
		self.stores.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}
