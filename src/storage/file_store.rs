//! File-backed block store: one file per storage unit.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};

use log::debug;
use parking_lot::Mutex;

use crate::common::{BlockId, Error, Result};
use crate::storage::{BlockImage, BlockStore};

/// Stores each unit as a file inside one directory.
///
/// # File Layout
/// Blocks of a unit are laid out sequentially in the unit's file:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┐
/// │ Block 0 │ Block 1 │  ...    │ Block N │
/// └─────────┴─────────┴─────────┴─────────┘
/// Offset:  0    block_size  ...   N×block_size
/// ```
///
/// # Thread Safety
/// Open file handles live in a single `Mutex`, so concurrent reads and writes
/// to the store are serialized.
///
/// # Durability
/// Every write and append is followed by `fsync()`.
pub struct FileBlockStore {
    dir: PathBuf,
    block_size: usize,
    files: Mutex<HashMap<String, File>>,
}

impl FileBlockStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Panics
    /// Panics if `block_size` is 0.
    pub fn open<P: AsRef<Path>>(dir: P, block_size: usize) -> Result<Self> {
        assert!(block_size > 0, "block_size must be > 0");

        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!("opened block store at {} ({} byte blocks)", dir.display(), block_size);

        Ok(Self {
            dir,
            block_size,
            files: Mutex::new(HashMap::new()),
        })
    }

    /// Directory holding the unit files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run `f` against the open handle for `unit`, opening it on first use.
    ///
    /// Unit names must be relative paths made of plain components, so every
    /// unit file stays inside `dir`.
    fn with_file<T>(&self, unit: &str, f: impl FnOnce(&mut File) -> Result<T>) -> Result<T> {
        let mut files = self.files.lock();
        let file = match files.entry(unit.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(
                OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(self.unit_path(unit)?)?,
            ),
        };
        f(file)
    }

    fn unit_path(&self, unit: &str) -> Result<PathBuf> {
        let path = Path::new(unit);
        if unit.is_empty() || !path.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(Error::InvalidUnit {
                unit: unit.to_string(),
            });
        }
        Ok(self.dir.join(path))
    }

    fn offset_of(&self, block: &BlockId) -> Result<u64> {
        block
            .index()
            .checked_mul(self.block_size as u64)
            .ok_or_else(|| Error::BlockIndexOutOfRange {
                block: block.clone(),
            })
    }

    fn check_size(&self, image: &BlockImage) -> Result<()> {
        if image.capacity() != self.block_size {
            return Err(Error::BlockSizeMismatch {
                expected: self.block_size,
                actual: image.capacity(),
            });
        }
        Ok(())
    }
}

impl BlockStore for FileBlockStore {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn read_block(&self, block: &BlockId, image: &mut BlockImage) -> Result<()> {
        self.check_size(image)?;
        let offset = self.offset_of(block)?;

        self.with_file(block.unit(), |file| {
            let len = file.metadata()?.len();
            image.reset();

            // Blocks past the end of the file read as zeros.
            if offset < len {
                let available = (len - offset).min(self.block_size as u64) as usize;
                file.seek(SeekFrom::Start(offset))?;
                file.read_exact(&mut image.as_mut_slice()[..available])?;
            }
            Ok(())
        })
    }

    fn write_block(&self, block: &BlockId, image: &BlockImage) -> Result<()> {
        self.check_size(image)?;
        let offset = self.offset_of(block)?;

        self.with_file(block.unit(), |file| {
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(image.as_slice())?;
            file.sync_all()?;
            Ok(())
        })
    }

    fn block_count(&self, unit: &str) -> Result<u64> {
        self.with_file(unit, |file| Ok(file.metadata()?.len() / self.block_size as u64))
    }

    fn append_block(&self, unit: &str) -> Result<BlockId> {
        self.with_file(unit, |file| {
            let block = BlockId::new(unit, file.metadata()?.len() / self.block_size as u64);

            file.seek(SeekFrom::Start(self.offset_of(&block)?))?;
            file.write_all(&vec![0u8; self.block_size])?;
            file.sync_all()?;

            Ok(block)
        })
    }
}
