use crate::config::BLOCK_SIZE;
use crate::error::FsError;

/// One raw on-disk block.
pub type Block = [u8; BLOCK_SIZE];

/// The block store seam: fixed-size block read/write by numeric reference.
///
/// Attach/detach lifecycle belongs to the implementor (construction and
/// drop); block size and count are compile-time constants of the volume
/// format, not negotiated at runtime.
pub trait BlockDevice: Send + Sync {
    /// Returns the number of blocks the store exposes.
    fn num_blocks(&self) -> usize;

    /// Reads the block `block_ref` into `buf`.
    fn read_block(&self, block_ref: u16, buf: &mut Block) -> Result<(), FsError>;

    /// Writes `buf` as the new contents of block `block_ref`.
    fn write_block(&self, block_ref: u16, buf: &Block) -> Result<(), FsError>;

    /// Pushes any buffered writes down to the store.
    fn flush(&self) -> Result<(), FsError>;
}
