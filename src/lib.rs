//! OUFS is a minimal single-volume hierarchical filesystem laid out over a
//! fixed array of 128 equal-size blocks.
//!
//! Volume layout:
//! - Block 0: master block (inode allocation bitmap + free-block list head/tail)
//! - Blocks 1..=4: inode table
//! - Block 5: root directory data
//! - Blocks 6..=127: free blocks, threaded into a singly-linked list
//!
//! Layers, from bottom to top:
//! 1. Block store: fixed-size block read/write by reference.   | User implemented (file, RAM, pipe)
//! 2. Master block: inode bitmap + free-block list allocator.  | Fs implemented
//! 3. Inode table: fixed-size records read/written by index.   | Fs implemented
//! 4. Directory/Path: entry management and tree walking.       | Fs implemented
//! 5. FileSystem: format / make_directory / remove_directory / list.
//!
//! Every operation is synchronous and uncached; at most one writer sequence
//! may be in flight at a time.

mod config;
mod block_dev;
mod structs;
mod master;
mod inode;
mod directory;
mod path;
mod fs;
mod error;

pub use block_dev::{Block, BlockDevice};
pub use config::*;
pub use structs::*;
pub use master::{
    allocate_block, allocate_inode, count_free_blocks, free_block, free_inode, read_master,
    write_master,
};
pub use inode::{read_inode, write_inode};
pub use directory::*;
pub use path::{resolve, Resolved};
pub use fs::{FileSystem, Listing};
pub use error::FsError as Error;
pub use error::{FsError, Result};
