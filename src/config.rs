//! On-disk layout constants and host environment settings.
//!
//! Every constant here is part of the volume format: two images built by
//! different implementations must agree on all of them bit for bit.

use std::env;

pub const BLOCK_SIZE: usize = 256;
pub const N_BLOCKS: usize = 128;

/// Every block starts with a 2-byte `next_block` link; the rest is payload.
pub const BLOCK_LINK_SIZE: usize = 2;
pub const DATA_BLOCK_SIZE: usize = BLOCK_SIZE - BLOCK_LINK_SIZE;

pub const MASTER_BLOCK: u16 = 0;
pub const FIRST_INODE_BLOCK: u16 = 1;
pub const N_INODE_BLOCKS: usize = 4;
pub const ROOT_DIRECTORY_BLOCK: u16 = 5;
/// First block handed to the free list by `format`.
pub const FIRST_UNALLOCATED_BLOCK: u16 = ROOT_DIRECTORY_BLOCK + 1;

pub const ROOT_DIRECTORY_INODE: u16 = 0;

pub const INODE_SIZE: usize = 6;
/// 32 six-byte records per 254-byte payload; the payload tail is unused.
pub const N_INODES_PER_BLOCK: usize = 32;
pub const N_INODES: usize = N_INODE_BLOCKS * N_INODES_PER_BLOCK;

/// Inode allocation bitmap, one bit per inode, MSB-first within each byte.
pub const INODE_BITMAP_SIZE: usize = N_INODES / 8;

pub const FILE_NAME_SIZE: usize = 14;
/// One byte of the name field stays zero as a terminator.
pub const MAX_NAME_LEN: usize = FILE_NAME_SIZE - 1;
pub const DIRECTORY_ENTRY_SIZE: usize = FILE_NAME_SIZE + 2;
pub const N_DIRECTORY_ENTRIES_PER_BLOCK: usize = DATA_BLOCK_SIZE / DIRECTORY_ENTRY_SIZE;

pub const UNALLOCATED_BLOCK: u16 = 0xFFFF;
pub const UNALLOCATED_INODE: u16 = 0xFFFF;

pub const DOT_NAME: &str = ".";
pub const DOTDOT_NAME: &str = "..";

/// Host environment settings for tools driving a volume.
///
/// Each value has a documented default when the variable is unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Working directory inside the volume (`OUFS_PWD`, default `/`).
    pub cwd: String,
    /// Volume identifier handed to the block store (`OUFS_DISK`, default `vdisk1`).
    pub disk_name: String,
    /// Base name for pipe-backed transports (`OUFS_PIPE_NAME_BASE`, default `pipe`).
    pub pipe_name_base: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Settings {
            cwd: env::var("OUFS_PWD").unwrap_or_else(|_| "/".to_string()),
            disk_name: env::var("OUFS_DISK").unwrap_or_else(|_| "vdisk1".to_string()),
            pipe_name_base: env::var("OUFS_PIPE_NAME_BASE").unwrap_or_else(|_| "pipe".to_string()),
        }
    }
}
