//! On-disk record types and their byte-level encoding.
//!
//! All multi-byte fields are little-endian and encoded explicitly, so a
//! volume image is deterministic regardless of host padding or endianness.

use crate::config::*;
use crate::block_dev::Block;
use crate::error::{FsError, Result};

pub type BlockReference = u16;
pub type InodeReference = u16;

/// Reads the free-list link stored at the front of every block.
pub fn next_block(block: &Block) -> BlockReference {
    u16::from_le_bytes([block[0], block[1]])
}

pub fn set_next_block(block: &mut Block, next: BlockReference) {
    block[0..2].copy_from_slice(&next.to_le_bytes());
}

/// The master block: inode allocation bitmap plus the head/tail references
/// of the free-block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterBlock {
    pub inode_allocated: [u8; INODE_BITMAP_SIZE],
    pub unallocated_front: BlockReference,
    pub unallocated_end: BlockReference,
}

impl MasterBlock {
    pub fn decode(block: &Block) -> Self {
        let mut inode_allocated = [0u8; INODE_BITMAP_SIZE];
        let base = BLOCK_LINK_SIZE;
        inode_allocated.copy_from_slice(&block[base..base + INODE_BITMAP_SIZE]);
        let front_at = base + INODE_BITMAP_SIZE;
        MasterBlock {
            inode_allocated,
            unallocated_front: u16::from_le_bytes([block[front_at], block[front_at + 1]]),
            unallocated_end: u16::from_le_bytes([block[front_at + 2], block[front_at + 3]]),
        }
    }

    pub fn encode(&self, block: &mut Block) {
        let base = BLOCK_LINK_SIZE;
        block[base..base + INODE_BITMAP_SIZE].copy_from_slice(&self.inode_allocated);
        let front_at = base + INODE_BITMAP_SIZE;
        block[front_at..front_at + 2].copy_from_slice(&self.unallocated_front.to_le_bytes());
        block[front_at + 2..front_at + 4].copy_from_slice(&self.unallocated_end.to_le_bytes());
    }

    // Bitmap bits are packed MSB-first: bit 7 of byte 0 is inode 0.
    // Callers must stay below N_INODES; the bitmap has no spare bits.
    fn bit_mask(inode_ref: InodeReference) -> (usize, u8) {
        debug_assert!(
            (inode_ref as usize) < N_INODES,
            "inode reference {} outside the bitmap",
            inode_ref
        );
        (inode_ref as usize / 8, 0x80 >> (inode_ref % 8))
    }

    pub fn inode_is_allocated(&self, inode_ref: InodeReference) -> bool {
        let (byte, mask) = Self::bit_mask(inode_ref);
        self.inode_allocated[byte] & mask != 0
    }

    pub fn set_inode_allocated(&mut self, inode_ref: InodeReference) {
        let (byte, mask) = Self::bit_mask(inode_ref);
        self.inode_allocated[byte] |= mask;
    }

    pub fn clear_inode_allocated(&mut self, inode_ref: InodeReference) {
        let (byte, mask) = Self::bit_mask(inode_ref);
        self.inode_allocated[byte] &= !mask;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InodeType {
    Unused = 0,
    Directory = 1,
    File = 2,
}

impl InodeType {
    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(InodeType::Unused),
            1 => Ok(InodeType::Directory),
            2 => Ok(InodeType::File),
            _ => Err(FsError::Corrupt),
        }
    }
}

/// One inode record: object type, entry count or byte length, and the
/// reference of the single data/directory block it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub itype: InodeType,
    pub size: u16,
    pub content: BlockReference,
}

impl Inode {
    pub const UNUSED: Self = Inode {
        itype: InodeType::Unused,
        size: 0,
        content: UNALLOCATED_BLOCK,
    };

    /// Decodes the record at `index` within an inode block.
    pub fn decode(block: &Block, index: usize) -> Result<Self> {
        let at = BLOCK_LINK_SIZE + index * INODE_SIZE;
        Ok(Inode {
            itype: InodeType::from_byte(block[at])?,
            size: u16::from_le_bytes([block[at + 2], block[at + 3]]),
            content: u16::from_le_bytes([block[at + 4], block[at + 5]]),
        })
    }

    pub fn encode(&self, block: &mut Block, index: usize) {
        let at = BLOCK_LINK_SIZE + index * INODE_SIZE;
        block[at] = self.itype as u8;
        block[at + 1] = 0;
        block[at + 2..at + 4].copy_from_slice(&self.size.to_le_bytes());
        block[at + 4..at + 6].copy_from_slice(&self.content.to_le_bytes());
    }
}

/// One name → inode slot inside a directory block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: [u8; FILE_NAME_SIZE],
    pub inode_reference: InodeReference,
}

impl DirectoryEntry {
    pub const EMPTY: Self = DirectoryEntry {
        name: [0; FILE_NAME_SIZE],
        inode_reference: UNALLOCATED_INODE,
    };

    pub fn new(name: &str, inode_reference: InodeReference) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.is_empty() || bytes.len() > MAX_NAME_LEN {
            return Err(FsError::InvalidName);
        }
        if bytes.iter().any(|&b| b == 0 || b == b'/') {
            return Err(FsError::InvalidName);
        }
        let mut arr = [0u8; FILE_NAME_SIZE];
        arr[..bytes.len()].copy_from_slice(bytes);
        Ok(DirectoryEntry { name: arr, inode_reference })
    }

    pub fn is_allocated(&self) -> bool {
        self.inode_reference != UNALLOCATED_INODE
    }

    /// The stored name with its zero padding stripped.
    pub fn name_bytes(&self) -> &[u8] {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(FILE_NAME_SIZE);
        &self.name[..end]
    }

    pub fn name_eq(&self, name: &str) -> bool {
        self.name_bytes() == name.as_bytes()
    }

    pub fn decode(block: &Block, slot: usize) -> Self {
        let at = BLOCK_LINK_SIZE + slot * DIRECTORY_ENTRY_SIZE;
        let mut name = [0u8; FILE_NAME_SIZE];
        name.copy_from_slice(&block[at..at + FILE_NAME_SIZE]);
        DirectoryEntry {
            name,
            inode_reference: u16::from_le_bytes([
                block[at + FILE_NAME_SIZE],
                block[at + FILE_NAME_SIZE + 1],
            ]),
        }
    }

    pub fn encode(&self, block: &mut Block, slot: usize) {
        let at = BLOCK_LINK_SIZE + slot * DIRECTORY_ENTRY_SIZE;
        block[at..at + FILE_NAME_SIZE].copy_from_slice(&self.name);
        block[at + FILE_NAME_SIZE..at + FILE_NAME_SIZE + 2]
            .copy_from_slice(&self.inode_reference.to_le_bytes());
    }
}
