//! User-visible filesystem operations: format, make/remove directory, list.
//!
//! Operations are synchronous and not re-entrant against a concurrently
//! mutating volume; callers needing concurrency must serialize whole
//! operations externally. There is no caching layer: every read and write
//! goes straight to the block store.

use std::sync::Arc;

use log::debug;

use crate::block_dev::{Block, BlockDevice};
use crate::config::*;
use crate::directory::{
    find_free_slot, init_directory, is_empty, occupied_entries_sorted, read_entries, remove_entry,
    store_entry,
};
use crate::error::{FsError, Result};
use crate::inode::{read_inode, write_inode};
use crate::master::{allocate_block, allocate_inode, free_block, free_inode, write_master};
use crate::path::resolve;
use crate::structs::{
    set_next_block, DirectoryEntry, Inode, InodeReference, InodeType, MasterBlock,
};

/// What `list` produced: a rendered directory listing, or the bytes of a
/// file's single data block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Occupied entry names in byte-wise order, directories suffixed `/`.
    /// The reserved `.` and `..` entries are not rendered.
    Directory(Vec<String>),
    File(Vec<u8>),
}

pub struct FileSystem<D: BlockDevice> {
    device: Arc<D>,
}

impl<D: BlockDevice> FileSystem<D> {
    /// Formats `device` into the canonical empty volume (root directory
    /// only) and returns a handle to it. Formatting twice yields
    /// byte-identical volume contents.
    pub fn format(device: Arc<D>) -> Result<Self> {
        if device.num_blocks() < N_BLOCKS {
            return Err(FsError::InvalidBlockId);
        }

        let zero: Block = [0u8; BLOCK_SIZE];
        for block_ref in 0..N_BLOCKS as u16 {
            device.write_block(block_ref, &zero)?;
        }

        let mut master = MasterBlock {
            inode_allocated: [0; INODE_BITMAP_SIZE],
            unallocated_front: FIRST_UNALLOCATED_BLOCK,
            unallocated_end: N_BLOCKS as u16 - 1,
        };
        master.set_inode_allocated(ROOT_DIRECTORY_INODE);
        write_master(&*device, &master)?;

        let (root_inode, root_block) =
            init_directory(ROOT_DIRECTORY_INODE, ROOT_DIRECTORY_INODE, ROOT_DIRECTORY_BLOCK)?;
        write_inode(&*device, ROOT_DIRECTORY_INODE, &root_inode)?;
        device.write_block(ROOT_DIRECTORY_BLOCK, &root_block)?;

        // Thread the free list through every remaining block.
        for block_ref in FIRST_UNALLOCATED_BLOCK..N_BLOCKS as u16 {
            let mut buf: Block = [0u8; BLOCK_SIZE];
            let next = if block_ref == N_BLOCKS as u16 - 1 {
                UNALLOCATED_BLOCK
            } else {
                block_ref + 1
            };
            set_next_block(&mut buf, next);
            device.write_block(block_ref, &buf)?;
        }

        device.flush()?;
        debug!("formatted volume: {} blocks, {} inodes", N_BLOCKS, N_INODES);
        Ok(FileSystem { device })
    }

    /// Re-opens an already-formatted volume, with a structural sanity check
    /// on the root inode.
    pub fn mount(device: Arc<D>) -> Result<Self> {
        if device.num_blocks() < N_BLOCKS {
            return Err(FsError::InvalidBlockId);
        }
        let root = read_inode(&*device, ROOT_DIRECTORY_INODE)?;
        if root.itype != InodeType::Directory || root.content != ROOT_DIRECTORY_BLOCK {
            return Err(FsError::Corrupt);
        }
        Ok(FileSystem { device })
    }

    /// Creates a directory at `path` (absolute, or relative to `cwd`).
    ///
    /// Commit order: new directory's block, new inode record, parent's
    /// directory block, parent's inode record. A storage fault mid-sequence
    /// leaves the volume in a documented-inconsistent state; there is no
    /// rollback.
    pub fn make_directory(&self, cwd: &str, path: &str) -> Result<()> {
        let resolved = resolve(&*self.device, cwd, path)?;
        if resolved.child.is_some() {
            return Err(FsError::AlreadyExists);
        }
        // Rejects over-long names and embedded `/` or NUL before anything
        // is allocated. The inode reference is patched in below.
        DirectoryEntry::new(&resolved.name, UNALLOCATED_INODE)?;

        let mut parent_inode = read_inode(&*self.device, resolved.parent)?;
        if parent_inode.itype != InodeType::Directory {
            return Err(FsError::NotDirectory);
        }

        let mut parent_block: Block = [0u8; BLOCK_SIZE];
        self.device.read_block(parent_inode.content, &mut parent_block)?;
        let slot = find_free_slot(&read_entries(&parent_block))?;

        let child_ref = allocate_inode(&*self.device)?;
        let child_block_ref = match allocate_block(&*self.device) {
            Ok(block_ref) => block_ref,
            Err(e) => {
                // Block pool exhausted right after the inode was claimed;
                // hand the inode back so a capacity error stays clean.
                free_inode(&*self.device, child_ref)?;
                return Err(e);
            }
        };

        let (child_inode, child_block) =
            init_directory(child_ref, resolved.parent, child_block_ref)?;

        self.device.write_block(child_block_ref, &child_block)?;
        write_inode(&*self.device, child_ref, &child_inode)?;

        let entry = DirectoryEntry::new(&resolved.name, child_ref)?;
        store_entry(&mut parent_block, slot, &entry);
        self.device.write_block(parent_inode.content, &parent_block)?;

        parent_inode.size += 1;
        write_inode(&*self.device, resolved.parent, &parent_inode)?;
        self.device.flush()?;

        debug!(
            "mkdir {:?}: inode {} block {} under parent {}",
            resolved.name, child_ref, child_block_ref, resolved.parent
        );
        Ok(())
    }

    /// Removes the empty directory at `path`.
    ///
    /// The target must exist, be a directory, hold no entries beyond the
    /// reserved pair, and must not be named through `.` or `..`.
    pub fn remove_directory(&self, cwd: &str, path: &str) -> Result<()> {
        // Reserved names are rejected before resolution, so `rmdir /a/.`
        // fails the same way whether or not `/a` exists.
        if let Some(last) = path.split('/').filter(|c| !c.is_empty()).last() {
            if last == DOT_NAME || last == DOTDOT_NAME {
                return Err(FsError::ReservedName);
            }
        } else {
            // Bare `/` or an empty path: the root cannot be removed.
            return Err(FsError::ReservedName);
        }

        let resolved = resolve(&*self.device, cwd, path)?;
        let child_ref = resolved.child.ok_or(FsError::NotFound)?;

        let child_inode = read_inode(&*self.device, child_ref)?;
        if child_inode.itype != InodeType::Directory {
            return Err(FsError::NotDirectory);
        }

        let mut child_block: Block = [0u8; BLOCK_SIZE];
        self.device.read_block(child_inode.content, &mut child_block)?;
        if !is_empty(&read_entries(&child_block)) {
            return Err(FsError::NotEmpty);
        }

        let mut parent_inode = read_inode(&*self.device, resolved.parent)?;
        let mut parent_block: Block = [0u8; BLOCK_SIZE];
        self.device.read_block(parent_inode.content, &mut parent_block)?;
        if !remove_entry(&mut parent_block, &resolved.name) {
            return Err(FsError::Corrupt);
        }

        self.device.write_block(parent_inode.content, &parent_block)?;
        parent_inode.size -= 1;
        write_inode(&*self.device, resolved.parent, &parent_inode)?;

        // Release the child last so the master block reflects a directory
        // tree that no longer references it.
        write_inode(&*self.device, child_ref, &Inode::UNUSED)?;
        free_inode(&*self.device, child_ref)?;
        free_block(&*self.device, child_inode.content)?;
        self.device.flush()?;

        debug!("rmdir {:?}: inode {} released", resolved.name, child_ref);
        Ok(())
    }

    /// Lists the directory at `path`, or returns a file's contents.
    pub fn list(&self, cwd: &str, path: &str) -> Result<Listing> {
        let resolved = resolve(&*self.device, cwd, path)?;
        let child_ref = resolved.child.ok_or(FsError::NotFound)?;
        let inode = read_inode(&*self.device, child_ref)?;
        debug!("list {:?}: inode {} type {:?}", resolved.name, child_ref, inode.itype);

        let mut block: Block = [0u8; BLOCK_SIZE];
        match inode.itype {
            InodeType::Directory => {
                self.device.read_block(inode.content, &mut block)?;
                let mut lines = Vec::new();
                for entry in occupied_entries_sorted(&block) {
                    if entry.name_eq(DOT_NAME) || entry.name_eq(DOTDOT_NAME) {
                        continue;
                    }
                    let name = String::from_utf8_lossy(entry.name_bytes()).into_owned();
                    let entry_inode = read_inode(&*self.device, entry.inode_reference)?;
                    if entry_inode.itype == InodeType::Directory {
                        lines.push(format!("{}/", name));
                    } else {
                        lines.push(name);
                    }
                }
                Ok(Listing::Directory(lines))
            }
            InodeType::File => {
                self.device.read_block(inode.content, &mut block)?;
                let len = (inode.size as usize).min(DATA_BLOCK_SIZE);
                Ok(Listing::File(block[BLOCK_LINK_SIZE..BLOCK_LINK_SIZE + len].to_vec()))
            }
            // A resolvable inode should never be unused.
            InodeType::Unused => Err(FsError::Corrupt),
        }
    }

    pub fn root_inode(&self) -> InodeReference {
        ROOT_DIRECTORY_INODE
    }

    pub fn device(&self) -> Arc<D> {
        Arc::clone(&self.device)
    }
}
