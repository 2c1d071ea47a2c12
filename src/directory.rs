//! Directory block management: the fixed-capacity entry array inside one
//! block, including the reserved `.` and `..` slots.

use std::cmp::Ordering;

use crate::block_dev::Block;
use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::{
    set_next_block, BlockReference, DirectoryEntry, Inode, InodeReference, InodeType,
};

/// Reserved slots: 0 is `.`, 1 is `..`.
pub const N_RESERVED_ENTRIES: usize = 2;

pub fn read_entries(block: &Block) -> [DirectoryEntry; N_DIRECTORY_ENTRIES_PER_BLOCK] {
    core::array::from_fn(|slot| DirectoryEntry::decode(block, slot))
}

pub fn store_entry(block: &mut Block, slot: usize, entry: &DirectoryEntry) {
    entry.encode(block, slot);
}

/// Builds a fresh directory: an inode of type DIRECTORY with `size = 2`
/// owning `block_ref`, and a block whose slot 0 is `.` → `self_ref` and
/// slot 1 is `..` → `parent_ref`. The root passes `self_ref == parent_ref`.
pub fn init_directory(
    self_ref: InodeReference,
    parent_ref: InodeReference,
    block_ref: BlockReference,
) -> Result<(Inode, Block)> {
    let mut block = [0u8; BLOCK_SIZE];
    set_next_block(&mut block, UNALLOCATED_BLOCK);
    for slot in 0..N_DIRECTORY_ENTRIES_PER_BLOCK {
        store_entry(&mut block, slot, &DirectoryEntry::EMPTY);
    }
    store_entry(&mut block, 0, &DirectoryEntry::new(DOT_NAME, self_ref)?);
    store_entry(&mut block, 1, &DirectoryEntry::new(DOTDOT_NAME, parent_ref)?);

    let inode = Inode {
        itype: InodeType::Directory,
        size: N_RESERVED_ENTRIES as u16,
        content: block_ref,
    };
    Ok((inode, block))
}

/// First empty slot at index 2 or above. A full directory is a normal,
/// reportable condition, not a fault.
pub fn find_free_slot(entries: &[DirectoryEntry]) -> Result<usize> {
    entries
        .iter()
        .enumerate()
        .skip(N_RESERVED_ENTRIES)
        .find(|(_, e)| !e.is_allocated())
        .map(|(slot, _)| slot)
        .ok_or(FsError::DirectoryFull)
}

/// Looks `name` up among the occupied slots, reserved ones included.
pub fn find_entry(entries: &[DirectoryEntry], name: &str) -> Option<(usize, InodeReference)> {
    entries
        .iter()
        .enumerate()
        .find(|(_, e)| e.is_allocated() && e.name_eq(name))
        .map(|(slot, e)| (slot, e.inode_reference))
}

/// Empties the slot holding `name`. The caller must have rejected `.` and
/// `..` already, and is responsible for decrementing the owning inode's
/// size and persisting the block.
pub fn remove_entry(block: &mut Block, name: &str) -> bool {
    let entries = read_entries(block);
    match find_entry(&entries, name) {
        Some((slot, _)) => {
            store_entry(block, slot, &DirectoryEntry::EMPTY);
            true
        }
        None => false,
    }
}

pub fn occupied_count(entries: &[DirectoryEntry]) -> usize {
    entries.iter().filter(|e| e.is_allocated()).count()
}

/// A directory is empty when only the two reserved entries remain.
pub fn is_empty(entries: &[DirectoryEntry]) -> bool {
    occupied_count(entries) == N_RESERVED_ENTRIES
}

/// Strict total order over entries: occupied slots sort before empty ones,
/// occupied slots among themselves by byte-wise name comparison. Ties fall
/// back to the inode reference so the order is deterministic even on
/// duplicate names.
pub fn entry_order(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    match (a.is_allocated(), b.is_allocated()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
        (true, true) => a
            .name_bytes()
            .cmp(b.name_bytes())
            .then(a.inode_reference.cmp(&b.inode_reference)),
    }
}

/// The occupied entries of a directory block, in name order.
pub fn occupied_entries_sorted(block: &Block) -> Vec<DirectoryEntry> {
    let mut entries: Vec<_> = read_entries(block)
        .into_iter()
        .filter(|e| e.is_allocated())
        .collect();
    entries.sort_by(entry_order);
    entries
}
