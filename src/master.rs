//! The allocator: every mutation of the master block goes through here.
//!
//! Blocks live on a singly-linked free list threaded through each free
//! block's `next_block` field; inodes live in an MSB-first bitmap. The two
//! structures are updated together on every allocate/free so that a block
//! is never both free and owned by a live inode.

use log::trace;

use crate::block_dev::{Block, BlockDevice};
use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::{next_block, set_next_block, BlockReference, InodeReference, MasterBlock};

pub fn read_master(device: &impl BlockDevice) -> Result<MasterBlock> {
    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(MASTER_BLOCK, &mut buf)?;
    Ok(MasterBlock::decode(&buf))
}

pub fn write_master(device: &impl BlockDevice, master: &MasterBlock) -> Result<()> {
    let mut buf = [0u8; BLOCK_SIZE];
    set_next_block(&mut buf, UNALLOCATED_BLOCK);
    master.encode(&mut buf);
    device.write_block(MASTER_BLOCK, &buf)
}

/// Pops the head of the free-block list.
///
/// Returns `OutOfBlocks` when the list is empty. The returned block keeps
/// its previous contents; callers needing a clean slate must zero it.
pub fn allocate_block(device: &impl BlockDevice) -> Result<BlockReference> {
    let mut master = read_master(device)?;
    let front = master.unallocated_front;
    if front == UNALLOCATED_BLOCK {
        return Err(FsError::OutOfBlocks);
    }

    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(front, &mut buf)?;
    master.unallocated_front = next_block(&buf);
    if master.unallocated_front == UNALLOCATED_BLOCK {
        master.unallocated_end = UNALLOCATED_BLOCK;
    }
    write_master(device, &master)?;
    trace!("allocated block {}", front);
    Ok(front)
}

/// Appends `block_ref` to the tail of the free-block list.
pub fn free_block(device: &impl BlockDevice, block_ref: BlockReference) -> Result<()> {
    if block_ref as usize >= N_BLOCKS || block_ref < FIRST_UNALLOCATED_BLOCK {
        return Err(FsError::InvalidBlockId);
    }
    let mut master = read_master(device)?;

    // The freed block becomes the new list terminator. Its payload is left
    // as-is; only the link field changes.
    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(block_ref, &mut buf)?;
    set_next_block(&mut buf, UNALLOCATED_BLOCK);
    device.write_block(block_ref, &buf)?;

    if master.unallocated_end == UNALLOCATED_BLOCK {
        master.unallocated_front = block_ref;
    } else {
        let mut end_buf = [0u8; BLOCK_SIZE];
        device.read_block(master.unallocated_end, &mut end_buf)?;
        set_next_block(&mut end_buf, block_ref);
        device.write_block(master.unallocated_end, &end_buf)?;
    }
    master.unallocated_end = block_ref;
    write_master(device, &master)?;
    trace!("freed block {}", block_ref);
    Ok(())
}

/// Claims the first clear bit in the inode bitmap.
pub fn allocate_inode(device: &impl BlockDevice) -> Result<InodeReference> {
    let mut master = read_master(device)?;
    for inode_ref in 0..N_INODES as InodeReference {
        if !master.inode_is_allocated(inode_ref) {
            master.set_inode_allocated(inode_ref);
            write_master(device, &master)?;
            trace!("allocated inode {}", inode_ref);
            return Ok(inode_ref);
        }
    }
    Err(FsError::OutOfInodes)
}

/// Clears the allocation bit for `inode_ref`.
///
/// Fails with `DoubleFree` if the bit is already clear, rather than
/// silently toggling it back on.
pub fn free_inode(device: &impl BlockDevice, inode_ref: InodeReference) -> Result<()> {
    if inode_ref as usize >= N_INODES {
        return Err(FsError::OutOfBounds);
    }
    let mut master = read_master(device)?;
    if !master.inode_is_allocated(inode_ref) {
        return Err(FsError::DoubleFree);
    }
    master.clear_inode_allocated(inode_ref);
    write_master(device, &master)?;
    trace!("freed inode {}", inode_ref);
    Ok(())
}

/// Walks the free list and returns its length. Used by consistency checks
/// and tests; the list must terminate at `unallocated_end`.
pub fn count_free_blocks(device: &impl BlockDevice) -> Result<usize> {
    let master = read_master(device)?;
    let mut count = 0;
    let mut cursor = master.unallocated_front;
    let mut buf: Block = [0u8; BLOCK_SIZE];
    while cursor != UNALLOCATED_BLOCK {
        if cursor as usize >= N_BLOCKS || count > N_BLOCKS {
            return Err(FsError::Corrupt);
        }
        count += 1;
        if cursor == master.unallocated_end {
            break;
        }
        device.read_block(cursor, &mut buf)?;
        cursor = next_block(&buf);
    }
    Ok(count)
}
