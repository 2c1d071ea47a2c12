//! Inode table access: read/write one fixed-size record by reference.

use crate::block_dev::BlockDevice;
use crate::config::*;
use crate::error::{FsError, Result};
use crate::structs::{Inode, InodeReference};

fn locate(inode_ref: InodeReference) -> Result<(u16, usize)> {
    if inode_ref as usize >= N_INODES {
        return Err(FsError::OutOfBounds);
    }
    let block_ref = FIRST_INODE_BLOCK + inode_ref / N_INODES_PER_BLOCK as u16;
    let index = inode_ref as usize % N_INODES_PER_BLOCK;
    Ok((block_ref, index))
}

pub fn read_inode(device: &impl BlockDevice, inode_ref: InodeReference) -> Result<Inode> {
    let (block_ref, index) = locate(inode_ref)?;
    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(block_ref, &mut buf)?;
    Inode::decode(&buf, index)
}

/// Read-modify-write of the inode block containing `inode_ref`.
pub fn write_inode(
    device: &impl BlockDevice,
    inode_ref: InodeReference,
    inode: &Inode,
) -> Result<()> {
    let (block_ref, index) = locate(inode_ref)?;
    let mut buf = [0u8; BLOCK_SIZE];
    device.read_block(block_ref, &mut buf)?;
    inode.encode(&mut buf, index);
    device.write_block(block_ref, &buf)
}
