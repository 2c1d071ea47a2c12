//! Path resolution: from a working directory and a path string down to
//! `(parent inode, child inode or none, local name)`.

use crate::block_dev::BlockDevice;
use crate::config::*;
use crate::directory::{find_entry, read_entries};
use crate::error::{FsError, Result};
use crate::inode::read_inode;
use crate::structs::{InodeReference, InodeType};

/// Outcome of a successful walk. `child` is `None` when every intermediate
/// component exists but the final one does not: the soft "not found" case,
/// as opposed to the hard `InvalidPath`/`NotDirectory` failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub parent: InodeReference,
    pub child: Option<InodeReference>,
    pub name: String,
}

/// Walks `path` (absolute, or relative to `cwd`) from the root directory.
///
/// `.` and `..` are not normalized away; they resolve through the reserved
/// entries of each directory block. Resolving `/` itself yields the root as
/// both parent and child under the name `.`.
pub fn resolve(device: &impl BlockDevice, cwd: &str, path: &str) -> Result<Resolved> {
    let mut components: Vec<&str> = Vec::new();
    if !path.starts_with('/') {
        components.extend(cwd.split('/').filter(|c| !c.is_empty()));
    }
    components.extend(path.split('/').filter(|c| !c.is_empty()));

    if components.is_empty() {
        return Ok(Resolved {
            parent: ROOT_DIRECTORY_INODE,
            child: Some(ROOT_DIRECTORY_INODE),
            name: DOT_NAME.to_string(),
        });
    }

    let mut current = ROOT_DIRECTORY_INODE;
    let last = components.len() - 1;
    for (i, component) in components.iter().enumerate() {
        let inode = read_inode(device, current)?;
        if inode.itype != InodeType::Directory {
            return Err(FsError::NotDirectory);
        }
        let mut buf = [0u8; BLOCK_SIZE];
        device.read_block(inode.content, &mut buf)?;
        let entries = read_entries(&buf);
        let hit = find_entry(&entries, component);

        if i == last {
            return Ok(Resolved {
                parent: current,
                child: hit.map(|(_, inode_ref)| inode_ref),
                name: component.to_string(),
            });
        }
        match hit {
            Some((_, inode_ref)) => current = inode_ref,
            None => return Err(FsError::InvalidPath),
        }
    }
    unreachable!("loop returns on the last component")
}
