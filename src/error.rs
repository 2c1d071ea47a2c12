use thiserror::Error;

/// Every failure an OUFS operation can report.
///
/// `Storage` is fatal to the current operation and carries no guarantee
/// beyond "writes already issued have taken effect". Everything else is a
/// normal negative result the caller can act on.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    #[error("block store I/O failure")]
    Storage,
    #[error("block reference out of range")]
    InvalidBlockId,
    #[error("inode reference out of range")]
    OutOfBounds,

    #[error("not found")]
    NotFound,
    #[error("invalid path: intermediate component missing or not a directory")]
    InvalidPath,

    #[error("entry already exists")]
    AlreadyExists,
    #[error("directory not empty")]
    NotEmpty,
    #[error("`.` and `..` are reserved names")]
    ReservedName,
    #[error("invalid entry name")]
    InvalidName,

    #[error("directory is full")]
    DirectoryFull,
    #[error("no free inodes")]
    OutOfInodes,
    #[error("no free blocks")]
    OutOfBlocks,

    #[error("not a directory")]
    NotDirectory,
    #[error("inode freed twice")]
    DoubleFree,
    #[error("on-disk structure is corrupt")]
    Corrupt,
}

pub type Result<T> = core::result::Result<T, FsError>;
