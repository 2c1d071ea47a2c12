//! Common utilities for tests.

use std::sync::{Arc, Mutex};

use oufs::{Block, BlockDevice, Error, BLOCK_SIZE, N_BLOCKS};

pub const ORANGE: &str = "\x1b[38;5;214m";
pub const RESET: &str = "\x1b[0m";

/// Provides a macro for logging messages during tests.
/// e.g. log!("placeholder") -> println!("[test] placeholder");
#[macro_export]
macro_rules! log {
    ($msg:expr, $($arg:tt)*) => {
        println!("{}[test] {}{}", crate::common::ORANGE, format!($msg, $($arg)*), crate::common::RESET)
    };
    ($msg:expr) => {
        println!("{}[test] {}{}", crate::common::ORANGE, $msg, crate::common::RESET)
    };
}

pub struct RamDisk {
    inner: Arc<Mutex<Vec<u8>>>,
    num_blocks: usize,
}

impl RamDisk {
    pub fn new() -> Self {
        Self::with_blocks(N_BLOCKS)
    }

    pub fn with_blocks(num_blocks: usize) -> Self {
        RamDisk {
            inner: Arc::new(Mutex::new(vec![0u8; num_blocks * BLOCK_SIZE])),
            num_blocks,
        }
    }

    /// A copy of the full volume image, for byte-level comparisons.
    pub fn snapshot(&self) -> Vec<u8> {
        self.inner.lock().unwrap().clone()
    }
}

impl BlockDevice for RamDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_ref: u16, buf: &mut Block) -> Result<(), Error> {
        if block_ref as usize >= self.num_blocks {
            return Err(Error::InvalidBlockId);
        }
        let start = block_ref as usize * BLOCK_SIZE;
        let data = self.inner.lock().unwrap();
        buf.copy_from_slice(&data[start..start + BLOCK_SIZE]);
        Ok(())
    }

    fn write_block(&self, block_ref: u16, buf: &Block) -> Result<(), Error> {
        if block_ref as usize >= self.num_blocks {
            return Err(Error::InvalidBlockId);
        }
        let start = block_ref as usize * BLOCK_SIZE;
        let mut data = self.inner.lock().unwrap();
        data[start..start + BLOCK_SIZE].copy_from_slice(buf);
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}
