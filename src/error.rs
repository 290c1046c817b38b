// Error handling for the fallible outer surfaces (snapshot loading).
// The PPU core itself never fails: bad accesses read 0xFF and writes are dropped.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot has unexpected size {0} bytes")]
    SnapshotSize(usize),
}
