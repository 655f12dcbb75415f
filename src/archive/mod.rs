//! Single-file notebook archives.
//!
//! A compressed notebook is the whole notebook directory, `.git` included,
//! packed into one zip file. The notebook layer only needs three things from
//! the codec: pack a directory, unpack it again, and peek at one entry
//! (the notebook config) without extracting the rest.

mod codec;
mod error;

pub use codec::{pack, read_entry, unpack};
pub use error::{ArchiveError, ArchiveResult};
