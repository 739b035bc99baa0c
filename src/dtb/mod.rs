// ABOUTME: Device tree blob decoding and traversal module
// ABOUTME: Provides no_std, zero-allocation DTB navigation

pub mod block;
pub mod endian;
pub mod error;
pub mod header;
pub mod iter;
pub mod memory;
pub mod parser;
mod path;
pub mod tokens;

pub use block::{Block, StringList, Words};
pub use error::DtbError;
pub use header::DtbHeader;
pub use iter::{Cursor, MatchKind, WithPrefix};
pub use memory::{MemoryReservation, MemoryReservations};
pub use parser::DeviceTree;
pub use tokens::DtbToken;
