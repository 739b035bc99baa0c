// ABOUTME: Zero-allocation device tree blob navigator for embedded systems
// ABOUTME: Decodes tokens on demand and walks nodes by depth instead of building a tree

//! # DTB Cursor
//!
//! Navigate Device Tree Blob (DTB) files in place: no allocation, no
//! materialised tree, every read bounds- and alignment-checked against the
//! untrusted buffer. Designed for `no_std` firmware and kernels.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # use dtb_cursor::{DeviceTree, DtbError};
//! # fn main() -> Result<(), DtbError> {
//! # let dtb_data: &[u8] = &[];
//! let tree = DeviceTree::new(dtb_data)?;
//!
//! // Look things up by path
//! if let Some(model) = tree.find_property("/model")? {
//!     println!("Model: {}", model.as_str().unwrap_or("?"));
//! }
//!
//! // Walk the direct children of a node
//! let cpus = tree.find_node("/cpus")?;
//! for cpu in tree.children(cpus.as_ref()).with_prefix("cpu@") {
//!     let reg: Vec<u32> = tree
//!         .properties(Some(&cpu))
//!         .find(|p| p.name == "reg")
//!         .map(|p| p.words().collect())
//!         .unwrap_or_default();
//!     println!("{} reg={:x?}", cpu.name, reg);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Main Types
//!
//! - [`DeviceTree`] - Validated view over the blob, entry point for everything
//! - [`Block`] - One decoded node or property, with zero-copy data views
//! - [`Cursor`] - Iterator over the direct children or properties of a node
//! - [`DtbHeader`] - DTB file header information
//! - [`MemoryReservation`] - Memory reservation entries
//! - [`DtbError`] - Everything that can go wrong

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod dtb;

#[cfg(test)]
mod test_utils;

// Re-export main types
pub use dtb::{
    Block, Cursor, DeviceTree, DtbError, DtbHeader, DtbToken, MatchKind, MemoryReservation,
    MemoryReservations, StringList, WithPrefix, Words,
};

// Re-export byte-order helpers
pub use dtb::endian::{to_dt, to_native};
