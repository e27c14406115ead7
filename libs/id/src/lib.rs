//! # capalloc-id
//!
//! Typed names for the capacity model.
//!
//! ## Design Principles
//!
//! - Names are caller-supplied labels, preserved verbatim
//! - Every name type validates on construction (parse, deserialize)
//! - Names are typed so a datacenter can never be passed where a customer is expected
//! - Ordering is lexicographic by bytes, which gives the allocator its total order
//!
//! ## Entry Names
//!
//! Ledger records are keyed by [`EntryName`]. An entry is either a flat
//! domain (`db`), a paired-unit primary (`podA`), or a paired-unit pair
//! (`podA-pair`). [`UnitName::pair_entry`] builds the latter.

mod error;
mod macros;
mod types;

pub use error::NameError;
pub use types::*;
