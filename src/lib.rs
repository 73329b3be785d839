//! Left-leaning red-black ordered map whose cursors survive deletion of
//! the entry they are parked on.

mod depth;
mod error;
mod llrb;

pub use crate::depth::Depth;
pub use crate::error::LlrbError;
pub use crate::llrb::{Cursor, Iter, Llrb, Stats};

#[cfg(test)]
mod scan_test;
