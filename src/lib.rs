//! An ordered set backed by a skiplist whose levels are four-way linked towers of nodes.
//!
//! Nodes are stored in a `TypedArena` and linked through `Entry` handles, so the structure needs
//! no unsafe code. Tower heights come from a `HeightSource`, which can be swapped for a
//! deterministic `Scripted` source to build exact shapes.

pub mod arena;
pub mod config;
mod error;
pub mod skiplist;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::skiplist::SkipListSet;
