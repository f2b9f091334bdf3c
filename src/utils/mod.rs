//! Utility Module
//!
//! - [`interner`]: String interning for object, material and node-group names
//! - [`time`]: Host timer table driving periodic callbacks
//!
//! # String Interning
//!
//! Watchers keep interned [`Symbol`]s across runs instead of references into
//! the scene. Symbols compare in O(1).
//!
//! ```rust,ignore
//! use scene_watcher::utils::interner;
//!
//! let a = interner::intern("Body");
//! let b = interner::intern("Body");
//! assert_eq!(a, b);
//! ```

pub mod interner;
pub mod time;

pub use interner::Symbol;
pub use time::{TimerId, TimerRegistry};
