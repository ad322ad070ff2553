//! # Physical Storage Arena
//!
//! Once memory discovery knows where usable storage ends, everything between
//! the end of the loaded image and that boundary is handed to a [`PhysArena`].
//! The arena is a bump allocator: allocations only ever move the free base
//! upwards and nothing is returned.
//!
//! ```text
//!  0          image end / stack top                        RAM end
//!  ├──────────┼──────────┬─────────┬─────────────────────────┤
//!  │ lowcore, │  USED    │  USED   │          FREE           │
//!  │  image   │ region 0 │ region 1│                         │
//!  └──────────┴──────────┴─────────┴─────────────────────────┘
//!                                   ▲ base                    ▲ top
//! ```
//!
//! Each allocation is rounded up to at least [`DEFAULT_MINIMUM_ALIGNMENT`] and
//! recorded in a bounded region log for [`PhysArena::show`]. Once the log is
//! full, allocations keep working but are no longer recorded.
//!
//! The memory prober talks to the arena only through [`ArenaInit`].

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod arena;

pub use arena::{
    ArenaError, ArenaInit, DEFAULT_MINIMUM_ALIGNMENT, PhysArena, REGION_LOG_CAPACITY, Region,
};
