//! # Boot-Time Synchronization
//!
//! The selftest runs on a single CPU, but interrupt handlers and the logger
//! still reach shared `static` state. Two primitives cover that:
//!
//! - [`SpinLock`] for state a handler may find busy; use [`SpinLock::try_lock`]
//!   from interrupt context, since the interrupted code may hold the lock.
//! - [`SyncOnceCell`] for values published once during early boot and read
//!   from handlers afterwards.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod spin_lock;
mod sync_once_cell;

pub use spin_lock::{SpinLock, SpinLockGuard};
pub use sync_once_cell::SyncOnceCell;
