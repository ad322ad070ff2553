//! # Service-Call Logical Processor (SCLP)
//!
//! Client side of the s390x service-call protocol: a privileged `servc`
//! instruction hands a command word and the real address of a service-call
//! control block ([`Sccb`]) to the hypervisor or firmware, which answers by
//! rewriting the block and setting a response code in its header.
//!
//! Two things are built on top of the primitive:
//!
//! - [`read_configuration`]: the *READ SCP INFO* negotiation that returns the
//!   [`ReadInfo`] storage layout used for memory sizing.
//! - [`write_console`]: an ASCII console event for early text output.
//!
//! ```text
//!  caller ──► read_configuration ──► ServiceCall::service_call ──► servc
//!                 ▲      │  retry on INVALID COMMAND                  │
//!                 │      ▼                                            ▼
//!              ReadInfo ◄─────────────── Sccb (header + payload) ◄── hypervisor
//! ```
//!
//! The primitive sits behind the [`ServiceCall`] trait. On s390x targets
//! [`Servc`] executes the real instruction; with the `simulator` feature
//! [`SimulatedSclp`] scripts the hypervisor side for hosted tests.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod client;
mod command;
mod event;
mod read_info;
mod sccb;
mod servc;
#[cfg(any(test, feature = "simulator"))]
mod simulator;

pub use client::{READ_INFO_COMMANDS, ReadInfoError, read_configuration, try_read_configuration};
pub use command::{ResponseCode, SclpCommand};
pub use event::{
    ConsoleError, EVENT_DATA_OFFSET, EVENT_TYPE_ASCII_CONSOLE, EventBufferHeader, MAX_EVENT_DATA,
    write_console,
};
pub use read_info::{ReadInfo, narrow_unless_zero};
pub use sccb::{CONTROL_MASK_VARIABLE_RESPONSE, FC_NORMAL_WRITE, Sccb, SccbHeader};
#[cfg(target_arch = "s390x")]
pub use servc::Servc;
pub use servc::{ServiceCall, ServiceCallError};
#[cfg(any(test, feature = "simulator"))]
pub use simulator::{SimulatedReply, SimulatedSclp};
