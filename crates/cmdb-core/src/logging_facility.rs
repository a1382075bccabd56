//! Structured logging facility
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use cmdb_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! Render and reverse-reference operations log one `start` event and one
//! `end` or `end_error` event each. Degradations absorbed inside a render
//! (missing objects, unparseable dates, failed templates) are logged at
//! `debug` with the object and field involved.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
