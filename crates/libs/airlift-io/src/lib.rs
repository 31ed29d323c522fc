//! Bounded subprocess execution for the Airlift gateway.
//!
//! The gateway wraps an external build automation tool, which means it
//! blocks on untrusted, potentially slow work. This crate isolates that
//! risk: every invocation runs with an explicit working directory, a
//! wall-clock timeout, and a ceiling on how much captured output is kept
//! in memory.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use airlift_io::invoker::{Invocation, Limits, run};
//!
//! #[tokio::main]
//! async fn main() {
//!     let invocation = Invocation::new("echo", vec!["Hello"], ".");
//!     let limits = Limits {
//!         timeout: Duration::from_secs(5),
//!         max_output_bytes: 1024 * 1024,
//!     };
//!     let output = run(&invocation, limits).await.unwrap();
//!     assert_eq!(output.stdout, "Hello\n");
//! }
//! ```

pub mod error;
pub mod invoker;
pub mod prelude;
