//! Wire types for the Airlift gateway API.
//!
//! Request and response bodies exchanged between the gateway and the
//! installation page running on the device. Field names follow the
//! installing client's contract (camelCase on the wire), so the types here
//! are the single place that contract is written down.

pub mod build;
pub mod device;
pub mod error;
