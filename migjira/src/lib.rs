//! Expose migjira's internals for integration tests and the `xtask` crate.
//! The command line binary is the supported interface.
pub mod cli;
pub mod convert;
pub mod error;
pub mod writer;
