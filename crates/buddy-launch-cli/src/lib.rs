//! Command-line launcher for buddy.
//!
//! `buddy-run` takes no options of its own. It builds buddy for the local
//! GPU and then runs it with every argument it was given, exiting with
//! buddy's exit code.
#![deny(unsafe_code)]

pub mod bootstrap;

pub use bootstrap::{CONFIG_ERROR_EXIT_CODE, CliConfig, init_tracing, run};
