//! mailroom: command-line client for a hosted email alias service
//!
//! Layers, innermost first:
//! - `domain`: alias and item entities, selection and transition rules
//! - `application`: bulk engine, services and outcome rendering
//! - `infrastructure`: remote stores (HTTP, in-memory) and wiring
//! - `cli`: argument parsing, dispatch and exit codes

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
