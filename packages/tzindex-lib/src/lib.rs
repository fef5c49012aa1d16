//! # tzindex-lib
//!
//! `tzindex-lib` is a collection of utilities used by the various `tzindex-*` crates.

#![deny(unused_crate_dependencies)]

pub mod config;
pub mod defaults;
pub mod utils;
