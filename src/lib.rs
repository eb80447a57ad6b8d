//! bns: Bunnyshell command-line client
//!
//! Resolves an organization → project → environment → component context,
//! runs environment actions against the platform API and follows the
//! resulting event pipelines to completion.

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod logging;
pub mod pipeline;
pub mod resolver;
