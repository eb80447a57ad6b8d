//! Config sources, lowest to highest precedence: profile file, environment.

pub mod environment;
pub mod profile_file;
