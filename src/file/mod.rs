//! Low-level access to the binary record format produced by the metadata generator.

pub mod io;
