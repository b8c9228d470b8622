//! Linux package formats.
//!
//! Both packages hard-link the one-file executable under every alias in
//! `/usr/bin`.

pub mod debian;
pub mod rpm;
