#![deny(clippy::all)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

//! Itanium C++ ABI symbol names for Java-style classes, members and vtables.
//!
//! Set up [`ManglerTables`] once (see [`config::ManglerConfig`]), then mangle
//! through a [`Mangler`] per thread.

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod ident;
pub mod logging;
pub mod mangle;
pub mod manifest;
pub mod primitives;
pub mod types;

pub use error::{ContractViolation, Error, Result};
pub use ident::{Ident, IdentTable};
pub use mangle::{Mangler, ManglerTables};
pub use types::{Allocation, ClassType, Entity, MethodTy, Ty};
