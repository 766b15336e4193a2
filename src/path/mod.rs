//! Pure, string-based path model with POSIX-style semantics.
//!
//! [`Path`] is the value type (construction, components, standardization);
//! the algebra module layers relationship queries on top (parents,
//! ancestors, common ancestors); ops carries the thin OS-delegating
//! surface used by the rest of the crate.

mod algebra;
mod cwd;
mod model;
mod ops;

pub use algebra::RelativePathType;
pub use cwd::{change_directory, current_working_directory, set_current_working_directory};
pub use model::{Path, SEPARATOR};
