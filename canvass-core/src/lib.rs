//! Canvass Core - Entity Types and Lifecycle Rules
//!
//! Pure data structures and pure predicate logic. No I/O lives here:
//! storage, HTTP, and LLM collaborators all depend on this crate,
//! never the other way around.

pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod lifecycle;

pub use entities::*;
pub use enums::*;
pub use error::*;
pub use identity::*;
pub use lifecycle::*;
