//! Modal dialog system
//!
//! Dialogs are registered in a [`DialogRegistry`] that the renderer reads in
//! insertion order. Each dialog carries a form and a [`DialogHandler`] that
//! decides, per submit or close request, whether the dialog hides.

pub mod forms;
mod handle;
mod registry;
mod types;

pub use handle::RegistryHandle;
pub use registry::DialogRegistry;
pub use types::*;
