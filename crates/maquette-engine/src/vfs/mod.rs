//! Virtual filesystem for maquette.
//!
//! One [`VirtualFs`] per session: a flat mapping from normalized absolute
//! POSIX paths to files, each file carrying its own bounded undo history.
//! There are no directory entities; a "directory" is only the common
//! prefix of paths, which is all a virtual project tree needs.
//!
//! History is mutated exclusively in here: `write` pushes, `pop_history`
//! pops. The tool engines never reach into the stack directly.

mod file;
mod memory;

pub use file::{VirtualFile, DEFAULT_HISTORY_LIMIT};
pub use memory::{Snapshot, VirtualFs};
