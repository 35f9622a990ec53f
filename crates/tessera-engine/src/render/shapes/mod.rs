//! Shape tessellation on top of [`PrimitiveBatch`](super::PrimitiveBatch).
//!
//! One file per shape family, each adding `draw_*` methods to the batch.
//! Every public entry point checks the session first and validates its
//! arguments before emitting anything, so a rejected call leaves no partial geometry.

mod outline;
mod quad;
mod rounded;

#[cfg(test)]
mod test_util;
