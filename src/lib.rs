//! # Inoforge
//!
//! Compiles visual block programs into Arduino sketch source.
//!
//! A block program is a forest of typed nodes: statement chains linked by
//! `next` references, with value-producing nodes attached to named slots.
//! The generator walks that forest and renders a complete `.ino`-layout
//! source text (global definitions, `setup()`, `loop()`).
//!
//! ## Pipeline
//!
//! 1. **Snapshot**: the editor hands over a read-only [`Workspace`]
//! 2. **Emission**: statement and expression emitters walk the chains,
//!    accumulating one-time definitions and setup lines in registries
//! 3. **Assembly**: registries and the main body are stitched into the
//!    fixed sketch layout
//!
//! Generation is deterministic: the same snapshot always yields
//! byte-identical output.

pub mod codegen;
pub mod workspace;

pub use codegen::{generate, GenerateError};
pub use workspace::{BlockKind, FieldValue, Node, NodeId, Variable, Workspace};
