//! # The Block Compiler
//!
//! Transforms a [`Workspace`](crate::workspace::Workspace) snapshot into
//! Arduino sketch source.
//!
//! ## Pipeline
//!
//! 1. **Context**: a fresh [`GenContext`](context::GenContext) per pass
//!    (registries, name resolver, cycle guards)
//! 2. **Variables**: the variable table is declared into the globals
//!    registry
//! 3. **Emission**: the statement emitter walks the entry chains; the
//!    expression emitter renders value slots with precedence-aware
//!    parenthesization
//! 4. **Assembly**: registries and the main body are stitched into the
//!    fixed `.ino` layout
//!
//! Generation is total: unconnected slots default, unknown field choices
//! fall back, and the only failures are a structurally broken graph
//! (cycles) or an unknown block tag at snapshot decode time.

use thiserror::Error;
use tracing::debug;

use crate::workspace::{BlockKind, Node, Workspace};

pub mod assemble;
pub mod context;
pub mod expression;
pub mod names;
pub mod order;
pub mod registry;
pub mod statement;


pub use context::GenContext;
pub use names::{NameCategory, NameResolver};
pub use order::Order;
pub use registry::SymbolRegistry;

/// A fatal generation failure. Both variants indicate a violated invariant
/// of the block graph, not ordinary user input.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no generator registered for block type `{0}`")]
    UnknownBlockType(String),
    #[error("block graph nesting exceeded {depth} levels; slot or next references form a cycle")]
    RecursionLimit { depth: usize },
}

/// Generate the complete sketch source for a workspace snapshot.
///
/// If a top-level chain starts with an `arduino_start` block, that block is
/// the sole entry point: its `SETUP` slot feeds the tail of `setup()` and
/// its `LOOP` slot becomes the `loop()` body, and sibling top-level chains
/// are discarded. Without a start block, every top-level chain is emitted
/// in document order into `loop()`.
pub fn generate(workspace: &Workspace) -> Result<String, GenerateError> {
    let mut ctx = GenContext::new();

    declare_variables(workspace, &mut ctx);

    let start = workspace
        .roots
        .iter()
        .copied()
        .find(|id| workspace.node(*id).kind == BlockKind::Start);

    let (setup_tail, body) = match start {
        Some(id) => {
            debug!(target: "inoforge::codegen", "start block is the program entry");
            let node = workspace.node(id);
            let setup = statement::emit_statement_slot(&mut ctx, workspace, node, "SETUP")?;
            let body = statement::emit_statement_slot(&mut ctx, workspace, node, "LOOP")?;
            (setup, body)
        }
        None => {
            let mut flat = String::new();
            for root in &workspace.roots {
                flat.push_str(&statement::emit_chain(&mut ctx, workspace, Some(*root))?);
            }
            (String::new(), statement::indent(&flat))
        }
    };

    debug!(
        target: "inoforge::codegen",
        roots = workspace.roots.len(),
        variables = workspace.variables.len(),
        "emission complete, assembling sketch"
    );

    Ok(assemble::assemble(&body, &setup_tail, &ctx))
}

/// Declare every workspace variable as a `float` global.
fn declare_variables(workspace: &Workspace, ctx: &mut GenContext) {
    for var in &workspace.variables {
        let name = ctx.names.resolve(&var.name, NameCategory::Variable);
        ctx.globals
            .set(&format!("var_{}", var.id), format!("float {name} = 0;"));
    }
}

/// Render a field value as code text: dropdown/text fields verbatim,
/// numeric fields without a fractional tail when whole.
pub(crate) fn field_code(node: &Node, name: &str) -> Option<String> {
    use crate::workspace::FieldValue;
    match node.fields.get(name)? {
        FieldValue::Text(s) => Some(s.clone()),
        FieldValue::Number(n) => Some(format_number(*n)),
        FieldValue::Bool(b) => Some(b.to_string()),
    }
}

/// A field that names a hardware pin, with the block's documented default.
pub(crate) fn pin_field(node: &Node, name: &str, default: &str) -> String {
    field_code(node, name).unwrap_or_else(|| default.to_string())
}

/// Format a numeric literal the way the editor displays it (`5`, not `5.0`).
pub(crate) fn format_number(n: f64) -> String {
    format!("{n}")
}
