//! # Sketch Assembly
//!
//! Stitches the registry contents and the generated main body into the
//! fixed sketch layout:
//!
//! ```text
//! <definitions: includes, constants, helper functions>
//!
//! <global declarations>
//!
//! void setup() {
//!   <one-time initialization lines>
//!   <entry block setup tail>
//! }
//!
//! void loop() {
//!   <main body>
//! }
//! ```
//!
//! `setup()` and `loop()` are always emitted, even with empty bodies; the
//! two leading sections are skipped entirely when empty so an empty
//! workspace produces a clean skeleton.

use super::context::GenContext;

/// Produce the final source text. `body` and `setup_tail` arrive already
/// indented and newline-terminated; they are inserted verbatim.
pub(crate) fn assemble(body: &str, setup_tail: &str, ctx: &GenContext) -> String {
    let mut out = String::new();

    for section in [&ctx.definitions, &ctx.globals] {
        if !section.is_empty() {
            let fragments: Vec<&str> = section.values().collect();
            out.push_str(&fragments.join("\n"));
            out.push_str("\n\n");
        }
    }

    out.push_str("void setup() {\n");
    for fragment in ctx.setups.values() {
        for line in fragment.lines() {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str(setup_tail);
    out.push_str("}\n\n");

    out.push_str("void loop() {\n");
    out.push_str(body);
    out.push_str("}\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_yields_skeleton() {
        let ctx = GenContext::new();
        assert_eq!(
            assemble("", "", &ctx),
            "void setup() {\n}\n\nvoid loop() {\n}\n"
        );
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let mut ctx = GenContext::new();
        ctx.definitions.set("include_wifi", "#include <WiFi.h>");
        ctx.globals.set("var_a", "float speed = 0;");
        ctx.setups.set("setup_serial", "Serial.begin(9600);");
        let out = assemble("  delay(100);\n", "", &ctx);
        assert_eq!(
            out,
            "#include <WiFi.h>\n\nfloat speed = 0;\n\nvoid setup() {\n  Serial.begin(9600);\n}\n\nvoid loop() {\n  delay(100);\n}\n"
        );
    }
}
