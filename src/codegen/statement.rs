//! # Statement Emitter
//!
//! Renders a statement node plus its `next` chain into a straight-line
//! sequence of newline-terminated statements, dispatching per block kind.
//!
//! Control-flow handlers recurse into their statement slots for block
//! bodies (indented two spaces per level) and into the expression emitter
//! for condition and bound slots. Procedure definitions accumulate into the
//! definitions registry and contribute no inline text.

use super::context::GenContext;
use super::expression::{emit_expression, emit_value, proc_call, quote};
use super::names::NameCategory;
use super::order::Order;
use super::{field_code, pin_field, GenerateError};
use crate::workspace::{BlockKind, Node, NodeId, Workspace};

/// Emit a chain starting at `head`, following `next` references. An empty
/// head yields empty text.
pub(crate) fn emit_chain(
    ctx: &mut GenContext,
    ws: &Workspace,
    head: Option<NodeId>,
) -> Result<String, GenerateError> {
    let mut code = String::new();
    let mut cursor = head;
    while let Some(id) = cursor {
        ctx.tick()?;
        code.push_str(&emit_statement(ctx, ws, id)?);
        cursor = ws.node(id).next;
    }
    Ok(code)
}

/// Emit the chain held by a statement slot, indented one level for use as
/// a block body.
pub(crate) fn emit_statement_slot(
    ctx: &mut GenContext,
    ws: &Workspace,
    node: &Node,
    slot: &str,
) -> Result<String, GenerateError> {
    ctx.enter()?;
    let code = emit_chain(ctx, ws, node.statement_slot(slot))?;
    ctx.leave();
    Ok(indent(&code))
}

/// Prefix every line with one indentation level.
pub(crate) fn indent(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    for line in code.lines() {
        if !line.is_empty() {
            out.push_str("  ");
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

fn emit_statement(ctx: &mut GenContext, ws: &Workspace, id: NodeId) -> Result<String, GenerateError> {
    let node = ws.node(id);
    match node.kind {
        // --- Control flow ---
        BlockKind::If => controls_if(ctx, ws, node),
        BlockKind::Repeat => repeat(ctx, ws, node),
        BlockKind::WhileUntil => while_until(ctx, ws, node),
        BlockKind::For => for_range(ctx, ws, node),
        // --- Variables ---
        BlockKind::VariableSet => variable_set(ctx, ws, node),
        BlockKind::VariableChange => variable_change(ctx, ws, node),
        // --- Procedures ---
        BlockKind::ProcDefNoReturn => proc_def(ctx, ws, node, false),
        BlockKind::ProcDefReturn => proc_def(ctx, ws, node, true),
        BlockKind::ProcCallNoReturn => Ok(format!("{};\n", proc_call(ctx, ws, node)?)),
        BlockKind::ProcIfReturn => proc_if_return(ctx, ws, node),
        // --- Text ---
        BlockKind::SerialPrint => serial_print(ctx, ws, node),
        // --- Time ---
        BlockKind::Delay => delay(ctx, ws, node),
        // --- Hardware writes ---
        BlockKind::DigitalWrite => digital_write(ctx, node),
        BlockKind::AnalogWrite => analog_write(ctx, ws, node),
        BlockKind::Motor => motor(ctx, ws, node),
        BlockKind::WifiConnect => wifi_connect(ctx, node),
        BlockKind::ServoWrite => servo_write(ctx, ws, node),
        BlockKind::Tone => tone(ctx, ws, node),
        // A start block reached mid-chain is inert; the entry policy in
        // `generate` is the only consumer of its slots.
        BlockKind::Start => Ok(String::new()),
        // Anything value-producing wired into a statement position renders
        // as a bare expression statement.
        _ => {
            let (text, _) = emit_expression(ctx, ws, id)?;
            Ok(format!("{text};\n"))
        }
    }
}

// =============================================================================
//                                CONTROL FLOW
// =============================================================================

fn controls_if(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let mut code = String::new();
    let mut n = 0;
    loop {
        let condition = emit_value(ctx, ws, node, &format!("IF{n}"), Order::None, "false")?;
        let branch = emit_statement_slot(ctx, ws, node, &format!("DO{n}"))?;
        if n > 0 {
            code.push_str(" else ");
        }
        code.push_str(&format!("if ({condition}) {{\n{branch}}}"));
        n += 1;
        let more = node.value_slot(&format!("IF{n}")).is_some()
            || node.statement_slot(&format!("DO{n}")).is_some();
        if !more {
            break;
        }
    }
    if node.statement_slot("ELSE").is_some() {
        let branch = emit_statement_slot(ctx, ws, node, "ELSE")?;
        code.push_str(&format!(" else {{\n{branch}}}"));
    }
    code.push('\n');
    Ok(code)
}

fn repeat(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let counter = ctx.names.distinct("count", NameCategory::Variable);
    let times = emit_value(ctx, ws, node, "TIMES", Order::Additive, "0")?;
    let branch = emit_statement_slot(ctx, ws, node, "DO")?;
    Ok(format!(
        "for (int {counter} = 0; {counter} < {times}; {counter}++) {{\n{branch}}}\n"
    ))
}

fn while_until(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let until = node.field_text("MODE") == Some("UNTIL");
    // `until` negates the condition, so it must come back at a level that
    // survives a prefixed `!`.
    let required = if until { Order::UnaryPrefix } else { Order::None };
    let mut condition = emit_value(ctx, ws, node, "BOOL", required, "false")?;
    if until {
        condition = format!("!{condition}");
    }
    let branch = emit_statement_slot(ctx, ws, node, "DO")?;
    Ok(format!("while ({condition}) {{\n{branch}}}\n"))
}

fn for_range(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let raw = node.field_text("VAR").unwrap_or("item");
    let var = ctx.names.resolve(ws.variable_name(raw), NameCategory::Variable);
    let from = emit_value(ctx, ws, node, "FROM", Order::Assignment, "0")?;
    let to = emit_value(ctx, ws, node, "TO", Order::Assignment, "0")?;
    let by = emit_value(ctx, ws, node, "BY", Order::Assignment, "1")?;
    let branch = emit_statement_slot(ctx, ws, node, "DO")?;
    Ok(format!(
        "for ({var} = {from}; {var} <= {to}; {var} += {by}) {{\n{branch}}}\n"
    ))
}

// =============================================================================
//                                 VARIABLES
// =============================================================================

fn variable_set(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let value = emit_value(ctx, ws, node, "VALUE", Order::Assignment, "0")?;
    let raw = node.field_text("VAR").unwrap_or("item");
    let name = ctx.names.resolve(ws.variable_name(raw), NameCategory::Variable);
    Ok(format!("{name} = {value};\n"))
}

fn variable_change(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let delta = emit_value(ctx, ws, node, "DELTA", Order::Assignment, "1")?;
    let raw = node.field_text("VAR").unwrap_or("item");
    let name = ctx.names.resolve(ws.variable_name(raw), NameCategory::Variable);
    Ok(format!("{name} += {delta};\n"))
}

// =============================================================================
//                                 PROCEDURES
// =============================================================================

/// Definition blocks surface only in the assembled preamble: the generated
/// function goes into the definitions registry, keyed by resolved name,
/// and nothing is emitted inline.
fn proc_def(
    ctx: &mut GenContext,
    ws: &Workspace,
    node: &Node,
    returns: bool,
) -> Result<String, GenerateError> {
    let raw = node.field_text("NAME").unwrap_or("procedure");
    let name = ctx.names.resolve(raw, NameCategory::Procedure);
    let params: Vec<String> = node
        .field_text("PARAMS")
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| ctx.names.resolve(p, NameCategory::Variable))
        .collect();
    let signature = params
        .iter()
        .map(|p| format!("float {p}"))
        .collect::<Vec<_>>()
        .join(", ");
    let body = emit_statement_slot(ctx, ws, node, "STACK")?;

    let return_type = if returns { "float" } else { "void" };
    let mut code = format!("{return_type} {name}({signature}) {{\n{body}");
    if returns {
        let value = emit_value(ctx, ws, node, "RETURN", Order::None, "0")?;
        code.push_str(&format!("  return {value};\n"));
    }
    code.push_str("}");

    ctx.definitions.set(&format!("func_{name}"), code);
    Ok(String::new())
}

fn proc_if_return(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let condition = emit_value(ctx, ws, node, "CONDITION", Order::None, "false")?;
    let ret = if node.value_slot("VALUE").is_some() {
        let value = emit_value(ctx, ws, node, "VALUE", Order::None, "0")?;
        format!("return {value};")
    } else {
        "return;".to_string()
    };
    Ok(format!("if ({condition}) {{\n  {ret}\n}}\n"))
}

// =============================================================================
//                                TEXT & TIME
// =============================================================================

fn serial_print(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let message = emit_value(ctx, ws, node, "TEXT", Order::None, "\"\"")?;
    ctx.setups.set("setup_serial", "Serial.begin(9600);");
    Ok(format!("Serial.println({message});\n"))
}

fn delay(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    // The block carries either a direct number field or a connected value.
    let ms = match field_code(node, "DELAY_MS") {
        Some(field) => field,
        None => emit_value(ctx, ws, node, "DELAY_MS", Order::None, "1000")?,
    };
    Ok(format!("delay({ms});\n"))
}

// =============================================================================
//                               HARDWARE WRITES
// =============================================================================

fn digital_write(ctx: &mut GenContext, node: &Node) -> Result<String, GenerateError> {
    let pin = pin_field(node, "PIN", "13");
    let state = node.field_text("STATE").unwrap_or("HIGH");
    ctx.setups
        .set(&format!("setup_output_{pin}"), format!("pinMode({pin}, OUTPUT);"));
    Ok(format!("digitalWrite({pin}, {state});\n"))
}

fn analog_write(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let pin = pin_field(node, "PIN", "3");
    let value = emit_value(ctx, ws, node, "VALUE", Order::None, "0")?;
    ctx.setups
        .set(&format!("setup_output_{pin}"), format!("pinMode({pin}, OUTPUT);"));
    Ok(format!("analogWrite({pin}, {value});\n"))
}

/// Basic single-direction driver: PWM on one pin, the other held low.
fn motor(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let pin1 = pin_field(node, "PIN1", "5");
    let pin2 = pin_field(node, "PIN2", "6");
    let speed = emit_value(ctx, ws, node, "SPEED", Order::None, "0")?;
    ctx.setups
        .set(&format!("setup_motor_{pin1}"), format!("pinMode({pin1}, OUTPUT);"));
    ctx.setups
        .set(&format!("setup_motor_{pin2}"), format!("pinMode({pin2}, OUTPUT);"));
    Ok(format!(
        "analogWrite({pin1}, {speed});\ndigitalWrite({pin2}, LOW);\n"
    ))
}

fn wifi_connect(ctx: &mut GenContext, node: &Node) -> Result<String, GenerateError> {
    let ssid = quote(node.field_text("SSID").unwrap_or("Network"));
    let password = quote(node.field_text("PASSWORD").unwrap_or("12345678"));
    ctx.definitions.set("include_wifi", "#include <WiFi.h>");
    Ok(format!("WiFi.begin({ssid}, {password});\n"))
}

fn servo_write(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let pin = pin_field(node, "PIN", "9");
    let servo = ctx.servo_name(&pin);
    let angle = emit_value(ctx, ws, node, "ANGLE", Order::None, "90")?;
    ctx.definitions.set("include_servo", "#include <Servo.h>");
    ctx.globals
        .set(&format!("servo_{pin}"), format!("Servo {servo};"));
    ctx.setups
        .set(&format!("setup_servo_{pin}"), format!("{servo}.attach({pin});"));
    Ok(format!("{servo}.write({angle});\n"))
}

fn tone(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let pin = pin_field(node, "PIN", "8");
    let frequency = emit_value(ctx, ws, node, "FREQ", Order::None, "440")?;
    let duration = emit_value(ctx, ws, node, "DURATION", Order::None, "500")?;
    Ok(format!("tone({pin}, {frequency}, {duration});\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_prefixes_every_line() {
        assert_eq!(indent("a;\nb;\n"), "  a;\n  b;\n");
        assert_eq!(indent(""), "");
    }

    #[test]
    fn indent_nests() {
        let inner = indent("digitalWrite(13, HIGH);\n");
        let outer = indent(&format!("while (true) {{\n{inner}}}\n"));
        assert_eq!(
            outer,
            "  while (true) {\n    digitalWrite(13, HIGH);\n  }\n"
        );
    }
}
