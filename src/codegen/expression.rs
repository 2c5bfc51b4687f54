//! # Expression Emitter
//!
//! Renders a value-producing node into `(text, Order)` and lets the caller
//! decide on parentheses by comparing the returned level against the level
//! its operand position requires.
//!
//! Emission never fails on a missing connection: every slot read goes
//! through [`emit_value`], which substitutes the caller's default literal
//! for an empty slot.
//!
//! Some value handlers deliberately write into the context registries
//! while emitting (a digital read needs its `pinMode`, the ultrasonic
//! sensor needs its helper function). Registry dedup guarantees reading
//! the same configuration twice contributes a single setup line.

use super::context::GenContext;
use super::names::NameCategory;
use super::order::Order;
use super::{format_number, pin_field, GenerateError};
use crate::workspace::{BlockKind, Node, NodeId, Workspace};

/// Render the expression connected to `slot`, parenthesized if its natural
/// level binds looser than `required`. An empty slot yields `default`.
pub(crate) fn emit_value(
    ctx: &mut GenContext,
    ws: &Workspace,
    node: &Node,
    slot: &str,
    required: Order,
    default: &str,
) -> Result<String, GenerateError> {
    let Some(child) = node.value_slot(slot) else {
        return Ok(default.to_string());
    };
    let (text, level) = emit_expression(ctx, ws, child)?;
    if level.needs_parens(required) {
        Ok(format!("({text})"))
    } else {
        Ok(text)
    }
}

/// Render a producing node into raw text plus its natural binding level.
pub(crate) fn emit_expression(
    ctx: &mut GenContext,
    ws: &Workspace,
    id: NodeId,
) -> Result<(String, Order), GenerateError> {
    ctx.enter()?;
    ctx.tick()?;
    let node = ws.node(id);
    let result = match node.kind {
        // --- Logic ---
        BlockKind::Compare => compare(ctx, ws, node),
        BlockKind::LogicOperation => logic_operation(ctx, ws, node),
        BlockKind::Negate => negate(ctx, ws, node),
        BlockKind::BoolLiteral => bool_literal(node),
        BlockKind::Ternary => ternary(ctx, ws, node),
        // --- Math ---
        BlockKind::Number => number(node),
        BlockKind::Arithmetic => arithmetic(ctx, ws, node),
        BlockKind::MathSingle => math_single(ctx, ws, node),
        BlockKind::Modulo => modulo(ctx, ws, node),
        BlockKind::Constrain => constrain(ctx, ws, node),
        BlockKind::RandomInt => random_int(ctx, ws, node),
        BlockKind::MathMap => math_map(ctx, ws, node),
        // --- Text ---
        BlockKind::TextLiteral => Ok((quote(node.field_text("TEXT").unwrap_or("")), Order::Atomic)),
        BlockKind::TextJoin => text_join(ctx, ws, node),
        // --- Variables & procedures ---
        BlockKind::VariableGet => variable_get(ctx, ws, node),
        BlockKind::ProcCallReturn => proc_call(ctx, ws, node).map(|call| (call, Order::UnaryPostfix)),
        // --- Time & hardware reads ---
        BlockKind::Millis => Ok(("millis()".to_string(), Order::UnaryPostfix)),
        BlockKind::DigitalRead => digital_read(ctx, node),
        BlockKind::AnalogRead => analog_read(node),
        BlockKind::Ultrasonic => ultrasonic(ctx, node),
        BlockKind::BluetoothRead => bluetooth_read(ctx),
        // A statement block wired into a value slot produces nothing
        // useful; default it like an empty connection.
        _ => Ok(("0".to_string(), Order::Atomic)),
    };
    ctx.leave();
    result
}

// =============================================================================
//                                   LOGIC
// =============================================================================

fn compare(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    let (op, order) = match node.field_text("OP") {
        Some("NEQ") => ("!=", Order::Equality),
        Some("LT") => ("<", Order::Relational),
        Some("LTE") => ("<=", Order::Relational),
        Some("GT") => (">", Order::Relational),
        Some("GTE") => (">=", Order::Relational),
        _ => ("==", Order::Equality),
    };
    let a = emit_value(ctx, ws, node, "A", order, "0")?;
    let b = emit_value(ctx, ws, node, "B", order, "0")?;
    Ok((format!("{a} {op} {b}"), order))
}

fn logic_operation(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    let (op, order) = match node.field_text("OP") {
        Some("OR") => ("||", Order::LogicalOr),
        _ => ("&&", Order::LogicalAnd),
    };
    let a = emit_value(ctx, ws, node, "A", order, "false")?;
    let b = emit_value(ctx, ws, node, "B", order, "false")?;
    Ok((format!("{a} {op} {b}"), order))
}

fn negate(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    let inner = emit_value(ctx, ws, node, "BOOL", Order::UnaryPrefix, "false")?;
    Ok((format!("!{inner}"), Order::UnaryPrefix))
}

fn bool_literal(node: &Node) -> Result<(String, Order), GenerateError> {
    let text = if node.field_text("BOOL") == Some("TRUE") { "true" } else { "false" };
    Ok((text.to_string(), Order::Atomic))
}

fn ternary(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    // `?:` is right-associative: a conditional in the condition position
    // must be wrapped, while the grammar already brackets the middle
    // operand and right-nests the else arm.
    let cond = emit_value(ctx, ws, node, "IF", Order::Conditional.tighter(), "false")?;
    let then = emit_value(ctx, ws, node, "THEN", Order::Conditional, "0")?;
    let otherwise = emit_value(ctx, ws, node, "ELSE", Order::Conditional, "0")?;
    Ok((format!("{cond} ? {then} : {otherwise}"), Order::Conditional))
}

// =============================================================================
//                                   MATH
// =============================================================================

fn number(node: &Node) -> Result<(String, Order), GenerateError> {
    let value = node.field_number("NUM").unwrap_or(0.0);
    Ok((format_number(value), Order::Atomic))
}

fn arithmetic(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    // POWER has no C operator; it renders as a call at call precedence.
    if node.field_text("OP") == Some("POWER") {
        let a = emit_value(ctx, ws, node, "A", Order::None, "0")?;
        let b = emit_value(ctx, ws, node, "B", Order::None, "0")?;
        return Ok((format!("pow({a}, {b})"), Order::UnaryPostfix));
    }
    // The right operand of `-` and `/` requests one level tighter so an
    // equal-level child still gets wrapped.
    let (op, order, rhs_order) = match node.field_text("OP") {
        Some("MINUS") => (" - ", Order::Additive, Order::Additive.tighter()),
        Some("MULTIPLY") => (" * ", Order::Multiplicative, Order::Multiplicative),
        Some("DIVIDE") => (" / ", Order::Multiplicative, Order::Multiplicative.tighter()),
        _ => (" + ", Order::Additive, Order::Additive),
    };
    let a = emit_value(ctx, ws, node, "A", order, "0")?;
    let b = emit_value(ctx, ws, node, "B", rhs_order, "0")?;
    Ok((format!("{a}{op}{b}"), order))
}

fn math_single(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    let op = node.field_text("OP").unwrap_or("ROOT");
    if op == "NEG" {
        let inner = emit_value(ctx, ws, node, "NUM", Order::UnaryPrefix, "0")?;
        return Ok((format!("-{inner}"), Order::UnaryPrefix));
    }
    let code = match op {
        "ABS" => format!("fabs({})", emit_value(ctx, ws, node, "NUM", Order::None, "0")?),
        "LN" => {
            ctx.definitions.set("include_math", "#include <math.h>");
            format!("log({})", emit_value(ctx, ws, node, "NUM", Order::None, "0")?)
        }
        "LOG10" => {
            ctx.definitions.set("include_math", "#include <math.h>");
            format!("log10({})", emit_value(ctx, ws, node, "NUM", Order::None, "0")?)
        }
        "EXP" => {
            ctx.definitions.set("include_math", "#include <math.h>");
            format!("exp({})", emit_value(ctx, ws, node, "NUM", Order::None, "0")?)
        }
        "SIN" | "COS" | "TAN" => {
            ctx.definitions.set("include_math", "#include <math.h>");
            // Block semantics are degrees; the C runtime wants radians.
            let degrees = emit_value(ctx, ws, node, "NUM", Order::Multiplicative, "0")?;
            format!("{}({degrees} / 180.0 * M_PI)", op.to_lowercase())
        }
        _ => format!("sqrt({})", emit_value(ctx, ws, node, "NUM", Order::None, "0")?),
    };
    Ok((code, Order::UnaryPostfix))
}

fn modulo(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    let a = emit_value(ctx, ws, node, "DIVIDEND", Order::Multiplicative, "0")?;
    let b = emit_value(ctx, ws, node, "DIVISOR", Order::Multiplicative.tighter(), "1")?;
    Ok((format!("{a} % {b}"), Order::Multiplicative))
}

fn constrain(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    let value = emit_value(ctx, ws, node, "VALUE", Order::None, "0")?;
    let low = emit_value(ctx, ws, node, "LOW", Order::None, "0")?;
    let high = emit_value(ctx, ws, node, "HIGH", Order::None, "255")?;
    Ok((format!("constrain({value}, {low}, {high})"), Order::UnaryPostfix))
}

fn random_int(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    let from = emit_value(ctx, ws, node, "FROM", Order::None, "0")?;
    // The upper bound lands as the left operand of `+ 1`.
    let to = emit_value(ctx, ws, node, "TO", Order::Additive, "0")?;
    Ok((format!("random({from}, {to} + 1)"), Order::UnaryPostfix))
}

fn math_map(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    let value = emit_value(ctx, ws, node, "VALUE", Order::None, "0")?;
    let from_low = emit_value(ctx, ws, node, "FROM_LOW", Order::None, "0")?;
    let from_high = emit_value(ctx, ws, node, "FROM_HIGH", Order::None, "1024")?;
    let to_low = emit_value(ctx, ws, node, "TO_LOW", Order::None, "0")?;
    let to_high = emit_value(ctx, ws, node, "TO_HIGH", Order::None, "255")?;
    Ok((
        format!("map({value}, {from_low}, {from_high}, {to_low}, {to_high})"),
        Order::UnaryPostfix,
    ))
}

// =============================================================================
//                                   TEXT
// =============================================================================

fn text_join(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    let items = node.indexed_slot_count("ADD");
    match items {
        0 => Ok(("\"\"".to_string(), Order::Atomic)),
        // A one-item join is transparent: pass the inner expression through
        // with its own binding level.
        1 => match node.value_slot("ADD0") {
            Some(only) => emit_expression(ctx, ws, only),
            None => Ok(("\"\"".to_string(), Order::Atomic)),
        },
        _ => {
            let mut parts = Vec::with_capacity(items);
            for n in 0..items {
                let part = emit_value(ctx, ws, node, &format!("ADD{n}"), Order::None, "\"\"")?;
                parts.push(format!("String({part})"));
            }
            Ok((parts.join(" + "), Order::Additive))
        }
    }
}

/// Escape and double-quote a string literal.
pub(crate) fn quote(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}

// =============================================================================
//                          VARIABLES & PROCEDURES
// =============================================================================

fn variable_get(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<(String, Order), GenerateError> {
    let raw = node.field_text("VAR").unwrap_or("item");
    let name = ctx.names.resolve(ws.variable_name(raw), NameCategory::Variable);
    Ok((name, Order::Atomic))
}

/// Shared by the statement and expression call blocks: `name(arg, ...)`.
pub(crate) fn proc_call(ctx: &mut GenContext, ws: &Workspace, node: &Node) -> Result<String, GenerateError> {
    let raw = node.field_text("NAME").unwrap_or("procedure");
    let name = ctx.names.resolve(raw, NameCategory::Procedure);
    let mut args = Vec::new();
    for n in 0..node.indexed_slot_count("ARG") {
        args.push(emit_value(ctx, ws, node, &format!("ARG{n}"), Order::None, "0")?);
    }
    Ok(format!("{name}({})", args.join(", ")))
}

// =============================================================================
//                               HARDWARE READS
// =============================================================================

fn digital_read(ctx: &mut GenContext, node: &Node) -> Result<(String, Order), GenerateError> {
    let pin = pin_field(node, "PIN", "2");
    ctx.setups
        .set(&format!("setup_input_{pin}"), format!("pinMode({pin}, INPUT);"));
    Ok((format!("digitalRead({pin})"), Order::UnaryPostfix))
}

fn analog_read(node: &Node) -> Result<(String, Order), GenerateError> {
    let pin = pin_field(node, "PIN", "A0");
    Ok((format!("analogRead({pin})"), Order::UnaryPostfix))
}

const ULTRASONIC_HELPER: &str = "long readUltrasonic(int trigPin, int echoPin) {\n  pinMode(trigPin, OUTPUT);\n  pinMode(echoPin, INPUT);\n  digitalWrite(trigPin, LOW);\n  delayMicroseconds(2);\n  digitalWrite(trigPin, HIGH);\n  delayMicroseconds(10);\n  digitalWrite(trigPin, LOW);\n  return pulseIn(echoPin, HIGH) * 0.034 / 2;\n}";

fn ultrasonic(ctx: &mut GenContext, node: &Node) -> Result<(String, Order), GenerateError> {
    let trig = pin_field(node, "TRIG", "2");
    let echo = pin_field(node, "ECHO", "3");
    ctx.definitions.set("func_ultrasonic", ULTRASONIC_HELPER);
    Ok((format!("readUltrasonic({trig}, {echo})"), Order::UnaryPostfix))
}

fn bluetooth_read(ctx: &mut GenContext) -> Result<(String, Order), GenerateError> {
    ctx.setups.set("setup_serial", "Serial.begin(9600);");
    Ok(("Serial.read()".to_string(), Order::UnaryPostfix))
}
