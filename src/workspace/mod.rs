//! # Workspace Snapshot Model
//!
//! The in-memory representation of a block program as handed over by the
//! visual editor: an arena of [`Node`]s, the top-level chains in document
//! order, and the variable table.
//!
//! The model is read-only during generation. The mutators on [`Workspace`]
//! exist for the editor (and for tests building graphs by hand); the
//! generator only ever takes `&Workspace`.
//!
//! Slot and `next` references must form a forest. The generator does not
//! defend against cycles beyond its recursion guards — see
//! [`crate::codegen::GenerateError`].

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use crate::codegen::GenerateError;

/// Index into the workspace node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Closed set of supported block kinds.
///
/// The wire tags (used by the editor's snapshot format) are the original
/// block-library identifiers; see [`BlockKind::tag`]. Keeping the set closed
/// makes statement/expression dispatch an exhaustive match, so an
/// unhandled kind cannot survive to run time — unknown tags are rejected
/// when a snapshot is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    // Logic
    If,
    Compare,
    LogicOperation,
    Negate,
    BoolLiteral,
    Ternary,
    // Loops
    Repeat,
    WhileUntil,
    For,
    // Math
    Number,
    Arithmetic,
    MathSingle,
    Modulo,
    Constrain,
    RandomInt,
    MathMap,
    // Text
    TextLiteral,
    TextJoin,
    SerialPrint,
    // Variables
    VariableGet,
    VariableSet,
    VariableChange,
    // Procedures
    ProcDefNoReturn,
    ProcDefReturn,
    ProcCallNoReturn,
    ProcCallReturn,
    ProcIfReturn,
    // Time
    Delay,
    Millis,
    // Core I/O
    DigitalWrite,
    DigitalRead,
    AnalogWrite,
    AnalogRead,
    // Peripherals
    Ultrasonic,
    Motor,
    BluetoothRead,
    WifiConnect,
    ServoWrite,
    Tone,
    // Program entry
    Start,
}

impl BlockKind {
    /// The editor wire tag for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            BlockKind::If => "controls_if",
            BlockKind::Compare => "logic_compare",
            BlockKind::LogicOperation => "logic_operation",
            BlockKind::Negate => "logic_negate",
            BlockKind::BoolLiteral => "logic_boolean",
            BlockKind::Ternary => "logic_ternary",
            BlockKind::Repeat => "controls_repeat_ext",
            BlockKind::WhileUntil => "controls_whileUntil",
            BlockKind::For => "controls_for",
            BlockKind::Number => "math_number",
            BlockKind::Arithmetic => "math_arithmetic",
            BlockKind::MathSingle => "math_single",
            BlockKind::Modulo => "math_modulo",
            BlockKind::Constrain => "math_constrain",
            BlockKind::RandomInt => "math_random_int",
            BlockKind::MathMap => "math_map",
            BlockKind::TextLiteral => "text",
            BlockKind::TextJoin => "text_join",
            BlockKind::SerialPrint => "text_print",
            BlockKind::VariableGet => "variables_get",
            BlockKind::VariableSet => "variables_set",
            BlockKind::VariableChange => "math_change",
            BlockKind::ProcDefNoReturn => "procedures_defnoreturn",
            BlockKind::ProcDefReturn => "procedures_defreturn",
            BlockKind::ProcCallNoReturn => "procedures_callnoreturn",
            BlockKind::ProcCallReturn => "procedures_callreturn",
            BlockKind::ProcIfReturn => "procedures_ifreturn",
            BlockKind::Delay => "custom_delay",
            BlockKind::Millis => "time_millis",
            BlockKind::DigitalWrite => "digital_write",
            BlockKind::DigitalRead => "digital_read",
            BlockKind::AnalogWrite => "analog_write",
            BlockKind::AnalogRead => "analog_read",
            BlockKind::Ultrasonic => "rm_ultrasonic",
            BlockKind::Motor => "rm_motor",
            BlockKind::BluetoothRead => "rm_bluetooth_read",
            BlockKind::WifiConnect => "rm_wifi_connect",
            BlockKind::ServoWrite => "rm_servo_write",
            BlockKind::Tone => "rm_tone",
            BlockKind::Start => "arduino_start",
        }
    }

    /// Look up a kind by its editor wire tag.
    pub fn from_tag(tag: &str) -> Result<Self, GenerateError> {
        ALL_KINDS
            .iter()
            .copied()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| GenerateError::UnknownBlockType(tag.to_string()))
    }

    /// Whether this kind produces a value (expression position) rather than
    /// a statement.
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            BlockKind::Compare
                | BlockKind::LogicOperation
                | BlockKind::Negate
                | BlockKind::BoolLiteral
                | BlockKind::Ternary
                | BlockKind::Number
                | BlockKind::Arithmetic
                | BlockKind::MathSingle
                | BlockKind::Modulo
                | BlockKind::Constrain
                | BlockKind::RandomInt
                | BlockKind::MathMap
                | BlockKind::TextLiteral
                | BlockKind::TextJoin
                | BlockKind::VariableGet
                | BlockKind::ProcCallReturn
                | BlockKind::Millis
                | BlockKind::DigitalRead
                | BlockKind::AnalogRead
                | BlockKind::Ultrasonic
                | BlockKind::BluetoothRead
        )
    }
}

const ALL_KINDS: &[BlockKind] = &[
    BlockKind::If,
    BlockKind::Compare,
    BlockKind::LogicOperation,
    BlockKind::Negate,
    BlockKind::BoolLiteral,
    BlockKind::Ternary,
    BlockKind::Repeat,
    BlockKind::WhileUntil,
    BlockKind::For,
    BlockKind::Number,
    BlockKind::Arithmetic,
    BlockKind::MathSingle,
    BlockKind::Modulo,
    BlockKind::Constrain,
    BlockKind::RandomInt,
    BlockKind::MathMap,
    BlockKind::TextLiteral,
    BlockKind::TextJoin,
    BlockKind::SerialPrint,
    BlockKind::VariableGet,
    BlockKind::VariableSet,
    BlockKind::VariableChange,
    BlockKind::ProcDefNoReturn,
    BlockKind::ProcDefReturn,
    BlockKind::ProcCallNoReturn,
    BlockKind::ProcCallReturn,
    BlockKind::ProcIfReturn,
    BlockKind::Delay,
    BlockKind::Millis,
    BlockKind::DigitalWrite,
    BlockKind::DigitalRead,
    BlockKind::AnalogWrite,
    BlockKind::AnalogRead,
    BlockKind::Ultrasonic,
    BlockKind::Motor,
    BlockKind::BluetoothRead,
    BlockKind::WifiConnect,
    BlockKind::ServoWrite,
    BlockKind::Tone,
    BlockKind::Start,
];

impl Serialize for BlockKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for BlockKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        BlockKind::from_tag(&tag).map_err(D::Error::custom)
    }
}

/// A literal field value set at authoring time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// One block instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: BlockKind,
    /// Literal scalars keyed by field name (dropdowns, number fields, text).
    #[serde(default)]
    pub fields: HashMap<String, FieldValue>,
    /// Value slots; a missing key is an empty slot.
    #[serde(default)]
    pub values: HashMap<String, NodeId>,
    /// Statement slots holding the head of a child chain.
    #[serde(default)]
    pub statements: HashMap<String, NodeId>,
    /// Next node in this statement chain.
    #[serde(default)]
    pub next: Option<NodeId>,
}

impl Node {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            fields: HashMap::new(),
            values: HashMap::new(),
            statements: HashMap::new(),
            next: None,
        }
    }

    /// Text of a field, if present and textual.
    pub fn field_text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric value of a field, if present and numeric.
    pub fn field_number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn value_slot(&self, name: &str) -> Option<NodeId> {
        self.values.get(name).copied()
    }

    pub fn statement_slot(&self, name: &str) -> Option<NodeId> {
        self.statements.get(name).copied()
    }

    /// Number of occupied indexed slots (`ADD0`, `ADD1`, ...) for variadic
    /// blocks. Counts up to the highest occupied index so gaps still get a
    /// default value emitted.
    pub fn indexed_slot_count(&self, prefix: &str) -> usize {
        self.values
            .keys()
            .filter_map(|name| name.strip_prefix(prefix))
            .filter_map(|suffix| suffix.parse::<usize>().ok())
            .map(|index| index + 1)
            .max()
            .unwrap_or(0)
    }
}

/// A user variable: internal identifier plus the user-facing display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub name: String,
}

/// The full in-memory program: all top-level chains plus the variable table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workspace {
    nodes: Vec<Node>,
    /// Top-level chain heads in document order.
    pub roots: Vec<NodeId>,
    /// Variable table in declaration order.
    pub variables: Vec<Variable>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, kind: BlockKind) -> NodeId {
        self.nodes.push(Node::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Mark a node as the head of a top-level chain.
    pub fn add_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    pub fn set_field(&mut self, id: NodeId, name: &str, value: FieldValue) {
        self.node_mut(id).fields.insert(name.to_string(), value);
    }

    /// Attach a producing node to a value slot.
    pub fn connect_value(&mut self, parent: NodeId, slot: &str, child: NodeId) {
        self.node_mut(parent).values.insert(slot.to_string(), child);
    }

    /// Attach a chain head to a statement slot.
    pub fn connect_statement(&mut self, parent: NodeId, slot: &str, head: NodeId) {
        self.node_mut(parent)
            .statements
            .insert(slot.to_string(), head);
    }

    /// Link `next` after `prev` in a statement chain.
    pub fn set_next(&mut self, prev: NodeId, next: NodeId) {
        self.node_mut(prev).next = Some(next);
    }

    pub fn add_variable(&mut self, id: &str, name: &str) {
        self.variables.push(Variable {
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    /// User-facing name for a variable id. Falls back to the id itself for
    /// references the table does not know about.
    pub fn variable_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.variables
            .iter()
            .find(|var| var.id == id)
            .map(|var| var.name.as_str())
            .unwrap_or(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip_for_every_kind() {
        for kind in ALL_KINDS {
            assert_eq!(BlockKind::from_tag(kind.tag()).unwrap(), *kind);
        }
    }

    #[test]
    fn unknown_tag_is_rejected_by_name() {
        let err = BlockKind::from_tag("controls_flux").unwrap_err();
        assert!(err.to_string().contains("controls_flux"));
    }

    #[test]
    fn indexed_slot_count_spans_gaps() {
        let mut ws = Workspace::new();
        let join = ws.add_node(BlockKind::TextJoin);
        let a = ws.add_node(BlockKind::TextLiteral);
        let b = ws.add_node(BlockKind::TextLiteral);
        ws.connect_value(join, "ADD0", a);
        ws.connect_value(join, "ADD2", b);
        assert_eq!(ws.node(join).indexed_slot_count("ADD"), 3);
    }

    #[test]
    fn snapshot_json_round_trips() {
        let mut ws = Workspace::new();
        ws.add_variable("var-1", "speed");
        let set = ws.add_node(BlockKind::VariableSet);
        ws.set_field(set, "VAR", FieldValue::Text("var-1".to_string()));
        let num = ws.add_node(BlockKind::Number);
        ws.set_field(num, "NUM", FieldValue::Number(42.0));
        ws.connect_value(set, "VALUE", num);
        ws.add_root(set);

        let json = serde_json::to_string(&ws).unwrap();
        let back: Workspace = serde_json::from_str(&json).unwrap();
        assert_eq!(back.roots, ws.roots);
        assert_eq!(back.node(set).kind, BlockKind::VariableSet);
        assert_eq!(back.node(num).field_number("NUM"), Some(42.0));
    }
}
