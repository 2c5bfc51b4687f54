//! # Name Resolver
//!
//! Maps free-form identifiers (user variable names, procedure names) to
//! sanitized, collision-free output identifiers that avoid the Arduino C++
//! keywords and the standard API surface.
//!
//! Resolution is idempotent within one generation pass: the same raw name
//! in the same category always maps to the same safe identifier.

use std::collections::{HashMap, HashSet};

/// Identifier namespace. Collisions are only avoided within a category;
/// a variable and a procedure may legally share a sanitized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameCategory {
    Variable,
    Procedure,
}

impl NameCategory {
    /// Fallback stem when sanitizing leaves nothing usable.
    fn fallback(self) -> &'static str {
        match self {
            NameCategory::Variable => "var",
            NameCategory::Procedure => "proc",
        }
    }
}

/// Arduino C++ keywords plus the core API names generated code relies on.
const RESERVED_WORDS: &[&str] = &[
    "setup", "loop", "if", "else", "for", "switch", "case", "while", "do", "break", "continue",
    "return", "goto", "define", "include", "HIGH", "LOW", "INPUT", "OUTPUT", "INPUT_PULLUP",
    "true", "false", "void", "boolean", "bool", "char", "class", "const", "double", "enum",
    "explicit", "extern", "float", "friend", "inline", "int", "long", "mutable", "new",
    "operator", "private", "protected", "public", "register", "short", "signed", "sizeof",
    "static", "struct", "template", "this", "throw", "try", "typedef", "union", "unsigned",
    "virtual", "volatile", "delay", "delayMicroseconds", "millis", "micros", "pinMode",
    "digitalWrite", "digitalRead", "analogWrite", "analogRead", "map", "constrain", "random",
    "randomSeed", "pow", "sqrt", "abs", "min", "max", "tone", "noTone", "pulseIn", "Serial",
    "String", "Servo", "WiFi", "begin", "print", "println", "available", "read", "write",
    "flush", "peek", "end",
];

#[derive(Debug, Default)]
pub struct NameResolver {
    assigned: HashMap<(NameCategory, String), String>,
    taken: HashMap<NameCategory, HashSet<String>>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a raw identifier to a safe output identifier.
    pub fn resolve(&mut self, raw: &str, category: NameCategory) -> String {
        let key = (category, raw.to_string());
        if let Some(existing) = self.assigned.get(&key) {
            return existing.clone();
        }
        let safe = self.claim(&sanitize(raw, category), category);
        self.assigned.insert(key, safe.clone());
        safe
    }

    /// Mint a fresh identifier from a base stem, never reusing a previously
    /// returned name. Used for generated loop counters.
    pub fn distinct(&mut self, base: &str, category: NameCategory) -> String {
        self.claim(&sanitize(base, category), category)
    }

    /// Find the first unused variant of `base` in the category and mark it
    /// taken.
    fn claim(&mut self, base: &str, category: NameCategory) -> String {
        let taken = self.taken.entry(category).or_default();
        let mut candidate = base.to_string();
        let mut suffix = 2usize;
        while taken.contains(&candidate) || RESERVED_WORDS.contains(&candidate.as_str()) {
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());
        candidate
    }
}

/// Strip everything outside `[A-Za-z0-9_]` and make sure the result can
/// start a C identifier.
fn sanitize(raw: &str, category: NameCategory) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    out = out.trim_matches('_').to_string();
    if out.is_empty() {
        out = category.fallback().to_string();
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_idempotent() {
        let mut names = NameResolver::new();
        let first = names.resolve("motor speed", NameCategory::Variable);
        let second = names.resolve("motor speed", NameCategory::Variable);
        assert_eq!(first, "motor_speed");
        assert_eq!(first, second);
    }

    #[test]
    fn reserved_words_are_avoided() {
        let mut names = NameResolver::new();
        assert_eq!(names.resolve("loop", NameCategory::Variable), "loop2");
        assert_eq!(names.resolve("Serial", NameCategory::Variable), "Serial2");
    }

    #[test]
    fn distinct_raw_names_never_collide() {
        let mut names = NameResolver::new();
        let a = names.resolve("valor!", NameCategory::Variable);
        let b = names.resolve("valor?", NameCategory::Variable);
        assert_eq!(a, "valor");
        assert_eq!(b, "valor2");
    }

    #[test]
    fn categories_are_independent() {
        let mut names = NameResolver::new();
        let var = names.resolve("blink", NameCategory::Variable);
        let proc = names.resolve("blink", NameCategory::Procedure);
        assert_eq!(var, "blink");
        assert_eq!(proc, "blink");
    }

    #[test]
    fn distinct_mints_fresh_counters() {
        let mut names = NameResolver::new();
        assert_eq!(names.distinct("count", NameCategory::Variable), "count");
        assert_eq!(names.distinct("count", NameCategory::Variable), "count2");
        assert_eq!(names.distinct("count", NameCategory::Variable), "count3");
    }

    #[test]
    fn digits_and_symbols_are_sanitized() {
        let mut names = NameResolver::new();
        assert_eq!(names.resolve("3 leds", NameCategory::Variable), "_3_leds");
        assert_eq!(names.resolve("¡hola!", NameCategory::Variable), "hola");
    }
}
