//! Prompt compilation: substitutes named slot values into a template.
//!
//! A slot is a `{name}` marker where `name` is an identifier
//! (`[A-Za-z_][A-Za-z0-9_]*`). Substitution is a single pass over the
//! template: replacement values are never rescanned for markers, so
//! design-export content containing brace patterns cannot trigger
//! further expansion.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use figforge_shared::{FigforgeError, Result};

pub mod templates;

static SLOT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

/// Compile a template by replacing every slot marker with its mapped value.
///
/// Fails with [`FigforgeError::MissingSlot`] if the template references a
/// slot absent from the mapping; the first missing slot (in template
/// order) is reported, and nothing is substituted. Extra mapping entries
/// the template never references are ignored.
pub fn compile(template: &str, slots: &HashMap<String, String>) -> Result<String> {
    for caps in SLOT_RE.captures_iter(template) {
        let name = &caps[1];
        if !slots.contains_key(name) {
            return Err(FigforgeError::missing_slot(name));
        }
    }

    let compiled = SLOT_RE.replace_all(template, |caps: &regex::Captures| {
        // Presence checked above; captures_iter and replace_all walk the
        // same matches.
        slots[&caps[1]].as_str()
    });

    Ok(compiled.into_owned())
}

/// Slot names the compiler found in a template, in order of first use.
pub fn referenced_slots(template: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in SLOT_RE.captures_iter(template) {
        let name = caps[1].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}
