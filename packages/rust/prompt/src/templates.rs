//! Built-in default templates for the generate and enrich steps.
//!
//! Templates are opaque to the compiler; these built-ins exist so the CLI
//! works out of the box. Callers can substitute their own template files
//! with the same slot names.

/// One-shot generation template. Compiled once, sent with the design
/// images to produce the seed code artifact.
pub const DEFAULT_GENERATE_TEMPLATE: &str = "\
Generate mobile UI screen code from the attached design image for \
integration into an existing project.

Use the existing custom components listed below instead of creating new \
ones, follow the project structure exactly, and produce complete, \
production-ready code with no mocks or placeholder comments.

## Component mapping
{component_mapping}

## Existing custom components
{existing_components}

## Sample working code patterns
{sample_code}

## Project structure
{package_structure}

## Conventions and standards
{conventions}

## User stories and business logic
{user_stories}

## API endpoints
{api_endpoints}

Analyze the attached design image, map each visual element to an existing \
component, and generate the complete screen code now, organized by file \
path.
";

/// Iterative enrichment template. Compiled once per chunk; each compile
/// embeds the previous iteration's full output as `current_code`.
pub const DEFAULT_ENRICH_TEMPLATE: &str = "\
You are enhancing generated mobile UI code with precise design \
specifications extracted from a Figma API export.

This is iteration {iteration_number} of code enrichment. The design data \
below is part {part_number} of {total_parts}; earlier parts have already \
been applied to the current code, so refine it further rather than \
starting over.

Apply exact values from the design data: dimensions, padding, margins, \
colors, border radii, font families, sizes, and weights. Map raw color \
values to the theme tokens below instead of hardcoding hex values. Keep \
the file structure and component usage of the current code unchanged, and \
re-emit the complete updated code, organized by file path.

## Theme colors and typography
{theme_reference}

## Current code
{current_code}

## Figma API design data (part {part_number} of {total_parts})
{design_chunk}

Re-emit the full updated code now.
";

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::{compile, referenced_slots};

    fn full_mapping(names: &[&str]) -> HashMap<String, String> {
        names
            .iter()
            .map(|n| (n.to_string(), format!("<{n} value>")))
            .collect()
    }

    #[test]
    fn enrich_template_slots() {
        let refs = referenced_slots(DEFAULT_ENRICH_TEMPLATE);
        for expected in [
            "iteration_number",
            "part_number",
            "total_parts",
            "theme_reference",
            "current_code",
            "design_chunk",
        ] {
            assert!(refs.iter().any(|r| r == expected), "missing slot {expected}");
        }
    }

    #[test]
    fn builtin_templates_compile_with_their_slots() {
        let refs = referenced_slots(DEFAULT_ENRICH_TEMPLATE);
        let mapping = full_mapping(&refs.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(compile(DEFAULT_ENRICH_TEMPLATE, &mapping).is_ok());

        let refs = referenced_slots(DEFAULT_GENERATE_TEMPLATE);
        let mapping = full_mapping(&refs.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(compile(DEFAULT_GENERATE_TEMPLATE, &mapping).is_ok());
    }
}
