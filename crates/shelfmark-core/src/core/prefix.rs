// crates/shelfmark-core/src/core/prefix.rs
// ============================================================================
// Module: Shelfmark Prefix Table
// Description: Container-profile name to label-prefix mapping.
// Purpose: Provide the total lookup used to format identifier labels.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Labels carry a one- or two-letter prefix derived from the container profile
//! the identifier was assigned under. The table is intentionally total: unknown
//! or absent profile names fall back to [`DEFAULT_PREFIX`] rather than failing.

// ============================================================================
// SECTION: Prefix Table
// ============================================================================

/// Prefix assigned when the profile name is absent or unmapped.
pub const DEFAULT_PREFIX: &str = "C";

/// Fixed mapping from container-profile names to label prefixes.
const PROFILE_PREFIXES: &[(&str, &str)] = &[
    ("Objects", "C"),
    ("BoxQ", "L"),
    ("Double Elephant size box", "Z"),
    ("Double Elephant volume", "D"),
    ("Elephant size box", "P"),
    ("Elephant volume", "E"),
    ("Folio", "F"),
    ("Mudd OS depth", "DO"),
    ("Mudd OS height", "H"),
    ("Mudd OS length", "LO"),
    ("Mudd ST records center", "S"),
    ("Mudd ST manuscript", "S"),
    ("Mudd ST half-manuscript", "S"),
    ("Mudd ST other", "S"),
    ("Mudd OS open", "O"),
    ("NBox", "B"),
    ("Ordinary", "N"),
    ("Quarto", "Q"),
    ("Small", "S"),
];

/// Returns the label prefix for a container-profile name.
///
/// Total over all inputs: `None` and unmapped names yield [`DEFAULT_PREFIX`].
#[must_use]
pub fn prefix_for(profile_name: Option<&str>) -> &'static str {
    let Some(name) = profile_name else {
        return DEFAULT_PREFIX;
    };
    PROFILE_PREFIXES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map_or(DEFAULT_PREFIX, |(_, prefix)| prefix)
}
