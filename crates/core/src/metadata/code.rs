//! Catalog code normalization.
//!
//! Codes are compared and queried in a stripped form containing only
//! `[A-Z0-9]`; the display form re-inserts the `-` between the letter and
//! digit groups.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static CODE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2,8})(\d+)$").expect("valid code shape"));

/// Canonical stripped form: uppercase, `[A-Z0-9]` only.
pub fn strip_code(code: &str) -> String {
    code.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Display form: `ABC12345` becomes `ABC-12345`; anything that does not
/// split cleanly into letters + digits is returned stripped.
pub fn display_code(code: &str) -> String {
    let stripped = strip_code(code);
    match CODE_SHAPE.captures(&stripped) {
        Some(caps) => format!("{}-{}", &caps[1], &caps[2]),
        None => stripped,
    }
}

/// Ordered, deduplicated search variants for a code: the stripped form, the
/// dashed form, the dashed form with digits zero-padded to 4, and the spaced
/// form.
pub fn query_variants(code: &str) -> Vec<String> {
    let stripped = strip_code(code);
    let mut variants = vec![stripped.clone()];

    if let Some(caps) = CODE_SHAPE.captures(&stripped) {
        let letters = &caps[1];
        let digits = &caps[2];
        variants.push(format!("{}-{}", letters, digits));
        variants.push(format!("{}-{:0>4}", letters, digits));
        variants.push(format!("{} {}", letters, digits));
    }

    let mut seen = std::collections::HashSet::new();
    variants.retain(|v| seen.insert(v.clone()));
    variants
}
