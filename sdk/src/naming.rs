//! Identifier case conversions, available to templates through the
//! `naming` helper set.

use lazy_static::lazy_static;
use minijinja::Environment;
use regex::Regex;

lazy_static! {
    static ref CSPLIT_CASE: Regex = Regex::new(r"([a-z][0-9]*)([A-Z])").unwrap();
    static ref CSPLIT_MULT: Regex = Regex::new(r"([A-Z])([A-Z][a-z])").unwrap();
}

const MAX_PAD: usize = 64;

/// Upper-cases the first character.
pub fn cap(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-cases the first character.
pub fn decap(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `my_struct_name` to `MyStructName`.
pub fn ucamel(value: &str) -> String {
    value.split('_').map(cap).collect()
}

/// `my_struct_name` to `myStructName`.
pub fn lcamel(value: &str) -> String {
    let mut segs = value.split('_');
    let mut out = segs.next().map(decap).unwrap_or_default();
    out.extend(segs.map(cap));
    out
}

/// `MyHTMLParser` to `my_html_parser`.
pub fn decamel(value: &str) -> String {
    let split = CSPLIT_CASE.replace_all(value, "${1}_${2}");
    CSPLIT_MULT.replace_all(&split, "${1}_${2}").to_lowercase()
}

/// Spaces that bring `value` up to `width`; always at least one.
pub fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    " ".repeat(width.saturating_sub(len).clamp(1, MAX_PAD))
}

/// Registers the conversions as filters, plus a `pad(value, width)` function.
pub fn install(env: &mut Environment<'_>) {
    env.add_filter("cap", |v: String| cap(&v));
    env.add_filter("decap", |v: String| decap(&v));
    env.add_filter("ucamel", |v: String| ucamel(&v));
    env.add_filter("lcamel", |v: String| lcamel(&v));
    env.add_filter("decamel", |v: String| decamel(&v));
    env.add_filter("uc", |v: String| v.to_uppercase());
    env.add_filter("lc", |v: String| v.to_lowercase());
    env.add_function("pad", |v: String, width: usize| pad(&v, width));
}
