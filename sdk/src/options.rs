//! Section and option names understood in genspec files, and lookups that
//! treat the genspec tree the way generators expect.

use serde_json::{Map, Value};

pub type Section = Map<String, Value>;

pub const SECTION_GLOBAL:     &str = "global";
pub const SECTION_OPTIONS:    &str = "options";
pub const SECTION_PARAMS:     &str = "params";
pub const SECTION_TARGETS:    &str = "targets";
pub const SECTION_HELPERS:    &str = "helper_classes";
pub const SECTION_GENERATORS: &str = "generators";

pub const OPT_MODEL_FILE:         &str = "model_file";
pub const OPT_GENSPEC_FILE:       &str = "genspec_file";
pub const OPT_BASE_INPUT_DIR:     &str = "base_input_dir";
pub const OPT_BASE_OUTPUT_DIR:    &str = "base_output_dir";
pub const OPT_INPUT_DIR:          &str = "input_dir";
pub const OPT_OUTPUT_DIR:         &str = "output_dir";
pub const OPT_INPUT_FILE:         &str = "input_file";
pub const OPT_OUTPUT_FILE:        &str = "output_file";
pub const OPT_CHARSET:            &str = "output_charset";
pub const OPT_GENERATOR_CLASS:    &str = "generator_class";
pub const OPT_TARGET:             &str = "target";
pub const OPT_NAMESPACE:          &str = "namespace";
pub const OPT_TEMPLATE:           &str = "template";
pub const OPT_ITERATE:            &str = "iterate";
pub const OPT_FILENAME:           &str = "filename";
pub const OPT_FILENAME_CASE:      &str = "filename_case";
pub const OPT_FILENAME_PREFIX:    &str = "filename_prefix";
pub const OPT_FILENAME_SUFFIX:    &str = "filename_suffix";
pub const OPT_FILENAME_EXTENSION: &str = "filename_extension";

/// Selects every target when given as a requested target name.
pub const ALL_TARGETS: &str = "all";

/// A trimmed string value. Blank strings and non-strings count as absent.
pub fn get_string<'a>(section: &'a Section, name: &str) -> Option<&'a str> {
    section
        .get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

pub fn get_string_or<'a>(section: &'a Section, name: &str, default: &'a str) -> &'a str {
    get_string(section, name).unwrap_or(default)
}

/// A copy of the named object, or an empty one.
pub fn get_map(section: &Section, name: &str) -> Section {
    match section.get(name) {
        Some(Value::Object(map)) => map.clone(),
        _ => Section::new(),
    }
}

/// The named list. A single value is treated as a one-element list.
pub fn get_list(section: &Section, name: &str) -> Vec<Value> {
    match section.get(name) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

/// A copy of `base` with every entry of `top` written over it.
pub fn overlay(base: &Section, top: &Section) -> Section {
    let mut merged = base.clone();
    for (key, value) in top {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// How entries are named in diagnostics: `target[index]`.
pub fn target_gen_id(target: &str, index: usize) -> String {
    format!("{}[{}]", target, index)
}
