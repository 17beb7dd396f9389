#![cfg(test)]

use brine_thrift::{Engine, RunReport, Section};
use serde_json::json;

use std::fs;
use std::path::Path;

const SHOP: &str = r#"
namespace rs acme.shop

/** Colours we sell. */
enum Color { RED, GREEN = 5, BLUE }

struct UserProfile {
  1: string userName,
  2: optional Color favorite = Color.GREEN
}

struct Address { 1: string street }

union Contact { 1: string email, 2: Address postal }

service Shop {
  UserProfile lookup(1: string name)
}
"#;

const STRUCT_TEMPLATE: &str = "// {{ filename }}
pub struct {{ struct.name | ucamel }} {
{% for f in struct.fields %}    pub {{ f.name | decamel }}: {{ f.type.name }},
{% endfor %}}
";

const ENUM_TEMPLATE: &str =
    "{{ base_name }}:{% for e in enum.elements %} {{ e.name }}={{ e.value }}{% endfor %}";

const SUMMARY_TEMPLATE: &str = "{{ model.name }} by {{ params.author }}: \
{{ model.structs | length }} structs, {{ model.unions | length }} unions, \
{{ model.services[0].functions[0].name }}";

fn write_fixtures(root: &Path) {
    fs::write(root.join("shop.thrift"), SHOP).expect("write model failed");
    let templates = root.join("templates");
    fs::create_dir_all(&templates).expect("create templates failed");
    fs::write(templates.join("struct.j2"), STRUCT_TEMPLATE).expect("write template failed");
    fs::write(templates.join("enum.j2"), ENUM_TEMPLATE).expect("write template failed");
    fs::write(templates.join("summary.j2"), SUMMARY_TEMPLATE).expect("write template failed");
}

fn section(value: serde_json::Value) -> Section {
    value.as_object().cloned().expect("not an object")
}

#[test]
fn test_generate_shop() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let root = dir.path();
    write_fixtures(root);

    let genspec = section(json!({
        "global": {
            "options": {
                "base_input_dir": root.join("templates").to_string_lossy(),
                "namespace": "rs",
            },
            "params": { "author": "nobody" },
        },
        "targets": {
            "rust": {
                "options": { "filename_extension": ".rs" },
                "params": { "author": "shop team" },
                "helper_classes": { "naming": "naming", "extra": "no.such.Helper" },
                "generators": [
                    { "template": "struct.j2", "iterate": "struct", "filename_case": "underscore_case" },
                    { "template": "enum.j2", "iterate": "enum", "filename_prefix": "E", "filename_extension": "txt" },
                    { "template": "summary.j2", "filename": "summary.md" },
                    { "template": "missing.j2", "filename": "missing.md" },
                ],
            },
            "broken": {
                "options": { "model_file": "" },
                "generators": [{ "template": "summary.j2", "filename": "never.md" }],
            },
        },
    }));

    let options = section(json!({
        "model_file": root.join("shop.thrift").to_string_lossy(),
        "base_output_dir": root.join("out").to_string_lossy(),
    }));
    let engine = Engine::with_genspec(options, genspec);
    let report = engine.run().expect("run failed");
    assert_eq!(report, RunReport { succeeded: 3, skipped: 1, failed: 1 });

    let out = root.join("out").join("acme").join("shop");

    let profile = fs::read_to_string(out.join("user_profile.rs")).expect("user_profile.rs missing");
    assert!(profile.starts_with("// user_profile.rs"));
    assert!(profile.contains("pub struct UserProfile {"));
    assert!(profile.contains("    pub user_name: string,"));
    assert!(profile.contains("    pub favorite: Color,"));
    assert!(out.join("address.rs").exists());
    // unions are rendered by the union mode only
    assert!(!out.join("contact.rs").exists());

    let color = fs::read_to_string(out.join("EColor.txt")).expect("EColor.txt missing");
    assert_eq!(color, "EColor: RED=0 GREEN=5 BLUE=6");

    let summary = fs::read_to_string(out.join("summary.md")).expect("summary.md missing");
    assert_eq!(summary, "shop by shop team: 2 structs, 1 unions, lookup");

    assert!(!out.join("missing.md").exists());
    assert!(!out.join("never.md").exists());
}

#[test]
fn test_union_and_service_iteration() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let root = dir.path();
    write_fixtures(root);
    fs::write(
        root.join("templates").join("names.j2"),
        "{% if union %}{{ union.name }}{% endif %}{% if service %}{{ service.qname }}{% endif %}",
    )
    .expect("write template failed");

    let genspec = section(json!({
        "targets": {
            "names": {
                "options": { "output_dir": "names" },
                "generators": [
                    { "template": "names.j2", "iterate": "union", "filename_suffix": "Union" },
                    { "template": "names.j2", "iterate": "service", "filename_case": "underscore_case" },
                ],
            },
        },
    }));
    let options = section(json!({
        "model_file": root.join("shop.thrift").to_string_lossy(),
        "base_input_dir": root.join("templates").to_string_lossy(),
        "base_output_dir": root.to_string_lossy(),
    }));
    let report = Engine::with_genspec(options, genspec).run().expect("run failed");
    assert_eq!(report.succeeded, 2);

    // no extension configured means no dot
    let union = fs::read_to_string(root.join("names").join("ContactUnion")).expect("ContactUnion missing");
    assert_eq!(union, "Contact");
    let service = fs::read_to_string(root.join("names").join("shop")).expect("shop missing");
    assert_eq!(service, "shop.Shop");
}

#[test]
fn test_broken_model_stops_run() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let root = dir.path();
    write_fixtures(root);
    fs::write(root.join("bad.thrift"), "struct A { 1: i32 x, 1: i32 y }").expect("write model failed");

    let genspec = section(json!({
        "targets": {
            "first":  { "generators": [{ "template": "summary.j2", "filename": "a.md" }] },
            "second": {
                "options": { "model_file": root.join("shop.thrift").to_string_lossy() },
                "generators": [{ "template": "summary.j2", "filename": "b.md" }],
            },
        },
    }));
    let options = section(json!({
        "model_file": root.join("bad.thrift").to_string_lossy(),
        "base_input_dir": root.join("templates").to_string_lossy(),
        "base_output_dir": root.join("out").to_string_lossy(),
    }));
    let err = Engine::with_genspec(options, genspec).run().unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("bad.thrift"));
    assert!(!root.join("out").join("b.md").exists());
}
