// example/src/main.rs

use std::path::{Path, PathBuf};

use brine_thrift::options::{get_string, OPT_BASE_INPUT_DIR, OPT_BASE_OUTPUT_DIR, OPT_MODEL_FILE, OPT_TEMPLATE};
use brine_thrift::*;
use serde_json::Value;

fn main() -> Result<(), GenError> {
    tracing_subscriber::fmt().with_target(false).init();

    // Everything the genspec refers to lives next to this crate's Cargo.toml.
    let dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let out: PathBuf = std::env::args().nth(1).map(Into::into).unwrap_or_else(|| dir.join("generated"));

    // Command-line style options. They beat the genspec's global options but
    // not the options a target sets itself.
    let mut options = Section::new();
    let path = |p: &Path| Value::String(p.to_string_lossy().into_owned());
    options.insert(OPT_MODEL_FILE.to_string(), path(&dir.join("tutorial.thrift")));
    options.insert(OPT_BASE_INPUT_DIR.to_string(), path(&dir.join("templates")));
    options.insert(OPT_BASE_OUTPUT_DIR.to_string(), path(&out));

    // No genspec_file given, so the single codegen.gen in `dir` is picked up.
    let mut engine = Engine::load_from_dir(options, dir)?;

    // An extra helper set, selectable from a genspec's helper_classes.
    let mut helpers = HelperRegistry::default();
    helpers.register("shout", |env| {
        env.add_filter("shout", |v: String| format!("{}!", v.to_uppercase()));
    });
    engine.generators_mut().register(DEFAULT_GENERATOR, move || {
        Box::new(TemplateGenerator::new(helpers.clone())) as Box<dyn Generator>
    });

    for entry in engine.resolve() {
        println!("{:<8} {}", entry.id(), get_string(&entry.config, OPT_TEMPLATE).unwrap_or("-"));
    }

    let report = engine.run()?;
    println!(
        "done: {} succeeded, {} skipped, {} failed -> {}",
        report.succeeded,
        report.skipped,
        report.failed,
        out.display()
    );
    Ok(())
}
