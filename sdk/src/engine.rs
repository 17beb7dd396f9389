use crate::{
    error::GenError,
    options::*,
    registry::GeneratorRegistry,
};
use brine_thrift_compiler::{load_genspec, FileRef};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use std::fs;
use std::path::Path;

/// One generator entry with its options, params and helpers fully merged.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorEntry {
    pub target: String,
    pub index:  usize,
    pub config: Section,
}

impl GeneratorEntry {
    pub fn id(&self) -> String {
        target_gen_id(&self.target, self.index)
    }
}

/// Outcome counts for a run that was not aborted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: usize,
    /// Entries skipped for missing or invalid configuration.
    pub skipped:   usize,
    pub failed:    usize,
}

/// Drives every selected generator entry of a genspec.
///
/// Options cascade from the genspec's `global` section through each target
/// down to each generator entry, the more specific scope winning. Options
/// passed in by the caller are folded into the global scope, so they beat the
/// genspec's global options but lose to anything set on a target or entry.
pub struct Engine {
    options:    Section,
    genspec:    Section,
    generators: GeneratorRegistry,
}

impl Engine {
    /// Loads the genspec named by `genspec_file`, or the only `*.gen` file
    /// in the working directory.
    pub fn new(options: Section) -> Result<Self, GenError> {
        let cwd = std::env::current_dir().map_err(|source| GenError::Io { path: ".".to_string(), source })?;
        Self::load_from_dir(options, &cwd)
    }

    /// Like [`Engine::new`], with `dir` standing in for the working directory.
    pub fn load_from_dir(mut options: Section, dir: &Path) -> Result<Self, GenError> {
        let name = match get_string(&options, OPT_GENSPEC_FILE) {
            Some(name) => name.to_string(),
            None => {
                let name = find_genspec(dir)?;
                options.insert(OPT_GENSPEC_FILE.to_string(), Value::String(name.clone()));
                name
            }
        };
        let base = dir.to_string_lossy();
        let source = FileRef::resolve(Some(&base), None, Some(&name));
        let genspec = load_genspec(&source)?;
        info!("loaded genspec {}", source);
        Ok(Self::with_genspec(options, genspec))
    }

    pub fn with_genspec(options: Section, genspec: Section) -> Self {
        Engine { options, genspec, generators: GeneratorRegistry::default() }
    }

    pub fn genspec(&self) -> &Section {
        &self.genspec
    }

    pub fn options(&self) -> &Section {
        &self.options
    }

    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    pub fn generators_mut(&mut self) -> &mut GeneratorRegistry {
        &mut self.generators
    }

    /// Merges the cascade for every generator entry of every selected target,
    /// in declaration order.
    pub fn resolve(&self) -> Vec<GeneratorEntry> {
        let global = get_map(&self.genspec, SECTION_GLOBAL);
        let global_opts = overlay(&get_map(&global, SECTION_OPTIONS), &self.options);
        let global_params = get_map(&global, SECTION_PARAMS);

        let requested = get_list(&global_opts, OPT_TARGET);
        let all = requested.is_empty() || requested.iter().any(|t| t.as_str() == Some(ALL_TARGETS));

        let mut entries = Vec::new();
        let targets = get_map(&self.genspec, SECTION_TARGETS);
        for (target_name, target) in &targets {
            if !all && !requested.iter().any(|t| t.as_str() == Some(target_name.as_str())) {
                continue;
            }
            let Value::Object(target) = target else {
                warn!("Target {} is not a section, skipping", target_name);
                continue;
            };
            let target_opts = overlay(&global_opts, &get_map(target, SECTION_OPTIONS));
            let target_params = overlay(&global_params, &get_map(target, SECTION_PARAMS));
            let target_helpers = get_map(target, SECTION_HELPERS);

            for (index, gen) in get_list(target, SECTION_GENERATORS).into_iter().enumerate() {
                let Value::Object(mut config) = gen else {
                    warn!("Generator {} is not a section, skipping", target_gen_id(target_name, index));
                    continue;
                };
                let opts = overlay(&target_opts, &get_map(&config, SECTION_OPTIONS));
                let params = overlay(&target_params, &get_map(&config, SECTION_PARAMS));
                let helpers = overlay(&target_helpers, &get_map(&config, SECTION_HELPERS));
                config.insert(SECTION_OPTIONS.to_string(), Value::Object(opts));
                config.insert(SECTION_PARAMS.to_string(), Value::Object(params));
                config.insert(SECTION_HELPERS.to_string(), Value::Object(helpers));
                entries.push(GeneratorEntry { target: target_name.clone(), index, config });
            }
        }
        entries
    }

    /// Runs each resolved entry in turn.
    ///
    /// Configuration errors skip the entry with a warning; backend errors are
    /// logged and the run moves on. A model or genspec that fails to compile
    /// ends the run.
    pub fn run(&self) -> Result<RunReport, GenError> {
        let mut report = RunReport::default();
        for entry in self.resolve() {
            let id = entry.id();
            let class = get_string(&entry.config, OPT_GENERATOR_CLASS);
            let Some(generator) = self.generators.create(class) else {
                let err = GenError::UnknownGenerator {
                    name: class.unwrap_or_default().to_string(),
                    id,
                    known: self.generators.names().collect::<Vec<_>>().join(", "),
                };
                error!("{} -- skipping", err);
                report.failed += 1;
                continue;
            };
            debug!("{} using {}", id, generator.name());
            match generator.generate(&entry.config, &entry.target, entry.index) {
                Ok(()) => report.succeeded += 1,
                Err(err) if err.is_fatal() => {
                    error!("Generation terminated at {}: {}", id, err);
                    return Err(err);
                }
                Err(err) if err.is_config() => {
                    warn!("{}", err);
                    report.skipped += 1;
                }
                Err(err) => {
                    error!("Generator {} failed: {}", id, err);
                    report.failed += 1;
                }
            }
        }
        info!(
            "generation finished: {} succeeded, {} skipped, {} failed",
            report.succeeded, report.skipped, report.failed
        );
        Ok(report)
    }
}

fn find_genspec(dir: &Path) -> Result<String, GenError> {
    let io_err = |source| GenError::Io { path: dir.display().to_string(), source };
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".gen") && entry.path().is_file() {
            found.push(name);
        }
    }
    match found.len() {
        1 => Ok(found.remove(0)),
        0 => Err(GenError::Genspec(format!(
            "No genspec file specified and none found in {}",
            dir.display()
        ))),
        n => Err(GenError::Genspec(format!(
            "No genspec file specified and {} found in {}",
            n,
            dir.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Generator;
    use brine_thrift_compiler::{parse_genspec, CompileError};
    use serde_json::{json, Map};

    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(String, usize, Section)>>>;

    struct Recorder {
        calls:  Calls,
        result: fn(&Section) -> Result<(), GenError>,
    }

    impl Generator for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn generate(&self, config: &Map<String, Value>, target: &str, index: usize) -> Result<(), GenError> {
            self.calls.lock().unwrap().push((target.to_string(), index, config.clone()));
            (self.result)(config)
        }
    }

    fn engine_with(options: Value, genspec: Value, result: fn(&Section) -> Result<(), GenError>) -> (Engine, Calls) {
        let calls: Calls = Arc::default();
        let mut engine = Engine::with_genspec(
            options.as_object().cloned().unwrap(),
            genspec.as_object().cloned().unwrap(),
        );
        let recorded = calls.clone();
        engine.generators_mut().register("template", move || {
            Box::new(Recorder { calls: recorded.clone(), result }) as Box<dyn Generator>
        });
        (engine, calls)
    }

    fn ok(_: &Section) -> Result<(), GenError> {
        Ok(())
    }

    fn effective(options: Value, target_opts: Value, gen_opts: Value) -> Value {
        let genspec = json!({
            "global": { "options": { "a": "1" } },
            "targets": {
                "t": {
                    "options": target_opts,
                    "generators": [{ "options": gen_opts }],
                },
            },
        });
        let (engine, _) = engine_with(options, genspec, ok);
        let entries = engine.resolve();
        assert_eq!(entries.len(), 1);
        entries[0].config["options"]["a"].clone()
    }

    #[test]
    fn test_cascade_precedence() {
        assert_eq!(effective(json!({ "a": "2" }), json!({}), json!({ "a": "3" })), json!("3"));
        assert_eq!(effective(json!({ "a": "2" }), json!({}), json!({})), json!("2"));
        assert_eq!(effective(json!({ "a": "2" }), json!({ "a": "4" }), json!({})), json!("4"));
        assert_eq!(effective(json!({}), json!({}), json!({})), json!("1"));
    }

    #[test]
    fn test_params_and_helpers_merge() {
        let genspec = parse_genspec(
            "test.gen",
            r#"
            global: { params: { copyright: ACME, year: 2024 } }
            targets: {
                rust: {
                    params: { year: 2025 }
                    helper_classes: { util: naming }
                    generators: [
                        { template: a.j2, params: { crate: shop } },
                        { template: b.j2, helper_classes: { util: other } },
                    ]
                }
            }
            "#,
        )
        .unwrap();
        let (engine, _) = engine_with(json!({}), Value::Object(genspec), ok);
        let entries = engine.resolve();
        assert_eq!(entries.len(), 2);

        let first = &entries[0].config;
        assert_eq!(first["template"], "a.j2");
        assert_eq!(first["params"], json!({ "copyright": "ACME", "year": "2025", "crate": "shop" }));
        // helpers start at the target tier
        assert_eq!(first["helper_classes"], json!({ "util": "naming" }));
        assert_eq!(entries[1].config["helper_classes"], json!({ "util": "other" }));
        assert_eq!(entries[1].id(), "rust[1]");
    }

    fn three_targets() -> Value {
        json!({
            "targets": {
                "java": { "generators": [{}] },
                "rust": { "generators": [{}, {}] },
                "go":   { "generators": [{}] },
            },
        })
    }

    fn selected(options: Value) -> Vec<String> {
        let (engine, calls) = engine_with(options, three_targets(), ok);
        engine.run().unwrap();
        let calls = calls.lock().unwrap();
        calls.iter().map(|(t, i, _)| format!("{}[{}]", t, i)).collect()
    }

    #[test]
    fn test_target_selection() {
        let every = vec!["java[0]", "rust[0]", "rust[1]", "go[0]"];
        assert_eq!(selected(json!({})), every);
        assert_eq!(selected(json!({ "target": ["all"] })), every);
        assert_eq!(selected(json!({ "target": ["go", "all"] })), every);
        assert_eq!(selected(json!({ "target": ["go", "java"] })), vec!["java[0]", "go[0]"]);
        assert_eq!(selected(json!({ "target": "rust" })), vec!["rust[0]", "rust[1]"]);
        assert!(selected(json!({ "target": ["cobol"] })).is_empty());
    }

    #[test]
    fn test_unknown_generator_continues() {
        let genspec = json!({
            "targets": {
                "t": { "generators": [{ "generator_class": "missing" }, {}] },
            },
        });
        let (engine, calls) = engine_with(json!({}), genspec, ok);
        let report = engine.run().unwrap();
        assert_eq!(report, RunReport { succeeded: 1, skipped: 0, failed: 1 });
        assert_eq!(calls.lock().unwrap()[0].1, 1);
    }

    #[test]
    fn test_config_and_backend_errors_continue() {
        fn by_template(config: &Section) -> Result<(), GenError> {
            match get_string(config, OPT_TEMPLATE) {
                Some("skip") => Err(GenError::Config("no model".to_string())),
                Some("fail") => Err(GenError::Backend("disk full".to_string())),
                _ => Ok(()),
            }
        }
        let genspec = json!({
            "targets": {
                "a": { "generators": [{ "template": "skip" }, { "template": "fail" }] },
                "b": { "generators": [{ "template": "ok" }] },
            },
        });
        let (engine, calls) = engine_with(json!({}), genspec, by_template);
        let report = engine.run().unwrap();
        assert_eq!(report, RunReport { succeeded: 1, skipped: 1, failed: 1 });
        assert_eq!(calls.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_fatal_error_stops_run() {
        fn fatal(_: &Section) -> Result<(), GenError> {
            Err(GenError::Compile(CompileError::ParseError {
                file:   "bad.thrift".to_string(),
                msg:    "Unexpected token".to_string(),
                line:   1,
                column: 1,
            }))
        }
        let (engine, calls) = engine_with(json!({}), three_targets(), fatal);
        assert!(engine.run().unwrap_err().is_fatal());
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_genspec_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Engine::load_from_dir(Map::new(), dir.path()).err().unwrap();
        assert!(matches!(missing, GenError::Genspec(ref msg) if msg.contains("none found")));

        fs::write(dir.path().join("only.gen"), "targets: { t: { generators: [ {} ] } }").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        let engine = Engine::load_from_dir(Map::new(), dir.path()).unwrap();
        assert_eq!(get_string(engine.options(), OPT_GENSPEC_FILE), Some("only.gen"));
        assert_eq!(engine.resolve().len(), 1);

        fs::write(dir.path().join("other.gen"), "{}").unwrap();
        let many = Engine::load_from_dir(Map::new(), dir.path()).err().unwrap();
        assert!(matches!(many, GenError::Genspec(ref msg) if msg.contains("2 found")));

        let mut options = Map::new();
        options.insert(OPT_GENSPEC_FILE.to_string(), json!("other.gen"));
        let engine = Engine::load_from_dir(options, dir.path()).unwrap();
        assert!(engine.resolve().is_empty());
    }
}
