use crate::{
    error::GenError,
    naming::{decamel, ucamel},
    options::*,
    registry::HelperRegistry,
    traits::Generator,
    view::{enum_view, struct_view, ModelView, ServiceView},
};
use brine_thrift_compiler::{load_model, source::is_absolute_path, FileRef};
use brine_thrift_schema::{Model, ModelSet};
use minijinja::{Environment, Value as TemplateValue};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What a template is rendered for: once per model, or once per
/// declaration of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iterate {
    None,
    Struct,
    Union,
    Enum,
    Service,
}

impl FromStr for Iterate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Iterate::None),
            "struct" => Ok(Iterate::Struct),
            "union" => Ok(Iterate::Union),
            "enum" => Ok(Iterate::Enum),
            "service" => Ok(Iterate::Service),
            other => Err(other.to_string()),
        }
    }
}

impl Iterate {
    fn key(&self) -> &'static str {
        match self {
            Iterate::None => "model",
            Iterate::Struct => "struct",
            Iterate::Union => "union",
            Iterate::Enum => "enum",
            Iterate::Service => "service",
        }
    }
}

/// Builds output file names from declaration names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNaming {
    pub underscore: bool,
    pub prefix:     String,
    pub suffix:     String,
    /// Without a leading dot. Empty means no extension.
    pub extension:  String,
}

impl FileNaming {
    /// Reads the `filename_*` keys from the entry, falling back to its options.
    pub fn from_config(config: &Section, opts: &Section) -> Self {
        let lookup = |key: &str| get_string(config, key).or_else(|| get_string(opts, key)).unwrap_or("");
        let extension = lookup(OPT_FILENAME_EXTENSION);
        FileNaming {
            underscore: lookup(OPT_FILENAME_CASE) == "underscore_case",
            prefix:     lookup(OPT_FILENAME_PREFIX).to_string(),
            suffix:     lookup(OPT_FILENAME_SUFFIX).to_string(),
            extension:  extension.strip_prefix('.').unwrap_or(extension).to_string(),
        }
    }

    pub fn base_name(&self, name: &str) -> String {
        let name = if self.underscore { decamel(name) } else { ucamel(name) };
        format!("{}{}{}", self.prefix, name, self.suffix)
    }

    pub fn file_name(&self, base_name: &str) -> String {
        if self.extension.is_empty() {
            base_name.to_string()
        } else {
            format!("{}.{}", base_name, self.extension)
        }
    }
}

/// Computes the directory a model's files are written to. Nothing is created.
///
/// `output_dir` is appended to `base_output_dir` unless it is absolute. When
/// a `namespace` option names a generator, the model's namespace for it
/// adds one directory per dotted segment.
pub fn output_dir(opts: &Section, model: &Model) -> PathBuf {
    let mut dir = match (get_string(opts, OPT_BASE_OUTPUT_DIR), get_string(opts, OPT_OUTPUT_DIR)) {
        (Some(base), Some(sub)) if !is_absolute_path(sub) => {
            let base = base.trim_end_matches(['/', '\\']);
            format!("{}/{}", base, sub)
        }
        (_, Some(sub)) => sub.to_string(),
        (Some(base), None) => base.to_string(),
        (None, None) => String::new(),
    };
    while dir.len() > 1 && (dir.ends_with('/') || dir.ends_with('\\')) {
        dir.pop();
    }
    let ns = get_string(opts, OPT_NAMESPACE).and_then(|generator| model.namespace(generator));
    if let Some(ns) = ns {
        if !dir.is_empty() && !dir.ends_with('/') {
            dir.push('/');
        }
        dir.push_str(&ns.replace('.', "/"));
    }
    if dir.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(dir)
    }
}

fn is_utf8(charset: &str) -> bool {
    let normalized: String = charset
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_ascii_uppercase();
    normalized == "UTF8"
}

/// The built-in backend: renders one minijinja template against the model,
/// either once or once per struct, union, enum or service.
pub struct TemplateGenerator {
    helpers: HelperRegistry,
}

impl TemplateGenerator {
    pub fn new(helpers: HelperRegistry) -> Self {
        TemplateGenerator { helpers }
    }
}

impl Generator for TemplateGenerator {
    fn name(&self) -> &str {
        "Template-based generator"
    }

    fn generate(&self, config: &Map<String, Value>, target: &str, index: usize) -> Result<(), GenError> {
        let id = target_gen_id(target, index);
        let opts = get_map(config, SECTION_OPTIONS);

        let model_ref = FileRef::resolve(None, None, get_string(&opts, OPT_MODEL_FILE));
        if model_ref.is_empty() {
            return Err(GenError::Config(format!("No model_file defined for target {}", id)));
        }
        let template_ref = FileRef::resolve(
            get_string(&opts, OPT_BASE_INPUT_DIR),
            get_string(&opts, OPT_INPUT_DIR),
            get_string(config, OPT_TEMPLATE),
        );
        if template_ref.is_empty() {
            return Err(GenError::Config(format!("No template defined for target {}", id)));
        }
        let iterate = get_string_or(config, OPT_ITERATE, "none");
        let iterate = Iterate::from_str(iterate)
            .map_err(|mode| GenError::Config(format!("Invalid iterate type {} for target {}", mode, id)))?;
        let charset = get_string_or(&opts, OPT_CHARSET, "UTF-8");
        if !is_utf8(charset) {
            return Err(GenError::Config(format!("Unsupported output_charset {} for target {}", charset, id)));
        }
        let filename = get_string(config, OPT_FILENAME);
        if iterate == Iterate::None && filename.is_none() {
            return Err(GenError::Config(format!("No filename specified for iterate:none for target {}", id)));
        }

        let mut set = ModelSet::new();
        let model = load_model(&mut set, &model_ref)?;

        let dir = output_dir(&opts, &model);
        fs::create_dir_all(&dir).map_err(|source| GenError::Io { path: dir.display().to_string(), source })?;

        let source = template_ref.read_to_string().map_err(|e| {
            GenError::Backend(format!("Error reading template {} for target {}: {}", template_ref, id, e))
        })?;
        let template_name = template_ref.file_name().unwrap_or_else(|| OPT_TEMPLATE.to_string());

        let mut env = Environment::new();
        let mut installed = BTreeMap::new();
        for (key, helper) in &get_map(config, SECTION_HELPERS) {
            let name = helper.as_str().unwrap_or_default();
            match self.helpers.get(name) {
                Some(install) => {
                    install(&mut env);
                    installed.insert(key.clone(), name.to_string());
                }
                None => warn!("Error loading helper class {} for target {}", helper, id),
            }
        }
        env.add_template(&template_name, &source)?;
        let template = env.get_template(&template_name)?;

        let mut ctx = BTreeMap::new();
        ctx.insert("model", TemplateValue::from_serialize(ModelView::from(&*model)));
        ctx.insert("params", TemplateValue::from_serialize(get_map(config, SECTION_PARAMS)));
        ctx.insert("helpers", TemplateValue::from_serialize(&installed));

        let naming = FileNaming::from_config(config, &opts);
        let items: Vec<(String, TemplateValue)> = match iterate {
            Iterate::None => vec![(String::new(), TemplateValue::UNDEFINED)],
            Iterate::Struct | Iterate::Union => model
                .structs()
                .iter()
                .filter(|ty| ty.is_union() == (iterate == Iterate::Union))
                .filter_map(|ty| Some((ty.name().to_string(), TemplateValue::from_serialize(struct_view(ty)?))))
                .collect(),
            Iterate::Enum => model
                .enums()
                .iter()
                .filter_map(|ty| Some((ty.name().to_string(), TemplateValue::from_serialize(enum_view(ty)?))))
                .collect(),
            Iterate::Service => model
                .services()
                .iter()
                .map(|svc| (svc.name().to_string(), TemplateValue::from_serialize(ServiceView::from(&**svc))))
                .collect(),
        };

        let mut failed = 0;
        for (name, item) in items {
            let (file_name, base_name) = match (iterate, filename) {
                (Iterate::None, Some(file)) => {
                    let base = match file.rfind('.') {
                        Some(i) if i > 0 => &file[..i],
                        _ => file,
                    };
                    (file.to_string(), base.to_string())
                }
                _ => {
                    let base = naming.base_name(&name);
                    (naming.file_name(&base), base)
                }
            };
            if iterate != Iterate::None {
                ctx.insert(iterate.key(), item);
            }
            ctx.insert("filename", TemplateValue::from(file_name.as_str()));
            ctx.insert("base_name", TemplateValue::from(base_name.as_str()));

            let path = dir.join(&file_name);
            match write_output(&template, &ctx, &path) {
                Ok(()) => info!("{} wrote {}", id, path.display()),
                Err(err) => {
                    failed += 1;
                    error!("Error creating {} output file {} for target {}: {}", iterate.key(), path.display(), id, err);
                }
            }
        }
        debug!("{} rendered {} with {} failure(s)", id, template_name, failed);

        if failed > 0 {
            return Err(GenError::Backend(format!("{} output file(s) failed for target {}", failed, id)));
        }
        Ok(())
    }
}

fn write_output(
    template: &minijinja::Template<'_, '_>,
    ctx: &BTreeMap<&str, TemplateValue>,
    path: &Path,
) -> Result<(), GenError> {
    let rendered = template.render(ctx)?;
    fs::write(path, rendered).map_err(|source| GenError::Io { path: path.display().to_string(), source })
}
