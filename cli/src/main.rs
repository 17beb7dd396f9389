use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use brine_thrift::options::{
    OPT_BASE_INPUT_DIR, OPT_BASE_OUTPUT_DIR, OPT_CHARSET, OPT_GENSPEC_FILE, OPT_MODEL_FILE, OPT_TARGET,
};
use brine_thrift::{Engine, GenError, Section};

#[derive(Parser)]
#[command(name = "bthrift", version)]
#[command(about = "Generate code from Thrift IDL models using a genspec", long_about = None)]
struct Cli {
    /// Thrift IDL file (e.g. <modelname>.thrift), path or URL
    #[arg(short, long, value_name = "PATH_OR_URL")]
    model: Option<String>,

    /// Generation specification file (<name>.gen); defaults to the only .gen file here
    #[arg(short, long, value_name = "PATH_OR_URL")]
    genspec: Option<String>,

    /// Base output directory
    #[arg(short, long, value_name = "PATH")]
    outdir: Option<String>,

    /// Base template directory
    #[arg(short, long, value_name = "PATH_OR_URL")]
    indir: Option<String>,

    /// Output charset (only UTF-8 is supported)
    #[arg(short, long)]
    charset: Option<String>,

    /// Genspec target(s) to execute; `all` runs every target
    #[arg(short, long, num_args = 1..)]
    target: Vec<String>,

    /// Only report warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Options given on the command line, keyed the way a genspec names them.
    fn options(&self) -> Section {
        let mut options = Section::new();
        let flags = [
            (OPT_MODEL_FILE, &self.model),
            (OPT_GENSPEC_FILE, &self.genspec),
            (OPT_BASE_OUTPUT_DIR, &self.outdir),
            (OPT_BASE_INPUT_DIR, &self.indir),
            (OPT_CHARSET, &self.charset),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                options.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        if !self.target.is_empty() {
            let targets = self.target.iter().cloned().map(Value::String).collect();
            options.insert(OPT_TARGET.to_string(), Value::Array(targets));
        }
        options
    }
}

fn main() -> Result<(), GenError> {
    let cli = Cli::parse();

    let level = if cli.quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let report = Engine::new(cli.options())?.run()?;
    if report.failed > 0 || report.skipped > 0 {
        tracing::warn!(
            "{} generator(s) failed and {} were skipped",
            report.failed,
            report.skipped
        );
    }
    Ok(())
}
