use crate::error::GenError;
use serde_json::{Map, Value};

/// A rendering backend.
///
/// `config` is one generator entry of the genspec with its `options`,
/// `params` and `helper_classes` sections already merged with the global
/// and target tiers. `target` and `index` identify the entry in
/// diagnostics. The backend performs its own output.
pub trait Generator {
    fn name(&self) -> &str;

    fn generate(&self, config: &Map<String, Value>, target: &str, index: usize) -> Result<(), GenError>;
}
