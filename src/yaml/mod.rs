//! YAML parsing with source-annotated errors

pub mod diagnostics;

pub use diagnostics::YamlSyntaxError;

use serde::de::DeserializeOwned;

/// Deserialize `source`, attaching `filename` and the error position on failure
pub fn parse_yaml_str<T: DeserializeOwned>(source: &str, filename: &str) -> Result<T, YamlSyntaxError> {
    serde_yml::from_str(source).map_err(|e| YamlSyntaxError::from_serde_error(&e, source, filename))
}
