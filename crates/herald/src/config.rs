use crate::error::HeraldError;
use serde::Deserialize;
use typed_builder::TypedBuilder;

const DEFAULT_LABEL: &str = "emitter";

/// Options of an [`Emitter`](crate::Emitter).
///
/// Deserializable with every field optional, or built in code:
///
/// ```rust
/// use herald::EmitterConfig;
///
/// let config = EmitterConfig::builder().label("person").catch_panics(false).build();
/// assert_eq!(config.label, "person");
/// assert!(config.log_failures);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, TypedBuilder)]
#[serde(default)]
pub struct EmitterConfig {
    /// Name attached to this emitter's trace events.
    #[builder(default = DEFAULT_LABEL.to_owned(), setter(into))]
    pub label: String,
    /// Catch listener panics at the listener boundary. When off, a panicking
    /// listener unwinds through `emit`.
    #[builder(default = true)]
    pub catch_panics: bool,
    /// Log listener failures at `warn` level. The error sink runs either way.
    #[builder(default = true)]
    pub log_failures: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self { label: DEFAULT_LABEL.to_owned(), catch_panics: true, log_failures: true }
    }
}

impl EmitterConfig {
    /// Checks the options.
    ///
    /// # Errors
    /// Returns [`HeraldError::InvalidConfiguration`] if the label is blank.
    pub fn validate(&self) -> Result<(), HeraldError> {
        if self.label.trim().is_empty() {
            return Err(HeraldError::InvalidConfiguration {
                message: "label cannot be empty".into(),
                context: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeraldErrorExt;

    #[test]
    fn defaults_are_sane() {
        let config = EmitterConfig::default();
        assert_eq!(config.label, "emitter");
        assert!(config.catch_panics);
        assert!(config.log_failures);
        assert_eq!(config, EmitterConfig::builder().build());
    }

    #[test]
    fn partial_documents_fill_in_defaults() {
        let config: EmitterConfig =
            serde_json::from_value(serde_json::json!({ "label": "spinbox" })).unwrap();
        assert_eq!(config.label, "spinbox");
        assert!(config.catch_panics);

        let config: EmitterConfig = toml::from_str("catch_panics = false").unwrap();
        assert_eq!(config.label, "emitter");
        assert!(!config.catch_panics);
    }

    #[test]
    fn blank_labels_are_rejected_with_context() {
        let config = EmitterConfig::builder().label("   ").build();
        let err = config.validate().context("loading person emitter").unwrap_err();
        assert!(matches!(err, HeraldError::InvalidConfiguration { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid emitter configuration (loading person emitter): label cannot be empty"
        );
    }
}
