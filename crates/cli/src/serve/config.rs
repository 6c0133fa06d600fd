//! Serve config: which form documents to expose, with their access
//! tokens and activation flags.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ServeConfig {
    #[serde(default)]
    pub forms: Vec<FormEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FormEntry {
    /// Path to the form schema JSON document.
    pub path: PathBuf,
    /// Access token clients must present for this form.
    pub token: String,
    /// Deactivated forms respond 410 to reads and submissions.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

pub(crate) fn load_config(path: &Path) -> Result<ServeConfig, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("error reading config '{}': {}", path.display(), e))?;
    toml::from_str(&text).map_err(|e| format!("error parsing config '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_entries() {
        let config: ServeConfig = toml::from_str(
            r#"
            [[forms]]
            path = "forms/commercial-auto.json"
            token = "tok_4f9a2c81"

            [[forms]]
            path = "forms/general-liability.json"
            token = "tok_77aa01bc"
            active = false
            "#,
        )
        .unwrap();

        assert_eq!(config.forms.len(), 2);
        assert!(config.forms[0].active);
        assert!(!config.forms[1].active);
        assert_eq!(config.forms[1].token, "tok_77aa01bc");
    }

    #[test]
    fn rejects_unknown_keys() {
        let result: Result<ServeConfig, _> = toml::from_str(
            r#"
            [[forms]]
            path = "a.json"
            token = "t"
            colour = "red"
            "#,
        );
        assert!(result.is_err());
    }
}
