//! Configuration files that document themselves.
//!
//! Every field is written as `name = value  # description`. Unset optional
//! fields are written commented out with their default, so the file doubles
//! as a reference of what can be configured.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// One line of a documented config file.
#[derive(Debug, Clone)]
pub struct DocumentedField {
    pub name: &'static str,
    pub description: &'static str,
    /// Rendered TOML value; `None` when the value has no TOML form.
    pub value: Option<String>,
    /// False for an optional field left unset.
    pub set: bool,
}

/// Render a value the way it appears on the right of `name = `.
pub fn toml_value<T: Serialize + ?Sized>(value: &T) -> Option<String> {
    toml::Value::try_from(value).ok().map(|v| v.to_string())
}

/// Implemented through the `documented_config!` macro.
pub trait DocumentedConfig {
    fn documented_fields(&self) -> Vec<DocumentedField>;

    fn config_path() -> Result<PathBuf>;

    fn to_documented_toml(&self) -> String {
        let mut out = String::new();
        for field in self.documented_fields() {
            let Some(value) = field.value else {
                continue;
            };
            let prefix = if field.set { "" } else { "# " };
            let _ = writeln!(out, "{prefix}{} = {value}  # {}", field.name, field.description);
        }
        out
    }

    fn save_with_documentation(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        fs::write(path, self.to_documented_toml())
            .with_context(|| format!("writing config to {}", path.display()))
    }
}

#[macro_export]
macro_rules! documented_config {
    (
        $config_name:ident {
            fields: [
                $($field:ident, $desc:expr),* $(,)?
            ],
            optional: [
                $($opt_field:ident, $opt_desc:expr),* $(,)?
            ],
            config_path: $path:expr $(,)?
        }
    ) => {
        impl $crate::common::config::DocumentedConfig for $config_name {
            fn documented_fields(&self) -> Vec<$crate::common::config::DocumentedField> {
                let mut fields = Vec::new();
                $(
                    fields.push($crate::common::config::DocumentedField {
                        name: stringify!($field),
                        description: $desc,
                        value: $crate::common::config::toml_value(&self.$field),
                        set: true,
                    });
                )*
                $(
                    // unset optionals show the inner type's default
                    let shown = self.$opt_field.clone().unwrap_or_default();
                    fields.push($crate::common::config::DocumentedField {
                        name: stringify!($opt_field),
                        description: $opt_desc,
                        value: $crate::common::config::toml_value(&shown),
                        set: self.$opt_field.is_some(),
                    });
                )*
                fields
            }

            fn config_path() -> anyhow::Result<std::path::PathBuf> {
                $path
            }
        }
    };
}
