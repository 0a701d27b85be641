//! Optional `rib.toml` loader. Mirrors the teacher's `core-config` shape:
//! a `#[serde(default)]`-tolerant file schema, a raw-string retained
//! alongside the parsed form, and a loader that degrades gracefully when the
//! file is absent.

use crate::declarations::DeclarationTable;
use crate::options::{ErrorHandlerKind, Options};
use anyhow::Result;
use rib_model::{BasicType, StorageClass};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct OptionsFile {
    #[serde(default)]
    pub color_samples: Option<usize>,
    #[serde(default)]
    pub error_handler: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DeclarationEntry {
    /// e.g. "uniform float roughness" minus the name, or "vertex point".
    pub spec: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub options: OptionsFile,
    /// name -> "[class] type[[N]]", e.g. `roughness = "uniform float"`.
    #[serde(default)]
    pub declarations: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub raw: Option<String>,
    pub file: ConfigFile,
}

/// Load a `rib.toml`-shaped file from `path`. Absence of the file is not an
/// error (returns the default config); malformed TOML is.
pub fn load_from(path: &Path) -> Result<LoadedConfig> {
    if !path.exists() {
        info!(target: "rib.config", path = %path.display(), "config file not found, using defaults");
        return Ok(LoadedConfig::default());
    }
    let raw = std::fs::read_to_string(path)?;
    let file: ConfigFile = toml::from_str(&raw)?;
    info!(target: "rib.config", path = %path.display(), "config file loaded");
    Ok(LoadedConfig {
        raw: Some(raw),
        file,
    })
}

/// Apply a loaded config's `[options]` section onto `Options`, falling back
/// to the defaults already present when a key is absent or unparseable.
pub fn apply_options(options: &mut Options, file: &OptionsFile) {
    if let Some(n) = file.color_samples {
        options.color_samples = n;
    }
    if let Some(kind) = file.error_handler.as_deref().and_then(ErrorHandlerKind::parse) {
        options.error_handler = kind;
    }
}

/// Merge a loaded config's `[declarations]` section into the dictionary.
/// Entries whose `spec` does not parse into `(class, type[, N])` are skipped
/// with a warning — a malformed config entry should not take down startup.
pub fn apply_declarations(table: &mut DeclarationTable, declarations: &HashMap<String, String>) {
    for (name, spec) in declarations {
        match parse_spec(spec) {
            Some((class, Declared::Color)) => table.declare_color(name, class),
            Some((class, Declared::Typed(ty, n))) => table.declare(name, class, ty, n),
            None => {
                tracing::warn!(
                    target: "rib.config",
                    name = %name,
                    spec = %spec,
                    "unrecognized declaration spec, skipped"
                );
            }
        }
    }
}

enum Declared {
    Typed(BasicType, usize),
    Color,
}

fn parse_spec(spec: &str) -> Option<(StorageClass, Declared)> {
    let tokens: Vec<&str> = spec.split_whitespace().collect();
    let (class_tok, type_tok) = match tokens.as_slice() {
        [class, ty] => (*class, *ty),
        [ty] => ("varying", *ty),
        _ => return None,
    };
    let class = StorageClass::parse(class_tok)?;
    let declared = match type_tok {
        "float" => Declared::Typed(BasicType::Float, 1),
        "integer" | "int" => Declared::Typed(BasicType::Integer, 1),
        "string" => Declared::Typed(BasicType::String, 1),
        "point" | "vector" | "normal" => Declared::Typed(BasicType::Float, 3),
        "hpoint" => Declared::Typed(BasicType::Float, 4),
        "matrix" => Declared::Typed(BasicType::Float, 16),
        "color" => Declared::Color,
        _ => return None,
    };
    Some((class, declared))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let cfg = load_from(&path).unwrap();
        assert!(cfg.raw.is_none());
        assert_eq!(cfg.file.options.color_samples, None);
    }

    #[test]
    fn parses_options_and_declarations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rib.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            "[options]\ncolor_samples = 4\nerror_handler = \"abort\"\n\n[declarations]\nroughness = \"uniform float\"\n"
        )
        .unwrap();
        let cfg = load_from(&path).unwrap();
        assert_eq!(cfg.file.options.color_samples, Some(4));

        let mut options = Options::default();
        apply_options(&mut options, &cfg.file.options);
        assert_eq!(options.color_samples, 4);
        assert_eq!(options.error_handler, ErrorHandlerKind::Abort);

        let mut table = DeclarationTable::new();
        apply_declarations(&mut table, &cfg.file.declarations);
        let decl = table.resolve("roughness").unwrap();
        assert_eq!(decl.storage_class, StorageClass::Uniform);
    }
}
