//! Ambient configuration: the declaration dictionary, process-wide render
//! options, the `$name` string-variable table, and an optional `rib.toml`
//! loader (spec §4.1 support + `SPEC_FULL.md` ambient stack).

mod declarations;
mod file;
mod options;
mod variables;

pub use declarations::DeclarationTable;
pub use file::{apply_declarations, apply_options, load_from, ConfigFile, LoadedConfig};
pub use options::{ErrorHandlerKind, Options};
pub use variables::VariableTable;

/// Everything a render context needs from this crate, bundled for
/// convenience. `rib-dispatch`'s `Context` owns one of these.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub declarations: DeclarationTable,
    pub options: Options,
    pub variables: VariableTable,
}

impl RenderConfig {
    pub fn new() -> Self {
        Self {
            declarations: DeclarationTable::new(),
            options: Options::default(),
            variables: VariableTable::new(),
        }
    }

    pub fn from_loaded(loaded: &LoadedConfig) -> Self {
        let mut cfg = Self::new();
        apply_options(&mut cfg.options, &loaded.file.options);
        apply_declarations(&mut cfg.declarations, &loaded.file.declarations);
        cfg
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}
