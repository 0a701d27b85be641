//! The declaration dictionary: built-in standard names plus whatever the
//! host or the RIB stream (via `Declare`) adds at runtime (spec §4.1).

use rib_model::{BasicType, Declaration, StorageClass};
use std::collections::HashMap;

/// Name resolution order (spec §4.1): inline type expression in the name,
/// then a previously declared name (possibly qualified `entity:table:name`),
/// then the built-in standard name.
#[derive(Debug, Clone)]
pub struct DeclarationTable {
    user: HashMap<String, Declaration>,
    standard: HashMap<String, Declaration>,
}

impl DeclarationTable {
    pub fn new() -> Self {
        Self {
            user: HashMap::new(),
            standard: standard_declarations(),
        }
    }

    /// Implements the `Declare` request: registers (or overwrites) a name in
    /// the user table.
    pub fn declare(&mut self, name: &str, storage_class: StorageClass, basic_type: BasicType, elements_per_component: usize) {
        self.user.insert(
            name.to_string(),
            Declaration::new(name, storage_class, basic_type, elements_per_component),
        );
    }

    pub fn declare_color(&mut self, name: &str, storage_class: StorageClass) {
        self.user
            .insert(name.to_string(), Declaration::color(name, storage_class));
    }

    /// Merge extra declarations loaded from a config file (spec §4.1 "built-in
    /// standard name" resolution also consults a host-supplied table).
    pub fn merge_user(&mut self, extra: impl IntoIterator<Item = Declaration>) {
        for decl in extra {
            self.user.insert(decl.name.clone(), decl);
        }
    }

    /// Resolve a raw parameter-list key, which may be:
    /// - an inline type expression, e.g. `"uniform float foo"` or `"float[3] bar"`,
    /// - a qualified reference, e.g. `"object:mytable:name"` (the final
    ///   segment names a previously-declared entry),
    /// - a bare name previously declared via `Declare` or a standard name.
    pub fn resolve(&self, raw: &str) -> Option<Declaration> {
        if let Some(decl) = parse_inline(raw) {
            return Some(decl);
        }
        let key = raw.rsplit(':').next().unwrap_or(raw);
        self.user
            .get(key)
            .or_else(|| self.standard.get(key))
            .cloned()
    }
}

impl Default for DeclarationTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `[class] type[[N]] name`. Returns `None` if `raw` is a bare name
/// (no embedded type expression) so the caller falls through to table
/// lookup.
fn parse_inline(raw: &str) -> Option<Declaration> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let name = *tokens.last().unwrap();
    let mut rest = &tokens[..tokens.len() - 1];

    let mut storage_class = StorageClass::Varying;
    let mut has_class = false;
    if let Some(first) = rest.first() {
        if let Some(c) = StorageClass::parse(first) {
            storage_class = c;
            has_class = true;
            rest = &rest[1..];
        }
    }
    if rest.len() != 1 {
        return None;
    }
    let (type_word, array_len) = split_array_suffix(rest[0]);
    let (basic_type, default_components, is_color) = match type_word {
        "float" => (BasicType::Float, 1, false),
        "integer" | "int" => (BasicType::Integer, 1, false),
        "string" => (BasicType::String, 1, false),
        "point" | "vector" | "normal" => (BasicType::Float, 3, false),
        "hpoint" => (BasicType::Float, 4, false),
        "matrix" => (BasicType::Float, 16, false),
        "color" => (BasicType::Float, 3, true),
        _ => return None,
    };
    // A bare type word with no explicit class, no array suffix, and a
    // "plain-looking" name token list of length 1 could still be a
    // legitimate 2-token inline decl (e.g. "float amplitude"); `has_class`
    // is not required for a match.
    let _ = has_class;
    let components = array_len.unwrap_or(default_components);
    if is_color {
        Some(Declaration::color(name, storage_class))
    } else {
        Some(Declaration::new(name, storage_class, basic_type, components))
    }
}

fn split_array_suffix(word: &str) -> (&str, Option<usize>) {
    if let Some(open) = word.find('[') {
        if let Some(close) = word.find(']') {
            if close > open {
                let n: Option<usize> = word[open + 1..close].parse().ok();
                return (&word[..open], n);
            }
        }
    }
    (word, None)
}

/// The RenderMan Interface standard parameter names this front-end
/// recognizes out of the box. Not exhaustive — a complete implementation
/// would mirror the full RISpec appendix; this covers the parameters
/// exercised by the request handlers in `rib-dispatch`.
fn standard_declarations() -> HashMap<String, Declaration> {
    let mut m = HashMap::new();
    let mut put = |d: Declaration| {
        m.insert(d.name.clone(), d);
    };
    put(Declaration::new("P", StorageClass::Vertex, BasicType::Float, 3));
    put(Declaration::new("Pz", StorageClass::Vertex, BasicType::Float, 1));
    put(Declaration::new("Pw", StorageClass::Vertex, BasicType::Float, 4));
    put(Declaration::new("N", StorageClass::Varying, BasicType::Float, 3));
    put(Declaration::color("Cs", StorageClass::Varying));
    put(Declaration::color("Os", StorageClass::Varying));
    put(Declaration::new("st", StorageClass::FaceVarying, BasicType::Float, 2));
    put(Declaration::new("s", StorageClass::FaceVarying, BasicType::Float, 1));
    put(Declaration::new("t", StorageClass::FaceVarying, BasicType::Float, 1));
    put(Declaration::new("width", StorageClass::Varying, BasicType::Float, 1));
    put(Declaration::new(
        "constantwidth",
        StorageClass::Constant,
        BasicType::Float,
        1,
    ));
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_standard_name() {
        let t = DeclarationTable::new();
        let decl = t.resolve("P").unwrap();
        assert_eq!(decl.storage_class, StorageClass::Vertex);
        assert_eq!(decl.elements_per_component, 3);
    }

    #[test]
    fn parses_inline_type_expression() {
        let t = DeclarationTable::new();
        let decl = t.resolve("uniform float roughness").unwrap();
        assert_eq!(decl.name, "roughness");
        assert_eq!(decl.storage_class, StorageClass::Uniform);
        assert_eq!(decl.basic_type, BasicType::Float);
    }

    #[test]
    fn parses_inline_array_suffix() {
        let t = DeclarationTable::new();
        let decl = t.resolve("float[3] offset").unwrap();
        assert_eq!(decl.elements_per_component, 3);
    }

    #[test]
    fn declare_adds_to_user_table() {
        let mut t = DeclarationTable::new();
        t.declare("roughness", StorageClass::Constant, BasicType::Float, 1);
        let decl = t.resolve("roughness").unwrap();
        assert_eq!(decl.storage_class, StorageClass::Constant);
    }

    #[test]
    fn qualified_lookup_uses_final_segment() {
        let mut t = DeclarationTable::new();
        t.declare("name", StorageClass::Constant, BasicType::String, 1);
        let decl = t.resolve("object:mytable:name").unwrap();
        assert_eq!(decl.name, "name");
    }
}
