use crate::ident::is_go_keyword;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

lazy_static! {
    static ref GO_NAME_REGEX: Regex = Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    static ref PACKAGE_NAME_INVALID: Regex = Regex::new("[^A-Za-z0-9_]").unwrap();
}

/// A Go identifier together with the import path of the package declaring it.
///
/// `import_path: None` means the identifier lives in the package being generated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoIdent {
    pub go_name: String,

    #[serde(default)]
    pub import_path: Option<String>,
}

impl GoIdent {
    pub fn local(go_name: impl Into<String>) -> Self {
        Self {
            go_name: go_name.into(),
            import_path: None,
        }
    }

    pub fn new(import_path: impl Into<String>, go_name: impl Into<String>) -> Self {
        Self {
            go_name: go_name.into(),
            import_path: Some(import_path.into()),
        }
    }

    /// Whether the name can be printed as a Go type name.
    pub fn is_nameable(&self) -> bool {
        GO_NAME_REGEX.is_match(&self.go_name)
            && self
                .import_path
                .as_deref()
                .map(|path| !path.trim().is_empty())
                .unwrap_or(true)
    }
}

/// Last element of an import path, the name Go binds an unaliased import to
fn last_segment(import_path: &str) -> &str {
    import_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(import_path)
}

/// Derive the package name Go code uses for an import path: the last path
/// segment with characters invalid in an identifier replaced by `_`.
pub fn package_name(import_path: &str) -> String {
    let mut name = PACKAGE_NAME_INVALID
        .replace_all(last_segment(import_path), "_")
        .into_owned();
    if name.is_empty()
        || name.starts_with(|c: char| c.is_ascii_digit())
        || is_go_keyword(&name)
    {
        name.insert(0, '_');
    }
    name
}

/// Tracks the packages referenced by a generated file and the local name
/// each one is bound to.
#[derive(Debug)]
pub struct Imports {
    /// Import path of the package being generated; its identifiers are never qualified
    local: Option<String>,

    /// import path => package name
    by_path: BTreeMap<String, String>,

    /// names already bound in this file, packages and reserved declarations
    used_names: HashSet<String>,
}

impl Imports {
    pub fn new(local: Option<String>) -> Self {
        Self {
            local,
            by_path: BTreeMap::new(),
            used_names: HashSet::new(),
        }
    }

    /// Return the name used to refer to `ident` from the generated file,
    /// recording its import if needed.
    pub fn qualify(&mut self, ident: &GoIdent) -> String {
        match ident.import_path.as_deref() {
            Some(path) if Some(path) != self.local.as_deref() => {
                format!("{}.{}", self.package(path), ident.go_name)
            }
            _ => ident.go_name.clone(),
        }
    }

    /// Return the package name bound to `import_path`, binding a fresh one on
    /// first use. Clashing names get a numeric suffix.
    pub fn package(&mut self, import_path: &str) -> String {
        if let Some(name) = self.by_path.get(import_path) {
            return name.clone();
        }

        let base = package_name(import_path);
        let mut name = base.clone();
        let mut i = 1;
        while self.used_names.contains(&name) {
            name = format!("{}{}", base, i);
            i += 1;
        }

        self.used_names.insert(name.clone());
        self.by_path.insert(import_path.to_string(), name.clone());
        name
    }

    /// Keep `name` away from packages bound afterwards; it is declared at
    /// package level by the generated file.
    pub fn reserve(&mut self, name: &str) {
        self.used_names.insert(name.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Import specs sorted by path, e.g. `"errors"` or `kite1 "a/kite"`.
    ///
    /// The alias is omitted only when Go would bind the same name by itself.
    pub fn specs(&self) -> Vec<String> {
        self.by_path
            .iter()
            .map(|(path, name)| match name == last_segment(path) {
                true => format!("\"{}\"", path),
                false => format!("{} \"{}\"", name, path),
            })
            .collect()
    }
}
