//! Path -> allowed methods table

use std::collections::HashMap;

use http::Method;

use super::METHOD_SEPARATOR;

/// Allowed methods for one literal route path
///
/// `OPTIONS` is always the first method; the rest keep first-registration
/// order and never repeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCorsEntry {
    path: String,
    methods: Vec<Method>,
}

impl RouteCorsEntry {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_owned(),
            methods: vec![Method::OPTIONS],
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// Value for `Access-Control-Allow-Methods`, e.g. `OPTIONS,GET,POST`.
    pub fn allow_methods(&self) -> String {
        self.methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(METHOD_SEPARATOR)
    }

    fn push(&mut self, method: Method) -> bool {
        if self.contains(&method) {
            return false;
        }
        self.methods.push(method);
        true
    }
}

/// CORS table keyed by the literal path the router matches
#[derive(Debug, Clone, Default)]
pub struct CorsTable {
    entries: HashMap<String, RouteCorsEntry>,
}

impl CorsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `method` for `path`, creating the entry on first use.
    ///
    /// Returns `true` when the entry did not exist before this call.
    pub fn record(&mut self, path: &str, method: Method) -> bool {
        let created = !self.entries.contains_key(path);
        self.entries
            .entry(path.to_owned())
            .or_insert_with(|| RouteCorsEntry::new(path))
            .push(method);
        created
    }

    pub fn get(&self, path: &str) -> Option<&RouteCorsEntry> {
        self.entries.get(path)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by path.
    pub fn entries(&self) -> Vec<&RouteCorsEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }
}
