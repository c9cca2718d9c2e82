//! Named symbols and process-unique nonce symbols.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_NONCE: AtomicU32 = AtomicU32::new(0);

/// A scalar symbolic atom.
///
/// Named symbols compare by name, so two `Symbol::new("x")` are the same
/// variable. Nonce symbols carry a fresh id and never equal any other symbol.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    name: Arc<str>,
    nonce: Option<u32>,
}

impl Symbol {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            nonce: None,
        }
    }

    /// A fresh symbol distinct from every symbol created before it.
    pub fn nonce() -> Self {
        let id = NEXT_NONCE.fetch_add(1, Ordering::Relaxed);
        Self {
            name: Arc::from("_nonce"),
            nonce: Some(id),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_nonce(&self) -> bool {
        self.nonce.is_some()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.nonce {
            Some(id) => write!(f, "{}{}", self.name, id),
            None => f.write_str(&self.name),
        }
    }
}

/// Create symbols from a whitespace or comma separated list of names.
pub fn symbols(names: &str) -> Vec<Symbol> {
    names
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|name| !name.is_empty())
        .map(Symbol::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Symbol, symbols};

    #[test]
    fn named_symbols_compare_by_name() {
        assert_eq!(Symbol::new("x"), Symbol::new("x"));
        assert_ne!(Symbol::new("x"), Symbol::new("y"));
        assert!(Symbol::new("x1") < Symbol::new("x2"));
    }

    #[test]
    fn nonce_symbols_are_unique() {
        let a = Symbol::nonce();
        let b = Symbol::nonce();
        assert_ne!(a, b);
        assert!(a.is_nonce());
        assert_ne!(a, Symbol::new("_nonce"));
    }

    #[test]
    fn symbols_splits_names() {
        let names = symbols("x1 x2, x3")
            .iter()
            .map(|s| s.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["x1", "x2", "x3"]);
    }
}
