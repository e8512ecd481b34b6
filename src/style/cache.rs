use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::foundation::value::Value;
use crate::style::primitives::StyleSet;

/// A cached style set. Patches mutate it in place, so every holder sees the latest values.
pub type SharedStyleSet = Rc<RefCell<StyleSet>>;

/// Style sets by cache key. Unbounded and never evicted: keys are expected to enumerate a
/// small set of feature classes, not individual features.
#[derive(Debug, Default)]
pub struct StyleCache {
    entries: HashMap<String, SharedStyleSet>,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the set cached under `key`'s string form, building and storing it on a miss.
    ///
    /// `build` receives the string key.
    pub fn resolve<F>(&mut self, key: &Value, build: F) -> SharedStyleSet
    where
        F: FnOnce(&str) -> StyleSet,
    {
        let key = key.to_js_string();
        if let Some(hit) = self.entries.get(&key) {
            return Rc::clone(hit);
        }
        let set = Rc::new(RefCell::new(build(&key)));
        self.entries.insert(key, Rc::clone(&set));
        set
    }

    pub fn contains(&self, key: &Value) -> bool {
        self.entries.contains_key(&key.to_js_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/cache.rs"]
mod tests;
