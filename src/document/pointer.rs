use std::fmt;

/// One step of a [`Pointer`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

impl Segment {
    /// Array index addressed by this segment; textual keys that parse as integers qualify.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(k) => k.parse().ok(),
        }
    }

    pub fn as_key(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Self::Key(k) => std::borrow::Cow::Borrowed(k),
            Self::Index(i) => std::borrow::Cow::Owned(i.to_string()),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// `/`-delimited path of keys and indices from the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pointer(Vec<Segment>);

impl Pointer {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse `/a/0/b`. A leading `#` (fragment form) is accepted and ignored.
    pub fn parse(s: &str) -> Self {
        let s = s.strip_prefix('#').unwrap_or(s);
        let s = s.trim_start_matches('/');
        if s.is_empty() {
            return Self::root();
        }
        Self(s.split('/').map(|k| Segment::Key(k.to_owned())).collect())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, seg: Segment) -> Self {
        let mut out = self.0.clone();
        out.push(seg);
        Self(out)
    }

    pub fn key(&self, key: &str) -> Self {
        self.child(Segment::Key(key.to_owned()))
    }

    /// Plain key/index traversal from `root`.
    pub fn get<'a>(&self, root: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
        self.0.iter().try_fold(root, |node, seg| match node {
            serde_json::Value::Object(map) => map.get(seg.as_key().as_ref()),
            serde_json::Value::Array(items) => seg.as_index().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for seg in &self.0 {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

/// Collect every `(pointer, value)` under `value` that satisfies `predicate`.
///
/// Depth-first, in document order. Matched nodes are not descended into. Arrays are only
/// walked when their first element is truthy; an empty or falsy-headed array is a leaf.
pub fn collect<'a, F>(value: &'a serde_json::Value, predicate: F) -> Vec<(Pointer, &'a serde_json::Value)>
where
    F: Fn(&serde_json::Value) -> bool,
{
    let mut out = Vec::new();
    let mut path = Vec::new();
    walk(value, &predicate, &mut path, &mut out);
    out
}

fn walk<'a, F>(
    value: &'a serde_json::Value,
    predicate: &F,
    path: &mut Vec<Segment>,
    out: &mut Vec<(Pointer, &'a serde_json::Value)>,
) where
    F: Fn(&serde_json::Value) -> bool,
{
    if value.is_null() {
        return;
    }
    if predicate(value) {
        out.push((Pointer(path.clone()), value));
        return;
    }
    match value {
        serde_json::Value::Array(items) if items.first().is_some_and(json_truthy) => {
            for (i, item) in items.iter().enumerate() {
                path.push(Segment::Index(i));
                walk(item, predicate, path, out);
                path.pop();
            }
        }
        serde_json::Value::Object(map) => {
            for (k, item) in map {
                path.push(Segment::Key(k.clone()));
                walk(item, predicate, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

pub(crate) fn json_truthy(v: &serde_json::Value) -> bool {
    match v {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/pointer.rs"]
mod tests;
