use std::collections::BTreeMap;

use serde_json::Value;

/// A merge-write against a document.
///
/// A patch is either a map of field patches applied recursively, a terminal
/// value that replaces whatever is at its position, or an array-union that
/// appends elements not already present. Applying a map patch on top of a
/// non-map value replaces that value with a fresh map first, so apply is
/// total.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch {
    Map(BTreeMap<String, Patch>),
    Set(Value),
    ArrayUnion(Vec<Value>),
}

impl Patch {
    /// A terminal patch that sets the field to `value`.
    #[must_use]
    pub fn set(value: Value) -> Self {
        Patch::Set(value)
    }

    /// A patch appending `items` to the array at the field. Elements already
    /// present (by value equality) are not appended again.
    #[must_use]
    pub fn array_union(items: Vec<Value>) -> Self {
        Patch::ArrayUnion(items)
    }

    /// A map patch from field/patch pairs.
    #[must_use]
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Patch)>,
        K: Into<String>,
    {
        Patch::Map(
            entries
                .into_iter()
                .map(|(k, p)| (k.into(), p))
                .collect(),
        )
    }

    /// Wraps `patch` under a chain of single-field maps, so
    /// `nested(["a", "b"], p)` patches the field at `a.b`.
    #[must_use]
    pub fn nested<I, S>(path: I, patch: Patch) -> Self
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: DoubleEndedIterator,
        S: Into<String>,
    {
        path.into_iter()
            .rev()
            .fold(patch, |inner, key| Patch::map([(key.into(), inner)]))
    }

    /// Turns a whole serialized document into a merge patch: objects become
    /// map patches field by field, everything else a terminal set. This is
    /// what "write the full mutated snapshot with merge" means — sibling
    /// fields already in the store survive.
    #[must_use]
    pub fn from_document(value: Value) -> Self {
        match value {
            Value::Object(fields) => Patch::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Patch::from_document(v)))
                    .collect(),
            ),
            other => Patch::Set(other),
        }
    }

    /// Apply this patch to `target` in place.
    pub fn apply(self, target: &mut Value) {
        match self {
            Patch::Set(value) => *target = value,
            Patch::ArrayUnion(items) => {
                if !target.is_array() {
                    *target = Value::Array(Vec::new());
                }
                if let Value::Array(existing) = target {
                    for item in items {
                        if !existing.contains(&item) {
                            existing.push(item);
                        }
                    }
                }
            }
            Patch::Map(entries) => {
                if !target.is_object() {
                    *target = Value::Object(serde_json::Map::new());
                }
                if let Value::Object(obj) = target {
                    for (key, patch) in entries {
                        patch.apply(obj.entry(key).or_insert(Value::Null));
                    }
                }
            }
        }
    }

    /// Apply this patch to an owned value, returning the merged result.
    #[must_use]
    pub fn apply_to(self, mut target: Value) -> Value {
        self.apply(&mut target);
        target
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
