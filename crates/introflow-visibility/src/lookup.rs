//! Value sources for visibility evaluation
//!
//! A [`ValueLookup`] answers "what is the current value of this field?".
//! Implementations must not mutate anything they read from.

use introflow_model::{value, FieldKey, FormConfiguration, Ticket};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;

/// Read-only source of current field values
pub trait ValueLookup {
    /// Current value stored under `key`, if any
    fn lookup(&self, key: &FieldKey) -> Option<Cow<'_, Value>>;
}

impl ValueLookup for Value {
    fn lookup(&self, key: &FieldKey) -> Option<Cow<'_, Value>> {
        value::resolve(self, key).map(Cow::Borrowed)
    }
}

impl ValueLookup for Ticket {
    fn lookup(&self, key: &FieldKey) -> Option<Cow<'_, Value>> {
        self.value(key).map(Cow::Borrowed)
    }
}

impl<T: ValueLookup + ?Sized> ValueLookup for &T {
    fn lookup(&self, key: &FieldKey) -> Option<Cow<'_, Value>> {
        (**self).lookup(key)
    }
}

/// Adapter turning a closure into a [`ValueLookup`]
#[derive(Debug, Clone, Copy)]
pub struct FnLookup<F>(pub F);

impl<F> ValueLookup for FnLookup<F>
where
    F: Fn(&FieldKey) -> Option<Value>,
{
    fn lookup(&self, key: &FieldKey) -> Option<Cow<'_, Value>> {
        (self.0)(key).map(Cow::Owned)
    }
}

/// In-progress edits layered over a base source
///
/// Edited keys shadow the base; everything else falls through.
#[derive(Debug, Clone)]
pub struct ValueOverlay<B> {
    base: B,
    edits: HashMap<FieldKey, Value>,
}

impl<B: ValueLookup> ValueOverlay<B> {
    /// Create overlay with no edits
    #[must_use]
    pub fn new(base: B) -> Self {
        Self {
            base,
            edits: HashMap::new(),
        }
    }

    /// Record an edit
    pub fn set(&mut self, key: FieldKey, value: Value) {
        self.edits.insert(key, value);
    }

    /// Builder form of [`set`](Self::set)
    #[must_use]
    pub fn with_edit(mut self, key: FieldKey, value: Value) -> Self {
        self.set(key, value);
        self
    }

    /// Number of edited keys
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }
}

impl<B: ValueLookup> ValueLookup for ValueOverlay<B> {
    fn lookup(&self, key: &FieldKey) -> Option<Cow<'_, Value>> {
        match self.edits.get(key) {
            Some(edit) => Some(Cow::Borrowed(edit)),
            None => self.base.lookup(key),
        }
    }
}

/// Authored default values of a form configuration
///
/// Drives read-only preview, where no concrete ticket exists.
#[derive(Debug, Clone, Copy)]
pub struct DefaultValues<'a> {
    form: &'a FormConfiguration,
}

impl<'a> DefaultValues<'a> {
    /// Defaults of `form`
    #[must_use]
    pub fn new(form: &'a FormConfiguration) -> Self {
        Self { form }
    }
}

impl ValueLookup for DefaultValues<'_> {
    fn lookup(&self, key: &FieldKey) -> Option<Cow<'_, Value>> {
        self.form
            .field(key.as_str())
            .and_then(|f| f.default_value.as_ref())
            .map(Cow::Borrowed)
    }
}
