use std::{borrow::Cow, fmt};

use rustc_hash::FxHashMap;

/// Byte-sequence kinds of the host runtime. They share one representation
/// and encode identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextKind {
    String,
    Symbol,
    Keyword,
    Buffer,
}

impl TextKind {
    pub fn name(self) -> &'static str {
        match self {
            TextKind::String => "string",
            TextKind::Symbol => "symbol",
            TextKind::Keyword => "keyword",
            TextKind::Buffer => "buffer",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Text {
    pub bytes: Vec<u8>,
    pub kind: TextKind,
}

impl Text {
    pub fn new(bytes: impl Into<Vec<u8>>, kind: TextKind) -> Self {
        Self {
            bytes: bytes.into(),
            kind,
        }
    }

    /// `true` for the literal `null`, which stands in for JSON null
    /// whatever the kind.
    #[inline]
    pub fn is_null_sentinel(&self) -> bool {
        self.bytes == b"null"
    }
}

/// A host datum with no JSON counterpart, such as a function or fiber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Opaque {
    pub type_name: Cow<'static, str>,
}

impl Opaque {
    pub fn new(type_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Number(f64),
    Text(Text),
    Sequence(Vec<Value>),
    Mapping(Table),
    Opaque(Opaque),
}

impl Value {
    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Text(Text::new(bytes, TextKind::String))
    }

    pub fn keyword(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Text(Text::new(bytes, TextKind::Keyword))
    }

    pub fn symbol(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Text(Text::new(bytes, TextKind::Symbol))
    }

    pub fn buffer(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Text(Text::new(bytes, TextKind::Buffer))
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(bool) => Some(*bool),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Table> {
        match self {
            Value::Mapping(table) => Some(table),
            _ => None,
        }
    }

    /// Host type name, as used in error messages.
    pub fn kind_name(&self) -> &str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(text) => text.kind.name(),
            Value::Sequence(_) => "array",
            Value::Mapping(_) => "table",
            Value::Opaque(opaque) => opaque.type_name.as_ref(),
        }
    }
}

impl From<bool> for Value {
    fn from(bool: bool) -> Self {
        Value::Boolean(bool)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Value::Number(f64::from(number))
    }
}

impl From<&str> for Value {
    fn from(str: &str) -> Self {
        Value::string(str)
    }
}

impl From<String> for Value {
    fn from(string: String) -> Self {
        Value::string(string)
    }
}

impl From<Text> for Value {
    fn from(text: Text) -> Self {
        Value::Text(text)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Value::Mapping(table)
    }
}

/// Hashable projection of a scalar key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum IndexKey {
    Boolean(bool),
    Number(u64),
    Text(TextKind, Vec<u8>),
}

impl IndexKey {
    fn of(key: &Value) -> Option<Self> {
        match key {
            Value::Boolean(bool) => Some(IndexKey::Boolean(*bool)),
            // -0.0 and 0.0 are the same key
            Value::Number(number) => Some(IndexKey::Number((number + 0.0).to_bits())),
            Value::Text(text) => Some(IndexKey::Text(text.kind, text.bytes.clone())),
            _ => None,
        }
    }
}

#[inline]
fn is_tombstone_key(key: &Value) -> bool {
    match key {
        Value::Nil => true,
        Value::Number(number) => number.is_nan(),
        _ => false,
    }
}

/// Sparse mapping. Removing an entry leaves a tombstone slot (key `Nil`) in
/// place, so storage order of the remaining slots never shifts.
#[derive(Clone, Default)]
pub struct Table {
    slots: Vec<(Value, Value)>,
    index: FxHashMap<IndexKey, usize>,
    live: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            slots: Vec::with_capacity(cap),
            index: FxHashMap::with_capacity_and_hasher(cap, Default::default()),
            live: 0,
        }
    }

    /// Builds a table from raw slots. Slots keyed `Nil` stay in place as
    /// tombstones; a repeated key keeps its first slot and takes the last
    /// value.
    pub fn from_slots(slots: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let slots = slots.into_iter();
        let mut table = Self::with_capacity(slots.size_hint().0);
        for (key, value) in slots {
            if is_tombstone_key(&key) {
                table.slots.push((Value::Nil, Value::Nil));
            } else {
                table.insert(key, value);
            }
        }
        table
    }

    fn position(&self, key: &Value) -> Option<usize> {
        if is_tombstone_key(key) {
            return None;
        }
        match IndexKey::of(key) {
            Some(index_key) => self.index.get(&index_key).copied(),
            None => self.slots.iter().position(|(slot, _)| slot == key),
        }
    }

    /// Inserts or overwrites. `Nil` and NaN keys are ignored.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        if is_tombstone_key(&key) {
            return None;
        }
        if let Some(pos) = self.position(&key) {
            return Some(std::mem::replace(&mut self.slots[pos].1, value));
        }
        if let Some(index_key) = IndexKey::of(&key) {
            self.index.insert(index_key, self.slots.len());
        }
        self.slots.push((key, value));
        self.live += 1;
        None
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.position(key).map(|pos| &self.slots[pos].1)
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.position(key).is_some()
    }

    /// Tombstones the slot holding `key`.
    pub fn remove(&mut self, key: &Value) -> Option<Value> {
        let pos = self.position(key)?;
        if let Some(index_key) = IndexKey::of(key) {
            self.index.remove(&index_key);
        }
        let (_, value) = std::mem::take(&mut self.slots[pos]);
        self.live -= 1;
        Some(value)
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of slots, tombstones included.
    #[inline]
    pub fn capacity_slots(&self) -> usize {
        self.slots.len()
    }

    /// Raw slots in storage order, tombstones included.
    #[inline]
    pub fn slots(&self) -> &[(Value, Value)] {
        &self.slots
    }

    /// Live entries in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.slots
            .iter()
            .filter(|(key, _)| !key.is_nil())
            .map(|(key, value)| (key, value))
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.live == other.live && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Table {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Table::new();
        for (key, value) in iter {
            table.insert(key.into(), value.into());
        }
        table
    }
}
