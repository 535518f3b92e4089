//! Submitted-value model.
//!
//! Form values follow the shape of an HTML submission: a scalar per input, or
//! a nested mapping produced by bracketed names (`user[address][city]`). Keys
//! are either explicit names or integer indexes, and insertion order is
//! significant, so the mapping is kept as an ordered list of entries rather
//! than a hash map.

use serde_json::json;

/// A key inside a [`ValueMap`].
///
/// Tokens that spell a canonical integer (`"0"`, `"12"`) are integer keys;
/// everything else, including `"007"`, is a name key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
	Index(usize),
	Name(String),
}

impl Key {
	/// Parses a bracket token into a key.
	///
	/// # Examples
	///
	/// ```
	/// use formtree::Key;
	///
	/// assert_eq!(Key::from_token("0"), Key::Index(0));
	/// assert_eq!(Key::from_token("007"), Key::Name("007".to_string()));
	/// assert_eq!(Key::from_token("city"), Key::Name("city".to_string()));
	/// ```
	pub fn from_token(token: &str) -> Key {
		match token.parse::<usize>() {
			Ok(n) if n.to_string() == token => Key::Index(n),
			_ => Key::Name(token.to_string()),
		}
	}
}

/// A resolved form value: a scalar string or a nested ordered mapping.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Scalar(String),
	Map(ValueMap),
}

impl Value {
	pub fn scalar(value: impl Into<String>) -> Value {
		Value::Scalar(value.into())
	}

	pub fn map() -> Value {
		Value::Map(ValueMap::new())
	}

	pub fn as_scalar(&self) -> Option<&str> {
		match self {
			Value::Scalar(s) => Some(s),
			Value::Map(_) => None,
		}
	}

	pub fn as_map(&self) -> Option<&ValueMap> {
		match self {
			Value::Map(m) => Some(m),
			Value::Scalar(_) => None,
		}
	}

	/// Converts request-style JSON into a value. JSON `null` converts to
	/// `None` (an absent value, not an empty one).
	///
	/// # Examples
	///
	/// ```
	/// use formtree::Value;
	/// use serde_json::json;
	///
	/// let v = Value::from_json(&json!({"name": "John", "tags": ["a", "b"]})).unwrap();
	/// assert_eq!(v.to_json(), json!({"name": "John", "tags": ["a", "b"]}));
	/// assert!(Value::from_json(&json!(null)).is_none());
	/// ```
	pub fn from_json(value: &serde_json::Value) -> Option<Value> {
		match value {
			serde_json::Value::Null => None,
			serde_json::Value::Bool(b) => Some(Value::scalar(if *b { "1" } else { "" })),
			serde_json::Value::Number(n) => Some(Value::scalar(n.to_string())),
			serde_json::Value::String(s) => Some(Value::scalar(s)),
			serde_json::Value::Array(items) => {
				let mut map = ValueMap::new();
				for item in items {
					if let Some(v) = Value::from_json(item) {
						map.push(v);
					}
				}
				Some(Value::Map(map))
			}
			serde_json::Value::Object(fields) => {
				let mut map = ValueMap::new();
				for (k, v) in fields {
					if let Some(v) = Value::from_json(v) {
						map.set(Key::from_token(k), v);
					}
				}
				Some(Value::Map(map))
			}
		}
	}

	/// Converts back to JSON for inspection. A mapping whose keys are exactly
	/// the indexes `0..n` in order becomes a JSON array; any other mapping
	/// becomes an object with stringified keys.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Value::Scalar(s) => json!(s),
			Value::Map(map) => {
				let contiguous = map
					.iter()
					.enumerate()
					.all(|(i, (k, _))| *k == Key::Index(i));
				if contiguous && !map.is_empty() {
					serde_json::Value::Array(map.iter().map(|(_, v)| v.to_json()).collect())
				} else {
					let mut obj = serde_json::Map::new();
					for (k, v) in map.iter() {
						let key = match k {
							Key::Index(n) => n.to_string(),
							Key::Name(s) => s.clone(),
						};
						obj.insert(key, v.to_json());
					}
					serde_json::Value::Object(obj)
				}
			}
		}
	}
}

/// An insertion-ordered mapping from [`Key`] to [`Value`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueMap {
	entries: Vec<(Key, Value)>,
}

impl ValueMap {
	pub fn new() -> ValueMap {
		ValueMap { entries: vec![] }
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = &(Key, Value)> {
		self.entries.iter()
	}

	pub fn get(&self, key: &Key) -> Option<&Value> {
		self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	pub fn get_mut(&mut self, key: &Key) -> Option<&mut Value> {
		self.entries
			.iter_mut()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v)
	}

	/// Inserts or replaces the entry for `key`, preserving its position when
	/// it already exists.
	pub fn set(&mut self, key: Key, value: Value) {
		match self.entries.iter_mut().find(|(k, _)| *k == key) {
			Some(entry) => entry.1 = value,
			None => self.entries.push((key, value)),
		}
	}

	/// Appends `value` at the next free integer index and returns that index.
	pub fn push(&mut self, value: Value) -> usize {
		let index = self.next_index();
		self.entries.push((Key::Index(index), value));
		index
	}

	fn next_index(&self) -> usize {
		self.entries
			.iter()
			.filter_map(|(k, _)| match k {
				Key::Index(n) => Some(n + 1),
				Key::Name(_) => None,
			})
			.max()
			.unwrap_or(0)
	}

	fn contains_value(&self, value: &Value) -> bool {
		self.entries.iter().any(|(_, v)| v == value)
	}

	/// Merges `other` into `self` with submitted-array semantics:
	///
	/// - a name key overwrites, or merges recursively when both sides hold
	///   mappings;
	/// - an integer-keyed entry is appended at the next free index, unless an
	///   identical value is already present; existing integer keys are never
	///   renumbered.
	///
	/// # Examples
	///
	/// ```
	/// use formtree::{Key, Value, ValueMap};
	///
	/// let mut a = ValueMap::new();
	/// a.push(Value::scalar("x"));
	/// let mut b = ValueMap::new();
	/// b.push(Value::scalar("y"));
	///
	/// a.merge(b);
	/// assert_eq!(a.get(&Key::Index(0)), Some(&Value::scalar("x")));
	/// assert_eq!(a.get(&Key::Index(1)), Some(&Value::scalar("y")));
	/// ```
	pub fn merge(&mut self, other: ValueMap) {
		for (key, value) in other.entries {
			match key {
				Key::Name(_) => {
					if let Value::Map(inner) = value {
						if let Some(Value::Map(existing)) = self.get_mut(&key) {
							existing.merge(inner);
							continue;
						}
						self.set(key, Value::Map(inner));
					} else {
						self.set(key, value);
					}
				}
				Key::Index(_) => {
					if !self.contains_value(&value) {
						self.push(value);
					}
				}
			}
		}
	}

	/// Writes `value` at the path given by bracket tokens, creating
	/// intermediate mappings as needed. A trailing empty token appends.
	pub(crate) fn set_path(&mut self, tokens: &[&str], value: Value) {
		match tokens {
			[] => {}
			[last] => {
				if last.is_empty() {
					self.push(value);
				} else {
					self.set(Key::from_token(last), value);
				}
			}
			[head, rest @ ..] => {
				let key = Key::from_token(head);
				if !matches!(self.get(&key), Some(Value::Map(_))) {
					self.set(key.clone(), Value::map());
				}
				if let Some(Value::Map(inner)) = self.get_mut(&key) {
					inner.set_path(rest, value);
				}
			}
		}
	}

	/// Looks up a possibly-bracketed submitted name, walking nested maps.
	pub(crate) fn lookup(&self, name: &str) -> Option<&Value> {
		let tokens = name_tokens(name);
		let mut current = self.get(&Key::from_token(&tokens[0]))?;
		for token in &tokens[1..] {
			current = current.as_map()?.get(&Key::from_token(token))?;
		}
		Some(current)
	}
}

/// Splits a submitted name into its bracket tokens: `a[b][]` becomes
/// `["a", "b", ""]`, a bare name becomes a single token.
pub(crate) fn name_tokens(name: &str) -> Vec<String> {
	name.replace(']', "")
		.split('[')
		.map(str::to_string)
		.collect()
}
