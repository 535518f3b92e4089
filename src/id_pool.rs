//! Id allocation for a single form.
//!
//! Every node carries an id that is unique within its [`Form`](crate::Form).
//! The pool is owned by the form rather than sitting in process-global state,
//! so two independent forms never leak identifiers into each other and tests
//! can start from a clean namespace.

use std::collections::{HashMap, HashSet};

/// Allocates and reserves node ids.
#[derive(Debug, Default)]
pub struct IdPool {
	taken: HashSet<String>,
	counters: HashMap<String, u64>,
}

impl IdPool {
	pub fn new() -> IdPool {
		IdPool::default()
	}

	/// Generates a fresh id derived from a submitted name.
	///
	/// Bracket tokens are joined with hyphens (`user[address]` → `user-address-0`);
	/// an empty name falls back to the `auto` base. Generated ids skip over
	/// anything previously [`reserve`](IdPool::reserve)d.
	pub fn allocate(&mut self, name: &str) -> String {
		let flattened = name.replace(']', "");
		let tokens: Vec<&str> = flattened.split('[').filter(|t| !t.is_empty()).collect();
		let base = if tokens.is_empty() {
			"auto".to_string()
		} else {
			tokens.join("-")
		};

		loop {
			let counter = self.counters.entry(base.clone()).or_insert(0);
			let candidate = format!("{base}-{counter}");
			*counter += 1;
			if self.taken.insert(candidate.clone()) {
				return candidate;
			}
		}
	}

	/// Marks an explicitly chosen id as taken so auto-generation never
	/// collides with it. Reserving the same id twice is allowed; the caller
	/// decides whether two nodes may share one.
	pub fn reserve(&mut self, id: &str) {
		self.taken.insert(id.to_string());
	}
}
