//! Per-node state for the form arena.
//!
//! All nodes live inside a [`Form`](crate::Form) and are addressed by
//! [`NodeId`]. The tree is encoded with an owning parent → children list plus
//! a non-owning child → parent back link, so moving and re-parenting are
//! index updates and cycle checks are an ancestor-chain walk.

use std::collections::BTreeMap;
use std::ops::BitOr;
use std::rc::Rc;

use crate::data_source::DataSource;
use crate::element::Element;
use crate::rule::Rule;
use crate::value::Value;

/// Handle to a node inside a [`Form`](crate::Form).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Where a rule runs: on the server, on the client, or on the client with
/// re-validation on blur/change of its trigger elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunAt(u8);

impl RunAt {
	pub const SERVER: RunAt = RunAt(0b001);
	pub const CLIENT: RunAt = RunAt(0b010);
	pub const ONBLUR_CLIENT: RunAt = RunAt(0b110);

	pub fn contains(self, other: RunAt) -> bool {
		self.0 & other.0 == other.0
	}
}

impl BitOr for RunAt {
	type Output = RunAt;

	fn bitor(self, rhs: RunAt) -> RunAt {
		RunAt(self.0 | rhs.0)
	}
}

/// A value transform attached to a node. Extra arguments are captured by the
/// closure; anything invocable with this signature is accepted, which pushes
/// the "is this callable" check to compile time.
pub type Filter = Box<dyn Fn(Value) -> Value>;

/// Arena record for one element or container.
pub(crate) struct NodeData {
	pub(crate) kind: Box<dyn Element>,
	/// Bare name; the effective submitted name is computed from the ancestor
	/// chain (see `Form::qualified_name`).
	pub(crate) name: String,
	pub(crate) id: String,
	pub(crate) attributes: BTreeMap<String, String>,
	pub(crate) frozen: bool,
	pub(crate) persistent: bool,
	/// Empty string means "no error".
	pub(crate) error: String,
	pub(crate) rules: Vec<(Rc<Rule>, RunAt)>,
	pub(crate) filters: Vec<Filter>,
	pub(crate) recursive_filters: Vec<Filter>,
	pub(crate) parent: Option<NodeId>,
	/// Insertion-ordered; populated only for container kinds.
	pub(crate) children: Vec<NodeId>,
	/// Data sources, meaningful on the root of a tree.
	pub(crate) sources: Vec<Rc<dyn DataSource>>,
}

impl NodeData {
	pub(crate) fn new(kind: Box<dyn Element>, name: String, id: String) -> NodeData {
		NodeData {
			kind,
			name,
			id,
			attributes: BTreeMap::new(),
			frozen: false,
			persistent: false,
			error: String::new(),
			rules: vec![],
			filters: vec![],
			recursive_filters: vec![],
			parent: None,
			children: vec![],
			sources: vec![],
		}
	}
}
