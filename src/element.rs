//! Element behavior.
//!
//! Every node in the tree carries a `Box<dyn Element>` implementing the
//! type-specific part of the node contract: value storage, resolution from
//! data sources, and rendering capabilities. Tree structure, naming, rules
//! and filters are handled uniformly by [`Form`](crate::Form).

// Leaf elements
pub mod checkbox;
pub mod hidden;
pub mod static_html;
pub mod text;

// Containers
pub mod group;

pub use checkbox::Checkbox;
pub use group::{Fieldset, Group};
pub use hidden::Hidden;
pub use static_html::StaticHtml;
pub use text::Text;

use std::rc::Rc;

use crate::data_source::DataSource;
use crate::value::Value;

/// Type-specific behavior of a node.
pub trait Element {
	/// Registry type name, e.g. `"text"`.
	fn element_type(&self) -> &'static str;

	fn is_container(&self) -> bool {
		false
	}

	/// Whether a container's own (non-empty) name prefixes its descendants'
	/// submitted names. Transparent containers return false and their
	/// children's values merge directly into the enclosing mapping.
	fn prepends_name(&self) -> bool {
		false
	}

	/// Display-only elements return false and reject rule attachment.
	fn can_validate(&self) -> bool {
		true
	}

	/// Hidden elements render through `Renderer::render_hidden`.
	fn is_hidden(&self) -> bool {
		false
	}

	/// The stored value before filters. Containers return `None` here; their
	/// value is aggregated from children by the form.
	fn raw_value(&self) -> Option<Value> {
		None
	}

	fn set_value(&mut self, value: Value);

	/// Resolves the element's value against the prioritized sources: the
	/// first source claiming `name` ends the search, and its value (when
	/// present) is assigned.
	fn update_value(&mut self, name: &str, sources: &[Rc<dyn DataSource>]) {
		for source in sources {
			if source.has_value(name) {
				if let Some(value) = source.value(name) {
					self.set_value(value);
				}
				return;
			}
		}
	}

	/// Per-element client setup snippet collected during rendering.
	fn setup_javascript(&self, _id: &str) -> Option<String> {
		None
	}
}
