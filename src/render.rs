//! Output-side visitor interface.
//!
//! [`Form::render`](crate::Form::render) walks the tree and calls back into
//! a [`Renderer`]; concrete renderers turn those callbacks into HTML,
//! template variables, or whatever the output layer needs. Every hook has a
//! no-op default so a renderer only implements the events it cares about.

use crate::form::Form;
use crate::javascript::JavascriptBuilder;
use crate::node::NodeId;

/// Receives tree-walk events during rendering.
///
/// The walk is depth-first: `start_*` fires before a container's children,
/// `finish_*` after. Hidden elements and frozen persistent elements are
/// routed to [`render_hidden`](Renderer::render_hidden) instead of
/// [`render_element`](Renderer::render_element).
pub trait Renderer {
	fn start_form(&mut self, _form: &Form) {}

	fn finish_form(&mut self, _form: &Form) {}

	fn start_container(&mut self, _form: &Form, _container: NodeId) {}

	fn finish_container(&mut self, _form: &Form, _container: NodeId) {}

	/// Group containers get their own bracket so renderers can lay their
	/// children out inline rather than as a block.
	fn start_group(&mut self, _form: &Form, _group: NodeId) {}

	fn finish_group(&mut self, _form: &Form, _group: NodeId) {}

	fn render_element(&mut self, _form: &Form, _element: NodeId) {}

	fn render_hidden(&mut self, _form: &Form, _element: NodeId) {}

	/// The builder collecting client-side validation code, if this renderer
	/// carries one. Rendering skips all JavaScript generation when `None`.
	fn javascript_builder(&mut self) -> Option<&mut JavascriptBuilder> {
		None
	}
}
