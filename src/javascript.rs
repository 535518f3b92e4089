//! Accumulates client-side validation rules and element setup code during
//! rendering, and emits the inline `<script>` blocks and library includes
//! that mirror the server-side checks in the browser.

use crate::error::{FormError, FormResult};
use crate::rule::js_string;

#[derive(Default)]
struct PerForm {
	rules: Vec<String>,
	scripts: Vec<String>,
	force_validator: bool,
}

struct Library {
	file: String,
	web_path: Option<String>,
	abs_path: Option<String>,
}

/// Collects per-form validation rules and setup scripts while a renderer
/// walks the tree.
///
/// Output order follows registration order: forms are emitted in the order
/// their ids were first seen.
pub struct JavascriptBuilder {
	forms: Vec<(String, PerForm)>,
	current: usize,
	libraries: Vec<(String, Library)>,
}

impl JavascriptBuilder {
	pub fn new() -> JavascriptBuilder {
		let mut builder = JavascriptBuilder {
			forms: vec![(String::new(), PerForm::default())],
			current: 0,
			libraries: Vec::new(),
		};
		builder.register_library("base", "formtree.js", None, None);
		builder
	}

	/// Registers a script library the generated code depends on.
	///
	/// `web_path` and `abs_path` are prefixes for the `src` attribute and for
	/// reading the file from disk respectively; names are deduplicated, last
	/// registration wins.
	pub fn register_library(
		&mut self,
		name: &str,
		file: &str,
		web_path: Option<&str>,
		abs_path: Option<&str>,
	) {
		let library = Library {
			file: file.to_string(),
			web_path: web_path.map(str::to_string),
			abs_path: abs_path.map(str::to_string),
		};
		if let Some(entry) = self.libraries.iter_mut().find(|(n, _)| n == name) {
			entry.1 = library;
		} else {
			self.libraries.push((name.to_string(), library));
		}
	}

	/// Switches accumulation to the form with the given id. Rules and
	/// scripts added afterwards belong to that form.
	pub fn set_form_id(&mut self, id: &str) {
		if let Some(pos) = self.forms.iter().position(|(form_id, _)| form_id == id) {
			self.current = pos;
		} else {
			self.forms.push((id.to_string(), PerForm::default()));
			self.current = self.forms.len() - 1;
		}
	}

	/// Adds a client-side rule object literal for the current form.
	pub fn add_rule(&mut self, rule_js: String) {
		self.forms[self.current].1.rules.push(rule_js);
	}

	/// Adds free-form element setup code for the current form.
	pub fn add_element_javascript(&mut self, script: String) {
		self.forms[self.current].1.scripts.push(script);
	}

	/// Forces validator emission for the current form even without rules,
	/// so that client code can rely on the validator object existing.
	pub fn force_validator(&mut self) {
		self.forms[self.current].1.force_validator = true;
	}

	/// The `new qf.Validator(...)` statement for one form, or for every
	/// form seen when `form_id` is `None`. Empty when no form has rules
	/// and none forced a validator.
	pub fn validator(&self, form_id: Option<&str>, script_tags: bool) -> String {
		let mut statements = Vec::new();
		for (id, per_form) in &self.forms {
			if let Some(wanted) = form_id
				&& wanted != id
			{
				continue;
			}
			if per_form.rules.is_empty() && !per_form.force_validator {
				continue;
			}
			statements.push(format!(
				"new qf.Validator(document.getElementById({}), [{}]);",
				js_string(id),
				per_form.rules.join(",\n")
			));
		}
		let code = statements.join("\n");
		if code.is_empty() || !script_tags {
			code
		} else {
			wrap_script(&code)
		}
	}

	/// Element setup code accumulated for one form (or all forms).
	pub fn setup_code(&self, form_id: Option<&str>, script_tags: bool) -> String {
		let mut scripts = Vec::new();
		for (id, per_form) in &self.forms {
			if let Some(wanted) = form_id
				&& wanted != id
			{
				continue;
			}
			scripts.extend(per_form.scripts.iter().cloned());
		}
		let code = scripts.join("\n");
		if code.is_empty() || !script_tags {
			code
		} else {
			wrap_script(&code)
		}
	}

	/// Validator plus setup code for every form.
	pub fn script(&self, script_tags: bool) -> String {
		let chunks: Vec<String> = [self.setup_code(None, false), self.validator(None, false)]
			.into_iter()
			.filter(|chunk| !chunk.is_empty())
			.collect();
		let code = chunks.join("\n");
		if code.is_empty() || !script_tags {
			code
		} else {
			wrap_script(&code)
		}
	}

	/// Library includes: `<script src=...>` tags, or the inlined file
	/// contents when `inline` is set.
	///
	/// Inlining reads each library from its absolute path (falling back to
	/// the bare file name) and fails with `NotFound` when a file cannot be
	/// read. `absolute` selects the filesystem prefix over the web prefix
	/// for the `src` attribute.
	pub fn libraries(&self, inline: bool, absolute: bool) -> FormResult<String> {
		let mut output = Vec::new();
		for (name, library) in &self.libraries {
			if inline {
				let path = prefixed(&library.abs_path, &library.file);
				let contents = std::fs::read_to_string(&path).map_err(|err| {
					FormError::not_found(format!(
						"unable to read library '{name}' from '{path}': {err}"
					))
				})?;
				output.push(contents.trim_end().to_string());
			} else {
				let prefix = if absolute {
					&library.abs_path
				} else {
					&library.web_path
				};
				let src = prefixed(prefix, &library.file);
				output.push(format!(
					"<script type=\"text/javascript\" src=\"{src}\"></script>"
				));
			}
		}
		let joined = output.join("\n");
		if inline && !joined.is_empty() {
			Ok(wrap_script(&joined))
		} else {
			Ok(joined)
		}
	}
}

impl Default for JavascriptBuilder {
	fn default() -> Self {
		JavascriptBuilder::new()
	}
}

fn prefixed(prefix: &Option<String>, file: &str) -> String {
	match prefix {
		Some(prefix) if !prefix.is_empty() => {
			format!("{}/{}", prefix.trim_end_matches('/'), file)
		}
		_ => file.to_string(),
	}
}

fn wrap_script(code: &str) -> String {
	format!("<script type=\"text/javascript\">\n//<![CDATA[\n{code}\n//]]>\n</script>")
}
