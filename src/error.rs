//! Error taxonomy for the form tree.
//!
//! All variants signal programmer error and are raised synchronously at the
//! point of misuse. Validation *failure* is never an error: it travels as the
//! boolean result of [`Form::validate`](crate::Form::validate) plus the error
//! string on the offending node.

/// Errors raised by form construction, registration and code generation.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
	/// A structurally invalid value was supplied: malformed id, unknown
	/// element or rule type, an attempt to chain a required rule, an attempt
	/// to re-parent a node into itself or a descendant, and similar misuse.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// A referenced resource does not exist: a reference node missing from a
	/// container, an unregistered type, an unreadable script library file.
	#[error("not found: {0}")]
	NotFound(String),

	/// A feature-specific illegal state, e.g. requesting client-side code
	/// from a rule that has no client implementation.
	#[error("{0}")]
	Logic(String),
}

pub type FormResult<T> = Result<T, FormError>;

impl FormError {
	pub(crate) fn invalid(msg: impl Into<String>) -> Self {
		FormError::InvalidArgument(msg.into())
	}

	pub(crate) fn not_found(msg: impl Into<String>) -> Self {
		FormError::NotFound(msg.into())
	}
}
