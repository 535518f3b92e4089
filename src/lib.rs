//! Server-side HTML form construction, population, and validation.
//!
//! A form is a tree of elements and containers addressed by [`NodeId`]
//! handles. Submitted names follow HTML's bracket convention
//! (`user[address][city]`), values are resolved against an ordered list of
//! [`DataSource`]s, and validation runs [`Rule`] chains both on the server
//! and, mirrored as generated JavaScript, in the browser.
//!
//! # Examples
//!
//! ```
//! use formtree::{ArrayDataSource, Factory, Form, RunAt, Value};
//!
//! let factory = Factory::with_defaults();
//! let mut form = Form::new("login");
//! let user = form.add_element(&factory, form.root(), "text", "username").unwrap();
//!
//! form.add_data_source(
//! 	form.root(),
//! 	ArrayDataSource::from_json(&serde_json::json!({"username": "alice"})),
//! );
//! assert_eq!(form.value(user), Some(Value::scalar("alice")));
//!
//! form.add_rule_of(&factory, "required", user, "username is required", None, RunAt::SERVER)
//! 	.unwrap();
//! assert!(form.validate(form.root()));
//! ```

pub mod data_source;
pub mod element;
pub mod error;
pub mod factory;
pub mod form;
pub mod id_pool;
pub mod javascript;
pub mod node;
pub mod render;
pub mod rule;
pub mod value;

pub use data_source::{ArrayDataSource, DataSource, SubmitDataSource, UploadError, UploadInfo};
pub use element::{Checkbox, Element, Fieldset, Group, Hidden, StaticHtml, Text};
pub use error::{FormError, FormResult};
pub use factory::Factory;
pub use form::Form;
pub use id_pool::IdPool;
pub use javascript::JavascriptBuilder;
pub use node::{Filter, NodeId, RunAt};
pub use render::Renderer;
pub use rule::{Callback, Compare, Length, Operand, Operator, RegexRule, Required, Rule, RuleLogic};
pub use value::{Key, Value, ValueMap};
