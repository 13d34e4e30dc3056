//! # sendloom-template
//!
//! Placeholder engine for Sendloom email templates.
//!
//! This crate provides:
//! - **Extraction**: scan template text for `{{identifier}}` placeholders
//! - **Classification**: partition variables into system and custom sets
//! - **Normalization**: fold historical `variables` encodings into one canonical list
//! - **Rendering**: single-pass substitution of bound values
//!
//! Every function here is total and synchronous: any input produces a result,
//! never an error. Malformed placeholder syntax is simply not matched, and a
//! corrupt `variables` encoding degrades to best-effort parsing.
//!
//! ## Quick Start
//!
//! ```
//! use std::collections::BTreeMap;
//! use sendloom_template::{classify, extract_variables, render};
//!
//! let body = "Hi {{subscriber_username}}, use {{offer_code}} today!";
//!
//! let variables = extract_variables(body);
//! assert_eq!(variables, ["offer_code", "subscriber_username"]);
//!
//! let classification = classify(&variables);
//! assert_eq!(classification.custom, ["offer_code"]);
//! assert_eq!(classification.system, ["subscriber_username"]);
//!
//! let mut values = BTreeMap::new();
//! values.insert("offer_code".to_string(), "SAVE20".to_string());
//! assert_eq!(
//!     render(body, &values),
//!     "Hi {{subscriber_username}}, use SAVE20 today!"
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod classify;
pub mod constants;
pub mod extract;
pub mod render;

pub use classify::{Classification, SYSTEM_VARIABLES, classify, is_system_variable};
pub use constants::{RawConstants, normalize_constants};
pub use extract::extract_variables;
pub use render::render;
