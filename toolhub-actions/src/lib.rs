//! Upstream contract consumed by the registry.
//!
//! Providers bundle related [`Action`]s and report which networks they
//! support. Each action is a plain record assembled through
//! [`Action::builder`]: a name, a description, a JSON Schema for its
//! arguments, and an async handler. [`parameters`] turns those schemas into
//! uniform parameter records and [`validation`] checks call arguments
//! against them before a handler runs.

#![warn(missing_docs, clippy::pedantic)]

pub mod parameters;
pub mod provider;
pub mod validation;

pub use parameters::{ActionParameter, ParameterType, extract_parameters};
pub use provider::{
    Action, ActionBuilder, ActionError, ActionHandler, ActionProvider, ActionResult,
    PerformanceHints, ProviderError, StaticActionProvider, WalletContext,
};
pub use validation::{ValidationError, apply_defaults, validate_arguments};
