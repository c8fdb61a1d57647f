//! Packaging actions
//!
//! This module provides:
//! - The two packaging actions and their fixed messages
//! - Resolution of the script and project directories from the host
//! - The invoker that runs an action's script and streams its output

pub mod action;
pub mod context;
pub mod invoker;

pub use action::PackagingAction;
pub use context::{ProjectContext, ProjectContextResolver};
pub use invoker::{InvocationReport, PackagingInvoker};
