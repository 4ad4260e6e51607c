//! Application Lifecycle Manager: the status state machine, the
//! create/transition/withdraw operations and their HTTP handlers.

pub mod handlers;
pub mod service;
pub mod status;
