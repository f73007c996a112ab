//! Built-in infrastructure: reference call handlers

pub mod handlers;

pub use handlers::{AllocCallHandler, NoReturnCallHandler, ReleaseCallHandler};
