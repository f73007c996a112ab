//! IR construction helpers

pub mod builder;

pub use builder::FunctionBuilder;
