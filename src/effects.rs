pub(crate) mod builtin;
pub(crate) mod chain;
pub(crate) mod draw;
pub(crate) mod processor;
