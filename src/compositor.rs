pub(crate) mod guard;
pub(crate) mod layout;
pub(crate) mod processor;
