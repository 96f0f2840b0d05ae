pub(crate) mod bounds;
pub(crate) mod device;
pub(crate) mod dispose;
