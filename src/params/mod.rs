pub(crate) mod automation;
pub(crate) mod controller;
pub(crate) mod palette;
