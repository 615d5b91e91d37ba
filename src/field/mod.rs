pub(crate) mod flow;
pub(crate) mod noise;
