pub(crate) mod particle;
pub(crate) mod random;
pub(crate) mod simulation;
pub(crate) mod swarm;
