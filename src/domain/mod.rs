// Domain layer: models and ports. Nothing in here talks to the network.

pub mod model;
pub mod ports;
