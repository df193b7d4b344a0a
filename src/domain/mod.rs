// Domain layer: artwork models, run settings and the ports the pipeline is assembled from.

pub mod model;
pub mod ports;
pub mod settings;
