// Domain layer: bibliography and publication models plus the ports the pipeline runs against.

pub mod model;
pub mod ports;
