// Domain layer: session data model and ports to the outside world.

pub mod model;
pub mod ports;
