// Domain layer: component model and the ports the core drives (process, prompt, reporting).

pub mod model;
pub mod ports;
