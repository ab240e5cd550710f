// Domain layer: core models, ports (interfaces) and pure services. Nothing in here does I/O.

pub mod model;
pub mod ports;

pub mod services;
