// Domain layer: account entities and the store port. No knowledge of HTTP or files.

pub mod model;
pub mod ports;
