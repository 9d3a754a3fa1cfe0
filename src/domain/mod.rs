// Domain layer: the items service records and the ports the feed depends on.

pub mod model;
pub mod ports;
