// Domain layer: truthiness, the dynamic value type and record models. No I/O here.

pub mod model;
pub mod truthy;
pub mod value;
