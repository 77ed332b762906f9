pub mod fallback;
pub mod model;
pub mod normalize;
pub mod services;
pub mod validate;
