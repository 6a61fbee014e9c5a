mod immutable;
pub use immutable::*;
