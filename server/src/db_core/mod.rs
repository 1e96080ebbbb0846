pub mod migrate;
pub mod prelude;
