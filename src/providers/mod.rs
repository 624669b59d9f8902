pub mod rest;

pub use rest::RestProvider;
