pub mod cleanup;
pub mod encoder;
