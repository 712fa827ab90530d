// Crypto module declarations

pub mod cipher;
pub mod hash;
pub mod keys;
pub mod padding;
