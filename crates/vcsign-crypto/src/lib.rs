pub mod error;
pub mod keys;
pub mod multibase;
pub mod signing;

pub use error::CryptoError;
pub use keys::{KeyPair, PublicKey};
pub use signing::{sha256, sign, verify, Signature};
