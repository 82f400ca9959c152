//! Signed bearer tokens: claims, minting, and verification.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::Claims;
pub use decoder::{JwtDecoder, TokenError};
pub use encoder::{JwtEncoder, MintedToken};

use ddup_core::config::SigningAlgorithm;
use jsonwebtoken::Algorithm;

/// Map the configured MAC scheme onto the jsonwebtoken algorithm.
pub(crate) fn jwt_algorithm(algorithm: SigningAlgorithm) -> Algorithm {
    match algorithm {
        SigningAlgorithm::HS256 => Algorithm::HS256,
        SigningAlgorithm::HS384 => Algorithm::HS384,
        SigningAlgorithm::HS512 => Algorithm::HS512,
    }
}
