//! Key generation and transaction signing.
//!
//! # Security
//! - The private key is never written through `tracing`
//! - `Debug` output redacts the private key
//! - Randomness comes from the operating system RNG

use rand::rngs::OsRng;
use rand::RngCore;
use starknet_crypto::{get_public_key, rfc6979_generate_k, sign};
use starknet_types_core::felt::Felt;
use std::fmt;

use crate::starknet::types::{StarknetError, StarknetResult};

/// Order of the Stark curve generator. Valid private keys lie in `[1, EC_ORDER)`.
const EC_ORDER: Felt =
    Felt::from_hex_unchecked("0x0800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f");

/// ECDSA signature over the Stark curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: Felt,
    pub s: Felt,
}

/// A Stark-curve keypair for a single account.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    private_key: Felt,
    public_key: Felt,
}

impl KeyPair {
    /// Generate a fresh random keypair.
    ///
    /// Draws 251-bit scalars, which are always below the curve order, and
    /// rejects zero.
    pub fn generate() -> Self {
        loop {
            let mut bytes = [0u8; 32];
            OsRng.fill_bytes(&mut bytes);
            bytes[0] &= 0x07;
            let scalar = Felt::from_bytes_be(&bytes);
            if scalar != Felt::ZERO {
                return Self::derive(scalar);
            }
        }
    }

    /// Build a keypair from an existing private key.
    pub fn from_private_key(private_key: Felt) -> StarknetResult<Self> {
        if private_key == Felt::ZERO || private_key.to_bytes_be() >= EC_ORDER.to_bytes_be() {
            return Err(StarknetError::Encoding(
                "private key must be in [1, curve order)".to_string(),
            ));
        }
        Ok(Self::derive(private_key))
    }

    fn derive(private_key: Felt) -> Self {
        Self {
            public_key: get_public_key(&private_key),
            private_key,
        }
    }

    pub fn private_key(&self) -> Felt {
        self.private_key
    }

    pub fn public_key(&self) -> Felt {
        self.public_key
    }

    /// Sign a message hash with a deterministic (RFC 6979) nonce.
    pub fn sign(&self, message_hash: &Felt) -> StarknetResult<Signature> {
        let k = rfc6979_generate_k(message_hash, &self.private_key, None);
        let signature = sign(&self.private_key, message_hash, &k)
            .map_err(|e| StarknetError::Signing(format!("{e:?}")))?;
        Ok(Signature {
            r: signature.r,
            s: signature.s,
        })
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"<redacted>")
            .field("public_key", &format_args!("{:#x}", self.public_key))
            .finish()
    }
}
