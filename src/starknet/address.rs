//! Deterministic contract address derivation.
//!
//! ```text
//! address = pedersen_chain(
//!     "STARKNET_CONTRACT_ADDRESS", deployer, salt, class_hash, pedersen_chain(calldata)
//! ) mod (2^251 - 256)
//! ```
//!
//! Deploy-account transactions always use deployer `0`.

use starknet_crypto::pedersen_hash;
use starknet_types_core::felt::Felt;

use crate::starknet::types::short_string;

/// Exclusive upper bound of the contract address space, `2^251 - 256`.
const ADDRESS_UPPER_BOUND: Felt =
    Felt::from_hex_unchecked("0x7ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff00");

/// Pedersen hash chain over `elements`, finished with the element count.
pub fn pedersen_chain(elements: &[Felt]) -> Felt {
    let folded = elements
        .iter()
        .fold(Felt::ZERO, |acc, element| pedersen_hash(&acc, element));
    pedersen_hash(&folded, &Felt::from(elements.len() as u64))
}

/// Address a contract will have once deployed with these parameters.
pub fn precompute_address(
    class_hash: Felt,
    salt: Felt,
    constructor_calldata: &[Felt],
    deployer_address: Felt,
) -> Felt {
    let raw = pedersen_chain(&[
        short_string("STARKNET_CONTRACT_ADDRESS"),
        deployer_address,
        salt,
        class_hash,
        pedersen_chain(constructor_calldata),
    ]);

    // The field prime is below twice the bound, so one subtraction normalizes.
    if raw.to_bytes_be() >= ADDRESS_UPPER_BOUND.to_bytes_be() {
        raw - ADDRESS_UPPER_BOUND
    } else {
        raw
    }
}

/// Address of an account whose constructor takes only its public key, salted by it.
pub fn account_address(public_key: Felt, class_hash: Felt) -> Felt {
    precompute_address(class_hash, public_key, &[public_key], Felt::ZERO)
}
