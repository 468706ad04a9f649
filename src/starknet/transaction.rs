//! Deploy-account transaction building, hashing and signing.
//!
//! # Responsibilities
//! - Assemble the V3 deploy-account envelope for a fresh account
//! - Compute its transaction hash (Poseidon, SNIP-8 layout)
//! - Sign it, either for submission or as a fee-estimation query
//! - Produce the JSON-RPC wire form

use serde::Serialize;
use starknet_crypto::poseidon_hash_many;
use starknet_types_core::felt::Felt;

use crate::starknet::address::precompute_address;
use crate::starknet::keys::KeyPair;
use crate::starknet::types::{
    hex_u64, short_string, DataAvailabilityMode, ResourceBounds, ResourceBoundsMapping,
    StarknetResult,
};

/// Version of the transactions built here.
const TRANSACTION_VERSION: u64 = 3;

/// Added to the version of transactions that are only meant for estimation or simulation.
const QUERY_VERSION_OFFSET: Felt = Felt::from_hex_unchecked("0x100000000000000000000000000000000");

const DATA_AVAILABILITY_MODE_BITS: u64 = 32;

type ResourceName = [u8; 7];

const L1_GAS: &ResourceName = b"\0L1_GAS";
const L2_GAS: &ResourceName = b"\0L2_GAS";
const L1_DATA_GAS: &ResourceName = b"L1_DATA";

/// An unsigned deploy-account transaction for an account constructed with `[public_key]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployAccountTransaction {
    pub class_hash: Felt,
    pub contract_address_salt: Felt,
    pub constructor_calldata: Vec<Felt>,
    pub resource_bounds: ResourceBoundsMapping,
    pub tip: u64,
    pub nonce: Felt,
    pub paymaster_data: Vec<Felt>,
    pub nonce_data_availability_mode: DataAvailabilityMode,
    pub fee_data_availability_mode: DataAvailabilityMode,
}

impl DeployAccountTransaction {
    /// Deployment of `class_hash` salted by, and constructed with, the public key.
    pub fn for_public_key(public_key: Felt, class_hash: Felt) -> Self {
        Self {
            class_hash,
            contract_address_salt: public_key,
            constructor_calldata: vec![public_key],
            resource_bounds: ResourceBoundsMapping::default(),
            tip: 0,
            nonce: Felt::ZERO,
            paymaster_data: Vec::new(),
            nonce_data_availability_mode: DataAvailabilityMode::L1,
            fee_data_availability_mode: DataAvailabilityMode::L1,
        }
    }

    pub fn with_resource_bounds(mut self, resource_bounds: ResourceBoundsMapping) -> Self {
        self.resource_bounds = resource_bounds;
        self
    }

    pub fn with_tip(mut self, tip: u64) -> Self {
        self.tip = tip;
        self
    }

    /// Address the account will be deployed at.
    pub fn contract_address(&self) -> Felt {
        precompute_address(
            self.class_hash,
            self.contract_address_salt,
            &self.constructor_calldata,
            Felt::ZERO,
        )
    }

    fn version(query_only: bool) -> Felt {
        let version = Felt::from(TRANSACTION_VERSION);
        if query_only {
            version + QUERY_VERSION_OFFSET
        } else {
            version
        }
    }

    /// Transaction hash on the network identified by `chain_id`.
    pub fn transaction_hash(&self, chain_id: Felt, query_only: bool) -> Felt {
        let tip_resource_bounds_hash = poseidon_hash_many(&[
            Felt::from(self.tip),
            concat_resource(&self.resource_bounds.l1_gas, L1_GAS),
            concat_resource(&self.resource_bounds.l2_gas, L2_GAS),
            concat_resource(&self.resource_bounds.l1_data_gas, L1_DATA_GAS),
        ]);
        let data_availability_modes = Felt::from(
            (self.nonce_data_availability_mode.index() << DATA_AVAILABILITY_MODE_BITS)
                + self.fee_data_availability_mode.index(),
        );

        poseidon_hash_many(&[
            short_string("deploy_account"),
            Self::version(query_only),
            self.contract_address(),
            tip_resource_bounds_hash,
            poseidon_hash_many(&self.paymaster_data),
            chain_id,
            data_availability_modes,
            self.nonce,
            poseidon_hash_many(&self.constructor_calldata),
            self.class_hash,
            self.contract_address_salt,
        ])
    }

    /// Sign and convert to the wire form.
    ///
    /// Query-only transactions carry the query version and are rejected by
    /// the network if submitted, which makes them safe to send for estimation.
    pub fn sign(
        &self,
        keys: &KeyPair,
        chain_id: Felt,
        query_only: bool,
    ) -> StarknetResult<BroadcastedDeployAccountTransaction> {
        let hash = self.transaction_hash(chain_id, query_only);
        let signature = keys.sign(&hash)?;

        Ok(BroadcastedDeployAccountTransaction {
            kind: "DEPLOY_ACCOUNT",
            version: Self::version(query_only),
            signature: vec![signature.r, signature.s],
            nonce: self.nonce,
            contract_address_salt: self.contract_address_salt,
            constructor_calldata: self.constructor_calldata.clone(),
            class_hash: self.class_hash,
            resource_bounds: self.resource_bounds,
            tip: self.tip,
            paymaster_data: self.paymaster_data.clone(),
            nonce_data_availability_mode: self.nonce_data_availability_mode,
            fee_data_availability_mode: self.fee_data_availability_mode,
        })
    }
}

/// `[0 | resource name (56 bit) | max amount (64 bit) | max price per unit (128 bit)]`
fn concat_resource(bounds: &ResourceBounds, name: &ResourceName) -> Felt {
    let mut bytes = [0u8; 32];
    bytes[1..8].copy_from_slice(name);
    bytes[8..16].copy_from_slice(&bounds.max_amount.to_be_bytes());
    bytes[16..32].copy_from_slice(&bounds.max_price_per_unit.to_be_bytes());
    Felt::from_bytes_be(&bytes)
}

/// Signed deploy-account transaction as sent over JSON-RPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastedDeployAccountTransaction {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub version: Felt,
    pub signature: Vec<Felt>,
    pub nonce: Felt,
    pub contract_address_salt: Felt,
    pub constructor_calldata: Vec<Felt>,
    pub class_hash: Felt,
    pub resource_bounds: ResourceBoundsMapping,
    #[serde(with = "hex_u64")]
    pub tip: u64,
    pub paymaster_data: Vec<Felt>,
    pub nonce_data_availability_mode: DataAvailabilityMode,
    pub fee_data_availability_mode: DataAvailabilityMode,
}

impl BroadcastedDeployAccountTransaction {
    pub fn is_query(&self) -> bool {
        self.version.to_bytes_be() >= QUERY_VERSION_OFFSET.to_bytes_be()
    }
}
