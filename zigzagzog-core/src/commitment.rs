use alloc::borrow::Cow;
use core::fmt;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};
use serde::{Deserialize, Serialize};

use crate::constants::{DOMAIN_NAME, DOMAIN_VERSION};
use crate::shapes::ShapeCounts;

sol! {
    /// Typed data the contract recovers the committer from.
    struct ChoicesMessage {
        uint256 nonce;
        uint256 gameNumber;
        uint256 roundNumber;
        uint256 numCircles;
        uint256 numSquares;
        uint256 numTriangles;
    }
}

pub fn zigzagzog_domain(chain_id: u64, verifying_contract: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(Cow::Borrowed(DOMAIN_NAME)),
        Some(Cow::Borrowed(DOMAIN_VERSION)),
        Some(U256::from(chain_id)),
        Some(verifying_contract),
        None,
    )
}

/// A hidden shape selection, kept locally until it is revealed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    pub nonce: U256,
    pub game_number: u64,
    pub round_number: u64,
    pub shapes: ShapeCounts,
}

impl Commitment {
    pub fn message(&self) -> ChoicesMessage {
        ChoicesMessage {
            nonce: self.nonce,
            gameNumber: U256::from(self.game_number),
            roundNumber: U256::from(self.round_number),
            numCircles: U256::from(self.shapes.circles),
            numSquares: U256::from(self.shapes.squares),
            numTriangles: U256::from(self.shapes.triangles),
        }
    }

    /// EIP-712 digest the player signs when committing.
    pub fn signing_hash(&self, domain: &Eip712Domain) -> B256 {
        self.message().eip712_signing_hash(domain)
    }

    pub fn total_plays(&self) -> u64 {
        self.shapes.total()
    }
}

/// Cache slot of a pending reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentKey {
    pub contract: Address,
    pub player: Address,
    pub game_number: u64,
    pub round_number: u64,
}

impl fmt::Display for CommitmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "commitment_{}_{}_{}_{}",
            self.contract, self.player, self.game_number, self.round_number
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::keccak256;

    const CONTRACT: Address = Address::new([0x22; 20]);

    fn commitment(nonce: u64) -> Commitment {
        Commitment {
            nonce: U256::from(nonce),
            game_number: 3,
            round_number: 2,
            shapes: ShapeCounts::new(1, 0, 4),
        }
    }

    #[test]
    fn type_string_matches_contract_layout() {
        assert_eq!(
            ChoicesMessage::eip712_encode_type(),
            "ChoicesMessage(uint256 nonce,uint256 gameNumber,uint256 roundNumber,uint256 numCircles,uint256 numSquares,uint256 numTriangles)"
        );
    }

    #[test]
    fn signing_hash_is_eip191_envelope() {
        let domain = zigzagzog_domain(13_746, CONTRACT);
        let message = commitment(42).message();

        let mut preimage = [0u8; 66];
        preimage[..2].copy_from_slice(&[0x19, 0x01]);
        preimage[2..34].copy_from_slice(domain.separator().as_slice());
        preimage[34..].copy_from_slice(message.eip712_hash_struct().as_slice());

        assert_eq!(commitment(42).signing_hash(&domain), keccak256(preimage));
    }

    #[test]
    fn hash_binds_nonce_chain_and_contract() {
        let domain = zigzagzog_domain(13_746, CONTRACT);
        let base = commitment(42).signing_hash(&domain);

        assert_eq!(base, commitment(42).signing_hash(&domain));
        assert_ne!(base, commitment(43).signing_hash(&domain));
        assert_ne!(base, commitment(42).signing_hash(&zigzagzog_domain(1, CONTRACT)));
        assert_ne!(
            base,
            commitment(42).signing_hash(&zigzagzog_domain(13_746, Address::ZERO))
        );
    }

    #[test]
    fn key_format() {
        let key = CommitmentKey {
            contract: CONTRACT,
            player: Address::new([0xab; 20]),
            game_number: 3,
            round_number: 2,
        };
        let rendered = key.to_string();
        assert!(rendered.starts_with("commitment_0x2222"));
        assert!(rendered.ends_with("_3_2"));
        assert_eq!(rendered.matches('_').count(), 4);
    }
}
