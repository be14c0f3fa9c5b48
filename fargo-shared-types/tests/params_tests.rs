//! Parameter loading and header serialization checks.

use fargo_shared_types::params::{MAINNET_POS_LIMIT, MAINNET_POW_LIMIT};
use fargo_shared_types::*;
use hex_literal::hex;
use primitive_types::U256;

#[cfg(test)]
mod params_loading {
    use super::*;

    #[test]
    fn test_json_round_trip_keeps_limits() {
        let params = ConsensusParams::testnet();
        let json = params.to_json().unwrap();
        let parsed = ConsensusParams::from_json(&json).unwrap();
        assert_eq!(parsed, params);
        assert_eq!(parsed.pow_limit, MAINNET_POW_LIMIT);
    }

    #[test]
    fn test_limits_are_written_as_hex() {
        let json = ConsensusParams::mainnet().to_json().unwrap();
        assert!(json.contains("\"0xfffff000000000000000000000000000000000000000000000000000000\""));
    }

    #[test]
    fn test_from_json_handwritten_file() {
        let json = r#"{
            "pow_limit": "0xfffff000000000000000000000000000000000000000000000000000000",
            "pos_limit": "0xfffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
            "pow_target_spacing": 60,
            "pow_target_timespan": 3600,
            "pow_no_retargeting": false,
            "last_pow_block": 250
        }"#;
        let params = ConsensusParams::from_json(json).unwrap();
        assert_eq!(params.pow_limit, MAINNET_POW_LIMIT);
        assert_eq!(params.pos_limit, MAINNET_POS_LIMIT);
        assert_eq!(params.last_pow_block, 250);
        assert_eq!(params.difficulty_adjustment_interval(), 60);
    }

    #[test]
    fn test_from_json_rejects_invalid_values() {
        let json = r#"{
            "pow_limit": "0x0",
            "pos_limit": "0xffff",
            "pow_target_spacing": 60,
            "pow_target_timespan": 3600,
            "pow_no_retargeting": false,
            "last_pow_block": 250
        }"#;
        assert!(matches!(
            ConsensusParams::from_json(json),
            Err(ParamsError::ZeroLimit("pow_limit"))
        ));

        assert!(matches!(
            ConsensusParams::from_json("{ \"pow_limit\": 5 }"),
            Err(ParamsError::Json(_))
        ));
    }

    #[test]
    fn test_network_presets_differ() {
        let regtest = Network::Regtest.params();
        let mainnet = Network::Mainnet.params();
        assert!(regtest.pow_no_retargeting);
        assert!(!mainnet.pow_no_retargeting);
        assert!(regtest.pow_limit > mainnet.pow_limit);
        assert_eq!(regtest.pow_target_spacing, mainnet.pow_target_spacing);
    }
}

#[cfg(test)]
mod header {
    use super::*;

    #[test]
    fn test_header_json_round_trip() {
        let header = BlockHeader {
            version: 2,
            previous_block_hash: hex!("6fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000"),
            merkle_root: hex!("3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a"),
            timestamp: 1_500_000_000,
            bits: 0x1e0f_ffff,
            nonce: 42,
            height: 9_999,
            is_proof_of_stake: false,
        };
        let json = serde_json::to_string(&header).unwrap();
        let parsed: BlockHeader = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, header);
        assert_eq!(parsed.hash(), header.hash());
    }

    #[test]
    fn test_pow_hash_matches_hash_bytes() {
        let header = BlockHeader {
            version: 1,
            previous_block_hash: [0u8; 32],
            merkle_root: [0u8; 32],
            timestamp: 0,
            bits: 0x207f_ffff,
            nonce: 0,
            height: 0,
            is_proof_of_stake: false,
        };
        assert_eq!(header.pow_hash(), U256::from_little_endian(&header.hash()));
    }
}
