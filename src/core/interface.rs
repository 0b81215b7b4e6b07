//! Solidity declarations shared by the dispatcher and the signers
//!
//! Selectors, ABI layouts and typed-data type hashes are all generated from
//! these declarations, so off-engine tooling built from the same ABI agrees
//! with the engine byte for byte.

use alloy_sol_types::sol;

sol! {
    /// Operations reachable through the multisig dispatcher
    #[derive(Debug, PartialEq, Eq)]
    interface IStakingClaim {
        function createClaimData(
            address claimant,
            uint48 claimableTimestamp,
            uint256 amount,
            bytes32 accessKey
        ) external;

        function createClaimDataMultiple(
            address[] calldata claimants,
            uint48[] calldata claimableTimestamps,
            uint256[] calldata amounts,
            bytes32[] calldata accessKeys
        ) external;

        function changeOwner(address oldOwner, address newOwner) external;
    }

    /// Message every owner signs to authorize one call
    #[derive(Debug, PartialEq, Eq)]
    struct FunctionCall {
        uint256 nonce;
        bytes4 selector;
        bytes inputData;
    }
}
