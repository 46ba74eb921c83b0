//! Call data for the strategy NFT contract.

use alloy_primitives::Bytes;
use alloy_sol_types::{SolCall, sol};

sol! {
    /// Mints a strategy NFT carrying the strategy payload.
    function mintStrategy(string strategy) external returns (uint256 tokenId);
}

/// ABI-encode a `mintStrategy(string)` call for the given payload.
pub fn encode_mint(payload: &str) -> Bytes {
    mintStrategyCall {
        strategy: payload.to_string(),
    }
    .abi_encode()
    .into()
}
