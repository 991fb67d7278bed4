//! Intrinsic gas and the EIP-7623 calldata floor (spec.md §6.3, §8 S6).
//!
//! Directly generalizes the teacher's `vm.rs::intrinsic_gas` (base
//! 53000/21000, EIP-2028 zero/non-zero byte pricing, EIP-3860 init-code
//! word cost, EIP-2930 access-list pricing) into an exported, fork-aware
//! helper, plus the floor-cost comparison Pectra adds.

use super::constants::*;
use crate::chain_rules::ChainRules;

fn calldata_token_counts(calldata: &[u8]) -> (u64, u64) {
    let zeros = calldata.iter().filter(|b| **b == 0).count() as u64;
    let non_zeros = calldata.len() as u64 - zeros;
    (zeros, non_zeros)
}

fn word_count(len: usize) -> u64 {
    ((len as u64) + 31) / 32
}

/// Calldata at or above this length is priced under the EIP-7623 floor
/// instead of the post-Istanbul per-byte rate (spec.md §8 S6, "floor
/// inactive below 4 KiB threshold").
const FLOOR_LENGTH_THRESHOLD: usize = 4096;

/// `spec.md §6.3 intrinsic_gas(calldata, access_list, is_creation, rules)`.
///
/// Includes the EIP-7623 floor-cost pricing once Pectra (Prague) is
/// active: the transaction pays `max(standard_intrinsic, floor_cost)`.
pub fn intrinsic_gas(
    calldata: &[u8],
    access_list_addresses: usize,
    access_list_storage_keys: usize,
    is_creation: bool,
    rules: ChainRules,
) -> u64 {
    let base = if is_creation { TX_CREATE } else { TX_BASE };
    let mut gas = base + standard_calldata_cost(calldata, rules);

    if is_creation && rules.is_shanghai() {
        gas += word_count(calldata.len()) * INITCODE_WORD_COST;
    }

    gas += access_list_addresses as u64 * TX_ACCESS_LIST_ADDRESS;
    gas += access_list_storage_keys as u64 * TX_ACCESS_LIST_STORAGE_KEY;

    if rules.is_prague() {
        gas.max(base + calldata_floor_data_cost(calldata))
    } else {
        gas
    }
}

fn standard_calldata_cost(calldata: &[u8], rules: ChainRules) -> u64 {
    let (zeros, non_zeros) = calldata_token_counts(calldata);
    let non_zero_cost = if rules.is_istanbul() {
        TX_DATA_NON_ZERO
    } else {
        TX_DATA_NON_ZERO_FRONTIER
    };
    zeros * TX_DATA_ZERO + non_zeros * non_zero_cost
}

/// EIP-7623 floor, data-only (excludes the `21000`/`53000` transaction
/// base). Below [`FLOOR_LENGTH_THRESHOLD`] it is defined to equal the
/// standard post-Istanbul cost, so it never binds for ordinary-sized
/// calldata. At or above the threshold, non-zero bytes are re-priced at
/// the pre-Istanbul rate (`TX_DATA_NON_ZERO_FRONTIER`, 68 gas) — the floor
/// reinstates the worst-case pre-EIP-2028 cost so cheap calldata can't be
/// used to grief block space — while zero bytes are unchanged.
pub fn calldata_floor_data_cost(calldata: &[u8]) -> u64 {
    let (zeros, non_zeros) = calldata_token_counts(calldata);
    if calldata.len() < FLOOR_LENGTH_THRESHOLD {
        return zeros * TX_DATA_ZERO + non_zeros * TX_DATA_NON_ZERO;
    }
    zeros * TX_DATA_ZERO + non_zeros * TX_DATA_NON_ZERO_FRONTIER
}

/// Public alias matching spec.md §6.3's `calldata_floor_cost`, including
/// the transaction base — used by callers that need the standalone floor
/// rather than folding it into [`intrinsic_gas`].
pub fn calldata_floor_cost(calldata: &[u8]) -> u64 {
    TX_BASE + calldata_floor_data_cost(calldata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_rules::Hardfork;

    #[test]
    fn seed_scenario_s6_floor_binds_above_threshold() {
        // 5000 all-non-zero bytes: standard data cost = 80000, Pectra floor
        // data cost = 340000; intrinsic_gas returns base + max(standard,
        // floor) = 21000 + 340000.
        let calldata = vec![1u8; 5000];

        let standard_data = standard_calldata_cost(&calldata, ChainRules::new(Hardfork::Berlin));
        assert_eq!(standard_data, 80000);

        let floor_data = calldata_floor_data_cost(&calldata);
        assert_eq!(floor_data, 5000 * TX_DATA_NON_ZERO_FRONTIER);
        assert_eq!(floor_data, 340000);

        let pre_pectra = intrinsic_gas(&calldata, 0, 0, false, ChainRules::new(Hardfork::Berlin));
        assert_eq!(pre_pectra, TX_BASE + standard_data);

        let pectra_cost = intrinsic_gas(&calldata, 0, 0, false, ChainRules::new(Hardfork::Prague));
        assert_eq!(pectra_cost, TX_BASE + 340000);
    }

    #[test]
    fn seed_scenario_s6_small_calldata_floor_inactive() {
        // 100 zero bytes is below the 4 KiB threshold: pre- and
        // post-Pectra data cost is identical (400), so the floor never
        // binds.
        let calldata = vec![0u8; 100];

        let standard_data = standard_calldata_cost(&calldata, ChainRules::new(Hardfork::Berlin));
        let floor_data = calldata_floor_data_cost(&calldata);
        assert_eq!(standard_data, 400);
        assert_eq!(floor_data, 400);

        let pre_pectra = intrinsic_gas(&calldata, 0, 0, false, ChainRules::new(Hardfork::Berlin));
        let pectra_cost = intrinsic_gas(&calldata, 0, 0, false, ChainRules::new(Hardfork::Prague));
        assert_eq!(pre_pectra, 21000 + 400);
        assert_eq!(pectra_cost, 21000 + 400);
    }
}
