//! Gas accounting (spec.md §4.E): memory expansion cost lives on
//! [`crate::memory::Memory`] directly since it needs the per-frame cache;
//! everything else — refunds, warm/cold surcharges, the 63/64 call-gas
//! rule, `SSTORE` net-gas accounting, intrinsic gas — lives here.

pub mod constants;
pub mod intrinsic;
pub mod sstore;

use crate::chain_rules::ChainRules;

/// Caps a transaction's accumulated refund counter at `gas_used /
/// quotient`, where the quotient is `5` post-London and `2` before
/// (spec.md §4.E, §9 refund-counter glossary entry).
pub fn cap_refund(rules: ChainRules, gas_used: u64, refund: u64) -> u64 {
    let quotient = if rules.is_london() {
        constants::MAX_REFUND_QUOTIENT_LONDON
    } else {
        constants::MAX_REFUND_QUOTIENT_PRE_LONDON
    };
    refund.min(gas_used / quotient)
}

/// The 63/64 rule (EIP-150): a call forwards at most
/// `available - available/64` of the caller's remaining gas, capped by
/// what the caller explicitly requested.
pub fn call_gas_forwarded(requested: u64, available: u64) -> u64 {
    let retained = available / constants::CALL_GAS_RETENTION_DIVISOR;
    let max_forwardable = available.saturating_sub(retained);
    requested.min(max_forwardable)
}

/// Warm/cold surcharge for touching `address`/`(address, slot)` the first
/// time in a transaction (spec.md §4.E — `SLOAD`/`BALANCE`/`EXTCODE*`/
/// `CALL` etc.). Returns `(gas_cost, now_warm)`; the caller is responsible
/// for actually marking the target warm in the world state.
pub fn access_cost(already_warm: bool) -> u64 {
    if already_warm {
        constants::WARM_STORAGE_READ
    } else {
        constants::COLD_ACCOUNT_ACCESS
    }
}

/// Same idea specialized to storage slots, whose cold cost differs from
/// the cold *account* access cost pre-Berlin-vs-Berlin nuance spec.md
/// §4.E lists for `SLOAD`.
pub fn storage_access_cost(rules: ChainRules, already_warm: bool) -> u64 {
    if !rules.is_berlin() {
        return constants::SLOAD_FRONTIER;
    }
    if already_warm {
        constants::WARM_STORAGE_READ
    } else {
        constants::COLD_SLOAD
    }
}

/// `BALANCE`/`EXTCODESIZE`/`EXTCODECOPY`/`EXTCODEHASH`'s account-access cost
/// across forks: a flat fee pre-Berlin (itself repriced once by EIP-150),
/// the warm/cold access-list split from Berlin on (spec.md §4.E).
pub fn account_access_cost(rules: ChainRules, already_warm: bool) -> u64 {
    if rules.is_berlin() {
        access_cost(already_warm)
    } else if rules.is_tangerine_whistle() {
        constants::ACCOUNT_ACCESS_TANGERINE
    } else {
        constants::ACCOUNT_ACCESS_FRONTIER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_rules::Hardfork;

    #[test]
    fn call_gas_forwards_63_64ths() {
        assert_eq!(call_gas_forwarded(u64::MAX, 6400), 6400 - 100);
        assert_eq!(call_gas_forwarded(10, 6400), 10);
    }

    #[test]
    fn refund_capped_by_fork() {
        let london = ChainRules::new(Hardfork::London);
        let byzantium = ChainRules::new(Hardfork::Byzantium);
        assert_eq!(cap_refund(london, 100, 1000), 20);
        assert_eq!(cap_refund(byzantium, 100, 1000), 50);
    }
}
