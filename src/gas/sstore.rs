//! `SSTORE` net-gas accounting (EIP-2200 dirty-slot tracking, EIP-2929
//! warm/cold surcharges, EIP-3529 reduced clearing refund) — spec.md §4.E:
//! "`SSTORE` follows net-gas accounting (EIP-2200 / EIP-3529) with
//! warm/cold slot surcharges from the access list; refunds are capped at
//! `gas_used / 5` post-London."
//!
//! Has no counterpart in the teacher, whose `operations.rs` only ever
//! implements `ADD`; built fresh against the well-known go-ethereum
//! `gasSStoreEIP2929` reference algorithm, re-expressed against this
//! crate's [`super::constants`].

use super::constants::*;
use crate::chain_rules::ChainRules;
use crate::primitives::Word;

/// The refund adjustment an `SSTORE` makes, applied by the caller via
/// [`crate::host::WorldState::add_refund`]/[`crate::host::WorldState::sub_refund`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundDelta {
    None,
    Add(u64),
    Sub(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SstoreGas {
    pub gas_cost: u64,
    pub refund: RefundDelta,
}

/// EIP-2200's reentrancy sentry: below this much gas remaining, `SSTORE`
/// fails outright (so a call can never leave less than a stipend's worth
/// of gas for a callee to perform a state-changing reentrant `SSTORE`).
/// Only enforced from Istanbul onward.
pub fn sstore_sentry_ok(rules: ChainRules, gas_left: u64) -> bool {
    !rules.is_istanbul() || gas_left > SSTORE_SENTRY_GAS
}

/// Computes the gas cost and refund adjustment for writing `new` to a slot
/// currently holding `current`, whose value at the start of the
/// transaction was `original`. `already_warm` reflects the access list
/// *before* this call (the cold surcharge, if any, is folded into
/// `gas_cost`; the caller is still responsible for marking the slot warm).
pub fn sstore_cost(rules: ChainRules, already_warm: bool, current: Word, original: Word, new: Word) -> SstoreGas {
    if !rules.is_berlin() {
        return sstore_cost_legacy(rules, current, original, new);
    }

    let cold_surcharge = if already_warm { 0 } else { COLD_SLOAD };

    if current == new {
        return SstoreGas {
            gas_cost: cold_surcharge + WARM_STORAGE_READ,
            refund: RefundDelta::None,
        };
    }

    let clears_refund = if rules.is_london() {
        SSTORE_CLEARS_REFUND
    } else {
        SSTORE_CLEARS_REFUND_PRE_LONDON
    };

    if original == current {
        if original.is_zero() {
            return SstoreGas {
                gas_cost: cold_surcharge + SSTORE_SET,
                refund: RefundDelta::None,
            };
        }
        let refund = if new.is_zero() {
            RefundDelta::Add(clears_refund)
        } else {
            RefundDelta::None
        };
        return SstoreGas {
            gas_cost: cold_surcharge + (SSTORE_RESET - COLD_SLOAD),
            refund,
        };
    }

    // Dirty update: the slot already diverged from its original value this
    // transaction. Reconcile any refund a prior write in this tx already
    // granted or charged before deciding what this write does.
    let mut refund = RefundDelta::None;
    if !original.is_zero() {
        if current.is_zero() {
            refund = RefundDelta::Sub(clears_refund);
        } else if new.is_zero() {
            refund = RefundDelta::Add(clears_refund);
        }
    }

    if original == new {
        refund = if original.is_zero() {
            RefundDelta::Add(SSTORE_SET - WARM_STORAGE_READ)
        } else {
            RefundDelta::Add(SSTORE_RESET - COLD_SLOAD - WARM_STORAGE_READ)
        };
    }

    SstoreGas {
        gas_cost: cold_surcharge + WARM_STORAGE_READ,
        refund,
    }
}

/// Pre-Berlin (no access list) net-gas accounting: EIP-2200 without the
/// EIP-2929 cold surcharge, and the EIP-3529 reduced clearing refund only
/// once London is active.
fn sstore_cost_legacy(rules: ChainRules, current: Word, original: Word, new: Word) -> SstoreGas {
    if current == new {
        return SstoreGas {
            gas_cost: SLOAD_FRONTIER,
            refund: RefundDelta::None,
        };
    }
    let clears_refund = if rules.is_london() {
        SSTORE_CLEARS_REFUND
    } else {
        SSTORE_CLEARS_REFUND_PRE_LONDON
    };
    if original == current {
        if original.is_zero() {
            return SstoreGas {
                gas_cost: SSTORE_SET,
                refund: RefundDelta::None,
            };
        }
        let refund = if new.is_zero() {
            RefundDelta::Add(clears_refund)
        } else {
            RefundDelta::None
        };
        return SstoreGas {
            gas_cost: SSTORE_RESET,
            refund,
        };
    }
    SstoreGas {
        gas_cost: SLOAD_FRONTIER,
        refund: RefundDelta::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_rules::Hardfork;

    fn w(v: u64) -> Word {
        Word::from(v)
    }

    #[test]
    fn noop_write_is_warm_read_cost() {
        let rules = ChainRules::new(Hardfork::London);
        let r = sstore_cost(rules, true, w(5), w(5), w(5));
        assert_eq!(r.gas_cost, WARM_STORAGE_READ);
        assert_eq!(r.refund, RefundDelta::None);
    }

    #[test]
    fn create_slot_from_zero_cold() {
        let rules = ChainRules::new(Hardfork::London);
        let r = sstore_cost(rules, false, w(0), w(0), w(1));
        assert_eq!(r.gas_cost, COLD_SLOAD + SSTORE_SET);
        assert_eq!(r.refund, RefundDelta::None);
    }

    #[test]
    fn dirty_update_existing_slot_warm_costs_2900() {
        let rules = ChainRules::new(Hardfork::London);
        let r = sstore_cost(rules, true, w(1), w(1), w(2));
        assert_eq!(r.gas_cost, 2900);
    }

    #[test]
    fn dirty_update_existing_slot_cold_costs_5000() {
        let rules = ChainRules::new(Hardfork::London);
        let r = sstore_cost(rules, false, w(1), w(1), w(2));
        assert_eq!(r.gas_cost, 5000);
    }

    #[test]
    fn clearing_existing_slot_grants_post_london_refund() {
        let rules = ChainRules::new(Hardfork::London);
        let r = sstore_cost(rules, true, w(1), w(1), w(0));
        assert_eq!(r.refund, RefundDelta::Add(SSTORE_CLEARS_REFUND));
    }

    #[test]
    fn clearing_existing_slot_pre_london_grants_larger_refund() {
        let rules = ChainRules::new(Hardfork::Berlin);
        let r = sstore_cost(rules, true, w(1), w(1), w(0));
        assert_eq!(r.refund, RefundDelta::Add(SSTORE_CLEARS_REFUND_PRE_LONDON));
    }

    #[test]
    fn resetting_to_original_nonzero_refunds_difference() {
        let rules = ChainRules::new(Hardfork::London);
        // original=1, current=2 (dirtied earlier this tx), now reset to 1.
        let r = sstore_cost(rules, true, w(2), w(1), w(1));
        assert_eq!(r.gas_cost, WARM_STORAGE_READ);
        assert_eq!(r.refund, RefundDelta::Add(SSTORE_RESET - COLD_SLOAD - WARM_STORAGE_READ));
    }

    #[test]
    fn resetting_to_original_zero_refunds_set_cost() {
        let rules = ChainRules::new(Hardfork::London);
        // original=0, current=1 (created earlier this tx), now reset to 0.
        let r = sstore_cost(rules, true, w(1), w(0), w(0));
        assert_eq!(r.refund, RefundDelta::Add(SSTORE_SET - WARM_STORAGE_READ));
    }

    #[test]
    fn recreating_a_previously_cleared_slot_reverses_refund() {
        let rules = ChainRules::new(Hardfork::London);
        // original=1, current=0 (cleared earlier this tx, refund granted),
        // now written back to a non-original, non-zero value.
        let r = sstore_cost(rules, true, w(0), w(1), w(9));
        assert_eq!(r.refund, RefundDelta::Sub(SSTORE_CLEARS_REFUND));
    }

    #[test]
    fn sentry_rejects_low_gas_from_istanbul_onward() {
        assert!(!sstore_sentry_ok(ChainRules::new(Hardfork::Istanbul), SSTORE_SENTRY_GAS));
        assert!(sstore_sentry_ok(ChainRules::new(Hardfork::Istanbul), SSTORE_SENTRY_GAS + 1));
        assert!(sstore_sentry_ok(ChainRules::new(Hardfork::Byzantium), 0));
    }
}
