//! Hard-fork snapshot consumed to select the instruction table and
//! precompile set (spec.md §3 `ChainRules`, §4.F/N).
//!
//! The teacher hardcodes a single `precompiled_contracts_berlin()` registry
//! (`operations.rs`); this generalizes that single fork snapshot into the
//! full, ordered list spec.md names, with each later fork implying every
//! earlier one (a `ChainRules` is only ever "at least this fork").

/// Every historic hard fork this crate's instruction tables and precompile
/// registry know how to select between (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Hardfork {
    Frontier = 0,
    Homestead,
    TangerineWhistle,
    SpuriousDragon,
    Byzantium,
    Constantinople,
    Petersburg,
    Istanbul,
    Berlin,
    London,
    Shanghai,
    Cancun,
    Prague,
    Osaka,
}

impl Hardfork {
    pub const LATEST: Hardfork = Hardfork::Osaka;

    /// Fork-ordered list, oldest first — used to build instruction tables
    /// by applying each `enable_*` mutator in turn (spec.md §4.F/N).
    pub const ALL: [Hardfork; 14] = [
        Hardfork::Frontier,
        Hardfork::Homestead,
        Hardfork::TangerineWhistle,
        Hardfork::SpuriousDragon,
        Hardfork::Byzantium,
        Hardfork::Constantinople,
        Hardfork::Petersburg,
        Hardfork::Istanbul,
        Hardfork::Berlin,
        Hardfork::London,
        Hardfork::Shanghai,
        Hardfork::Cancun,
        Hardfork::Prague,
        Hardfork::Osaka,
    ];
}

/// An immutable snapshot of which hard fork is active. Produced by the
/// outer chain-config loader (out of scope here) and consumed to pick the
/// instruction table and precompile set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainRules {
    fork: Hardfork,
}

impl ChainRules {
    pub const fn new(fork: Hardfork) -> Self {
        Self { fork }
    }

    pub const fn latest() -> Self {
        Self::new(Hardfork::LATEST)
    }

    pub fn fork(&self) -> Hardfork {
        self.fork
    }

    /// True if `self`'s active fork is `other` or any fork after it.
    pub fn is_active(&self, other: Hardfork) -> bool {
        self.fork >= other
    }

    pub fn is_homestead(&self) -> bool {
        self.is_active(Hardfork::Homestead)
    }
    pub fn is_tangerine_whistle(&self) -> bool {
        self.is_active(Hardfork::TangerineWhistle)
    }
    pub fn is_spurious_dragon(&self) -> bool {
        self.is_active(Hardfork::SpuriousDragon)
    }
    pub fn is_byzantium(&self) -> bool {
        self.is_active(Hardfork::Byzantium)
    }
    pub fn is_constantinople(&self) -> bool {
        self.is_active(Hardfork::Constantinople)
    }
    pub fn is_petersburg(&self) -> bool {
        self.is_active(Hardfork::Petersburg)
    }
    pub fn is_istanbul(&self) -> bool {
        self.is_active(Hardfork::Istanbul)
    }
    pub fn is_berlin(&self) -> bool {
        self.is_active(Hardfork::Berlin)
    }
    pub fn is_london(&self) -> bool {
        self.is_active(Hardfork::London)
    }
    pub fn is_shanghai(&self) -> bool {
        self.is_active(Hardfork::Shanghai)
    }
    pub fn is_cancun(&self) -> bool {
        self.is_active(Hardfork::Cancun)
    }
    pub fn is_prague(&self) -> bool {
        self.is_active(Hardfork::Prague)
    }
    pub fn is_osaka(&self) -> bool {
        self.is_active(Hardfork::Osaka)
    }

    /// Cache key for the instruction-table cache (spec.md §9): the
    /// concatenation of active-fork flags collapses to just the ordinal,
    /// since forks are monotonic.
    pub fn cache_key(&self) -> u8 {
        self.fork as u8
    }
}

impl Default for ChainRules {
    fn default() -> Self {
        Self::latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_fork_implies_earlier_ones() {
        let rules = ChainRules::new(Hardfork::London);
        assert!(rules.is_berlin());
        assert!(rules.is_london());
        assert!(!rules.is_shanghai());
    }

    #[test]
    fn cache_key_is_monotonic_with_fork_order() {
        let a = ChainRules::new(Hardfork::Berlin).cache_key();
        let b = ChainRules::new(Hardfork::London).cache_key();
        assert!(b > a);
    }
}
