//! External collaborators the core calls through but never owns
//! (spec.md §6.1/§6.2, §9 "global state → explicit capability").
//!
//! The teacher's `WorldStateTrie` (`world_state.rs`) is a concrete,
//! persistent, RLP/Merkle-backed implementation — exactly the kind of
//! thing spec.md §1 places out of scope ("the persistent world-state
//! database and its Merkle commitment"). This module keeps only the
//! *shape* of that capability (balance/nonce/code/storage/access-list/
//! snapshot accessors) as a trait boundary, the way spec.md §9 asks:
//! "an explicit `WorldState` capability threaded into every frame."

use crate::primitives::{Address, Bytes, Hash, Word};

/// A single EVM log entry (`LOG0..4`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<Hash>,
    pub data: Bytes,
}

/// Opaque snapshot handle returned by [`WorldState::snapshot`]. Callers
/// only ever pass it back to [`WorldState::revert_to`]; the world-state
/// implementation defines what it actually contains.
pub type SnapshotId = u64;

/// The state-database capability the interpreter and call engine are
/// threaded with. No implementation ships in this crate (persistence is an
/// explicit non-goal, spec.md §1); `#[cfg(test)]` callers use
/// [`tests::InMemoryWorldState`] below.
pub trait WorldState {
    fn balance(&self, address: Address) -> Word;
    fn add_balance(&mut self, address: Address, amount: Word);
    fn sub_balance(&mut self, address: Address, amount: Word);

    fn nonce(&self, address: Address) -> u64;
    fn set_nonce(&mut self, address: Address, nonce: u64);

    fn code(&self, address: Address) -> Bytes;
    fn code_size(&self, address: Address) -> usize {
        self.code(address).len()
    }
    fn code_hash(&self, address: Address) -> Hash;
    fn set_code(&mut self, address: Address, code: Bytes);

    fn account_exists(&self, address: Address) -> bool;
    fn account_is_empty(&self, address: Address) -> bool;

    /// Committed storage value (as of the start of the transaction).
    fn storage_committed(&self, address: Address, key: Word) -> Word;
    /// In-progress (possibly uncommitted-within-tx) storage value.
    fn storage(&self, address: Address, key: Word) -> Word;
    fn set_storage(&mut self, address: Address, key: Word, value: Word);

    fn transient_storage(&self, address: Address, key: Word) -> Word;
    fn set_transient_storage(&mut self, address: Address, key: Word, value: Word);

    fn add_refund(&mut self, amount: u64);
    fn sub_refund(&mut self, amount: u64);
    fn refund(&self) -> u64;

    fn is_address_warm(&self, address: Address) -> bool;
    fn mark_address_warm(&mut self, address: Address) -> bool;
    fn is_storage_warm(&self, address: Address, key: Word) -> bool;
    fn mark_storage_warm(&mut self, address: Address, key: Word) -> bool;

    fn snapshot(&mut self) -> SnapshotId;
    fn revert_to(&mut self, snapshot: SnapshotId);

    fn mark_self_destructed(&mut self, address: Address, beneficiary: Address);
    fn has_self_destructed(&self, address: Address) -> bool;
    /// True if `address` was created within the current transaction
    /// (EIP-6780 drives `SELFDESTRUCT`'s post-Cancun behaviour on this).
    fn created_this_tx(&self, address: Address) -> bool;

    fn emit_log(&mut self, log: Log);
}

/// Block-level context (spec.md §6.2).
pub trait BlockContext {
    fn coinbase(&self) -> Address;
    fn gas_limit(&self) -> u64;
    fn number(&self) -> u64;
    fn timestamp(&self) -> u64;
    fn prev_randao(&self) -> Hash;
    fn base_fee(&self) -> Word;
    fn blob_base_fee(&self) -> Word;
    fn excess_blob_gas(&self) -> u64;
    /// Historic block hash for `BLOCKHASH`; `None` outside `[n-256, n-1]`.
    fn get_hash(&self, number: u64) -> Option<Hash>;
}

/// Transaction-level context (spec.md §6.2). `chain_id` is injected here
/// rather than configured internally — chain configuration itself is out of
/// scope (spec.md §1), but `CHAINID` still needs a value from somewhere.
pub trait TxContext {
    fn origin(&self) -> Address;
    fn gas_price(&self) -> Word;
    fn blob_hashes(&self) -> &[Hash];
    fn tx_hash(&self) -> Hash;
    fn chain_id(&self) -> u64;
}

/// The full capability set a running frame needs (spec.md §6.1/§6.2):
/// world state plus block- and transaction-level context bundled behind
/// one trait object so the interpreter only has to thread one reference.
pub trait Host: WorldState + BlockContext + TxContext {}

impl<T: WorldState + BlockContext + TxContext> Host for T {}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    /// Minimal in-memory `WorldState` used only by this crate's own tests —
    /// not a shipped implementation (persistence is out of scope).
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryWorldState {
        pub balances: HashMap<Address, Word>,
        pub nonces: HashMap<Address, u64>,
        pub codes: HashMap<Address, Bytes>,
        pub storage: HashMap<(Address, Word), Word>,
        pub committed_storage: HashMap<(Address, Word), Word>,
        pub transient: HashMap<(Address, Word), Word>,
        pub warm_addresses: HashSet<Address>,
        pub warm_storage: HashSet<(Address, Word)>,
        pub refund: u64,
        pub self_destructed: HashSet<Address>,
        pub created_this_tx: HashSet<Address>,
        pub logs: Vec<Log>,
        snapshots: Vec<InMemoryWorldState>,
        next_snapshot_id: SnapshotId,
    }

    impl WorldState for InMemoryWorldState {
        fn balance(&self, address: Address) -> Word {
            self.balances.get(&address).copied().unwrap_or_default()
        }
        fn add_balance(&mut self, address: Address, amount: Word) {
            let entry = self.balances.entry(address).or_default();
            *entry += amount;
        }
        fn sub_balance(&mut self, address: Address, amount: Word) {
            let entry = self.balances.entry(address).or_default();
            *entry -= amount;
        }
        fn nonce(&self, address: Address) -> u64 {
            self.nonces.get(&address).copied().unwrap_or_default()
        }
        fn set_nonce(&mut self, address: Address, nonce: u64) {
            self.nonces.insert(address, nonce);
        }
        fn code(&self, address: Address) -> Bytes {
            self.codes.get(&address).cloned().unwrap_or_default()
        }
        fn code_hash(&self, address: Address) -> Hash {
            crate::primitives::keccak256(&self.code(address))
        }
        fn set_code(&mut self, address: Address, code: Bytes) {
            self.codes.insert(address, code);
        }
        fn account_exists(&self, address: Address) -> bool {
            self.balances.contains_key(&address)
                || self.nonces.contains_key(&address)
                || self.codes.contains_key(&address)
        }
        fn account_is_empty(&self, address: Address) -> bool {
            self.balance(address).is_zero() && self.nonce(address) == 0 && self.code(address).is_empty()
        }
        fn storage_committed(&self, address: Address, key: Word) -> Word {
            self.committed_storage.get(&(address, key)).copied().unwrap_or_default()
        }
        fn storage(&self, address: Address, key: Word) -> Word {
            self.storage.get(&(address, key)).copied().unwrap_or_default()
        }
        fn set_storage(&mut self, address: Address, key: Word, value: Word) {
            self.storage.insert((address, key), value);
        }
        fn transient_storage(&self, address: Address, key: Word) -> Word {
            self.transient.get(&(address, key)).copied().unwrap_or_default()
        }
        fn set_transient_storage(&mut self, address: Address, key: Word, value: Word) {
            self.transient.insert((address, key), value);
        }
        fn add_refund(&mut self, amount: u64) {
            self.refund += amount;
        }
        fn sub_refund(&mut self, amount: u64) {
            self.refund = self.refund.saturating_sub(amount);
        }
        fn refund(&self) -> u64 {
            self.refund
        }
        fn is_address_warm(&self, address: Address) -> bool {
            self.warm_addresses.contains(&address)
        }
        fn mark_address_warm(&mut self, address: Address) -> bool {
            !self.warm_addresses.insert(address)
        }
        fn is_storage_warm(&self, address: Address, key: Word) -> bool {
            self.warm_storage.contains(&(address, key))
        }
        fn mark_storage_warm(&mut self, address: Address, key: Word) -> bool {
            !self.warm_storage.insert((address, key))
        }
        fn snapshot(&mut self) -> SnapshotId {
            let id = self.next_snapshot_id;
            self.next_snapshot_id += 1;
            let mut clone = self.clone();
            clone.snapshots.clear();
            self.snapshots.push(clone);
            id
        }
        fn revert_to(&mut self, snapshot: SnapshotId) {
            let index = snapshot as usize;
            if index < self.snapshots.len() {
                let restored = self.snapshots[index].clone();
                let preserved_snapshots = std::mem::take(&mut self.snapshots);
                *self = restored;
                self.snapshots = preserved_snapshots;
                self.snapshots.truncate(index);
            }
        }
        fn mark_self_destructed(&mut self, address: Address, beneficiary: Address) {
            let bal = self.balance(address);
            self.add_balance(beneficiary, bal);
            self.balances.insert(address, Word::zero());
            self.self_destructed.insert(address);
        }
        fn has_self_destructed(&self, address: Address) -> bool {
            self.self_destructed.contains(&address)
        }
        fn created_this_tx(&self, address: Address) -> bool {
            self.created_this_tx.contains(&address)
        }
        fn emit_log(&mut self, log: Log) {
            self.logs.push(log);
        }
    }

    /// Bundles [`InMemoryWorldState`] with fixed block/tx context so tests
    /// have a single concrete [`super::Host`] to construct.
    #[derive(Debug, Clone, Default)]
    pub struct TestHost {
        pub world: InMemoryWorldState,
        pub coinbase: Address,
        pub gas_limit: u64,
        pub number: u64,
        pub timestamp: u64,
        pub prev_randao: Hash,
        pub base_fee: Word,
        pub blob_base_fee: Word,
        pub excess_blob_gas: u64,
        pub block_hashes: HashMap<u64, Hash>,
        pub origin: Address,
        pub gas_price: Word,
        pub blob_hashes: Vec<Hash>,
        pub tx_hash: Hash,
        pub chain_id: u64,
    }

    impl std::ops::Deref for TestHost {
        type Target = InMemoryWorldState;
        fn deref(&self) -> &Self::Target {
            &self.world
        }
    }
    impl std::ops::DerefMut for TestHost {
        fn deref_mut(&mut self) -> &mut Self::Target {
            &mut self.world
        }
    }

    impl WorldState for TestHost {
        fn balance(&self, address: Address) -> Word {
            self.world.balance(address)
        }
        fn add_balance(&mut self, address: Address, amount: Word) {
            self.world.add_balance(address, amount)
        }
        fn sub_balance(&mut self, address: Address, amount: Word) {
            self.world.sub_balance(address, amount)
        }
        fn nonce(&self, address: Address) -> u64 {
            self.world.nonce(address)
        }
        fn set_nonce(&mut self, address: Address, nonce: u64) {
            self.world.set_nonce(address, nonce)
        }
        fn code(&self, address: Address) -> Bytes {
            self.world.code(address)
        }
        fn code_hash(&self, address: Address) -> Hash {
            self.world.code_hash(address)
        }
        fn set_code(&mut self, address: Address, code: Bytes) {
            self.world.set_code(address, code)
        }
        fn account_exists(&self, address: Address) -> bool {
            self.world.account_exists(address)
        }
        fn account_is_empty(&self, address: Address) -> bool {
            self.world.account_is_empty(address)
        }
        fn storage_committed(&self, address: Address, key: Word) -> Word {
            self.world.storage_committed(address, key)
        }
        fn storage(&self, address: Address, key: Word) -> Word {
            self.world.storage(address, key)
        }
        fn set_storage(&mut self, address: Address, key: Word, value: Word) {
            self.world.set_storage(address, key, value)
        }
        fn transient_storage(&self, address: Address, key: Word) -> Word {
            self.world.transient_storage(address, key)
        }
        fn set_transient_storage(&mut self, address: Address, key: Word, value: Word) {
            self.world.set_transient_storage(address, key, value)
        }
        fn add_refund(&mut self, amount: u64) {
            self.world.add_refund(amount)
        }
        fn sub_refund(&mut self, amount: u64) {
            self.world.sub_refund(amount)
        }
        fn refund(&self) -> u64 {
            self.world.refund()
        }
        fn is_address_warm(&self, address: Address) -> bool {
            self.world.is_address_warm(address)
        }
        fn mark_address_warm(&mut self, address: Address) -> bool {
            self.world.mark_address_warm(address)
        }
        fn is_storage_warm(&self, address: Address, key: Word) -> bool {
            self.world.is_storage_warm(address, key)
        }
        fn mark_storage_warm(&mut self, address: Address, key: Word) -> bool {
            self.world.mark_storage_warm(address, key)
        }
        fn snapshot(&mut self) -> SnapshotId {
            self.world.snapshot()
        }
        fn revert_to(&mut self, snapshot: SnapshotId) {
            self.world.revert_to(snapshot)
        }
        fn mark_self_destructed(&mut self, address: Address, beneficiary: Address) {
            self.world.mark_self_destructed(address, beneficiary)
        }
        fn has_self_destructed(&self, address: Address) -> bool {
            self.world.has_self_destructed(address)
        }
        fn created_this_tx(&self, address: Address) -> bool {
            self.world.created_this_tx(address)
        }
        fn emit_log(&mut self, log: Log) {
            self.world.emit_log(log)
        }
    }

    impl BlockContext for TestHost {
        fn coinbase(&self) -> Address {
            self.coinbase
        }
        fn gas_limit(&self) -> u64 {
            self.gas_limit
        }
        fn number(&self) -> u64 {
            self.number
        }
        fn timestamp(&self) -> u64 {
            self.timestamp
        }
        fn prev_randao(&self) -> Hash {
            self.prev_randao
        }
        fn base_fee(&self) -> Word {
            self.base_fee
        }
        fn blob_base_fee(&self) -> Word {
            self.blob_base_fee
        }
        fn excess_blob_gas(&self) -> u64 {
            self.excess_blob_gas
        }
        fn get_hash(&self, number: u64) -> Option<Hash> {
            self.block_hashes.get(&number).copied()
        }
    }

    impl TxContext for TestHost {
        fn origin(&self) -> Address {
            self.origin
        }
        fn gas_price(&self) -> Word {
            self.gas_price
        }
        fn blob_hashes(&self) -> &[Hash] {
            &self.blob_hashes
        }
        fn tx_hash(&self) -> Hash {
            self.tx_hash
        }
        fn chain_id(&self) -> u64 {
            self.chain_id
        }
    }
}
