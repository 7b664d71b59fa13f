//! Process-wide read-only engine data.
//!
//! Attack tables, Zobrist keys and the evaluation table are built once by
//! `EngineTables::build` and handed to every `Position` through an `Arc`.
//! Nothing in the crate reaches for them through a global.

use std::fmt;
use std::sync::Arc;

use crate::moves::attack_tables::AttackTables;
use crate::search::board_scoring::MaterialDevelopmentTable;
use crate::search::zobrist::{ZobristKeys, DEFAULT_ZOBRIST_SEED};

pub struct EngineTables {
    pub attacks: AttackTables,
    pub zobrist: ZobristKeys,
    pub scoring: MaterialDevelopmentTable,
}

impl EngineTables {
    pub fn build() -> Arc<Self> {
        Arc::new(Self {
            attacks: AttackTables::build(),
            zobrist: ZobristKeys::build(DEFAULT_ZOBRIST_SEED),
            scoring: MaterialDevelopmentTable::build(),
        })
    }

    /// One table set shared by every test in the binary.
    #[cfg(test)]
    pub(crate) fn shared_for_tests() -> &'static Arc<Self> {
        use std::sync::OnceLock;
        static SHARED: OnceLock<Arc<EngineTables>> = OnceLock::new();
        SHARED.get_or_init(Self::build)
    }
}

impl fmt::Debug for EngineTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineTables").finish_non_exhaustive()
    }
}
