//! Global string interner
//!
//! Object, material and node-group names are stored as integer [`Symbol`]s.
//! Watchers keep symbols across runs instead of references into the scene,
//! and compare them in O(1).

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Compact integer identifier of an interned name.
pub type Symbol = Spur;

/// Node group that marks the output of an MToon material.
pub const MTOON_OUTPUT_GROUP: &str = "MToon1 Output";

/// Node group holding the actual MToon shading network.
pub const MTOON_SHADER_GROUP: &str = "MToon1 Shader";

/// Interns a string, returning the existing symbol if already present.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up the symbol of an already interned string without allocating.
#[inline]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a symbol back to its string.
///
/// # Panics
/// Panics if `sym` was not produced by this interner.
#[inline]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

/// Interns the node-group names the watchers match against, keeping the
/// interner write lock off the scan path.
pub fn preload_common_names() {
    for name in [MTOON_OUTPUT_GROUP, MTOON_SHADER_GROUP] {
        intern(name);
    }
}
