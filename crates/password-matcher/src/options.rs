use serde::Deserialize;

/// Default maximum iteration count accepted for salted digest secrets.
///
/// Stored records commonly use 1 (credentials-service `sha-*` secrets) up to a few tens of
/// thousands. This default leaves headroom while refusing records that ask for billions of
/// digest rounds (CPU DoS).
pub const DEFAULT_MAX_ITERATIONS: u32 = 1_000_000;

/// Default maximum bcrypt cost factor (each step doubles the work).
pub const DEFAULT_MAX_BCRYPT_COST: u32 = 10;

/// Default maximum Argon2 memory cost in KiB (64 MiB).
pub const DEFAULT_MAX_ARGON2_MEMORY_KIB: u32 = 64 * 1024;

/// Default maximum Argon2 time cost (passes over memory).
pub const DEFAULT_MAX_ARGON2_ITERATIONS: u32 = 10;

/// Default maximum Argon2 degree of parallelism (lanes).
pub const DEFAULT_MAX_ARGON2_PARALLELISM: u32 = 4;

/// Options controlling which matchers are registered by default and how much work a single
/// secret may demand.
///
/// Deserializable so services can embed it in their own configuration; missing keys take the
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VerifierOptions {
    /// Upper bound for the `iterations` field of salted digest secrets.
    pub max_iterations: u32,
    /// Upper bound for the cost embedded in bcrypt hashes.
    pub max_bcrypt_cost: u32,
    pub max_argon2_memory_kib: u32,
    pub max_argon2_iterations: u32,
    pub max_argon2_parallelism: u32,
    /// Register the `plain` matcher for legacy unhashed records.
    pub allow_plain: bool,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_bcrypt_cost: DEFAULT_MAX_BCRYPT_COST,
            max_argon2_memory_kib: DEFAULT_MAX_ARGON2_MEMORY_KIB,
            max_argon2_iterations: DEFAULT_MAX_ARGON2_ITERATIONS,
            max_argon2_parallelism: DEFAULT_MAX_ARGON2_PARALLELISM,
            allow_plain: true,
        }
    }
}
