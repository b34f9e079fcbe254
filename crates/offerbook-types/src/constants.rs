//! System-wide constants for the offerbook engine.

/// First id handed out by a fresh allocator. `0` is reserved as null.
pub const FIRST_OFFER_ID: u64 = 1;

/// Default initial offer capacity reserved per category.
pub const DEFAULT_CATEGORY_CAPACITY: usize = 64;

/// Upper bound accepted for `category_capacity` in configuration.
pub const MAX_CATEGORY_CAPACITY: usize = 1 << 20;

/// Default `EnvFilter` directive for the log subscriber.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Domain separator for chain digests.
pub const CHAIN_DIGEST_DOMAIN: &[u8] = b"offerbook:chain:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Offerbook";
