//! Core services.
//!
//! Services hold the business logic and talk to storage only through the
//! traits in [`crate::store`].

pub mod cache;
pub mod evaluation;
pub mod key_allocator;
pub mod provisioning;

pub use cache::{CacheError, CacheKey, FlagStatusCache, InProcessFlagStatusCache};
pub use evaluation::EvaluationResolver;
pub use key_allocator::{
    KeyAllocator, ProjectKeyGenerator, RandomKeyGenerator, DEFAULT_KEY_ALLOCATION_ATTEMPTS,
};
pub use provisioning::{ProvisionedEnvironment, ProvisionedFlag, ProvisioningCoordinator};
