//! In-memory collaborators for tests, demos and embedding without a runtime.

mod assets;
mod authority;
mod clock;

pub use assets::InMemoryAssets;
pub use authority::PolicyAuthority;
pub use clock::ManualClock;
