//! Pool instantiation via the factory pattern.
//!
//! [`PoolFactory`] builds a [`Pool`](crate::pools::Pool) from a
//! [`PoolConfig`](crate::config::PoolConfig), validating the configuration
//! and dispatching to the matching pool constructor.

mod pool_factory;

pub use pool_factory::PoolFactory;
