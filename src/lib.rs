//! # DEX Ledger
//!
//! Deterministic AMM pool engine and staking-rewards ledger.
//!
//! The crate is a sequential state machine: callers submit operations, the
//! ledger validates them, moves balances through an injected asset ledger
//! and returns a typed outcome with the domain events it emitted.  A failed
//! operation changes nothing.
//!
//! - **Pools**: weighted constant product, StableSwap and liquidity
//!   bootstrapping, with LP tokens and a three-way fee split.
//! - **Staking**: reward pools with time-locked positions, reward
//!   multipliers, early-unstake penalties and share-based accrual.
//! - **Projection**: an event fold producing pool and position read models.
//!
//! ## Provide liquidity and trade
//!
//! ```rust
//! use dex_ledger::prelude::*;
//!
//! let alice = AccountId::from_bytes([1u8; 32]);
//! let (usdt, dot) = (AssetId::new(1), AssetId::new(2));
//!
//! let mut ledger = Ledger::from_config(LedgerConfig::default());
//! for asset in [usdt, dot] {
//!     ledger.assets_mut().mint(asset, &alice, Amount::new(10_000_000)).expect("minted");
//! }
//!
//! // 1. A 50/50 pool charging 15%, as the fee tests do.
//! let pair = AssetPair::new(usdt, dot).expect("distinct assets");
//! let fee = FeeConfig::new(150_000, 0, 0).expect("valid fee");
//! let config = PoolConfig::ConstantProduct(
//!     ConstantProductConfig::balanced(pair, fee).expect("valid config"),
//! );
//! let pool = ledger.create_pool(alice, alice, config).expect("created").outcome;
//!
//! // 2. Seed it.
//! ledger
//!     .add_liquidity(alice, pool, Amount::new(5_000_000), Amount::new(5_000_000), Amount::ZERO, true)
//!     .expect("seeded");
//!
//! // 3. Sell 1 000 USDT for DOT; the fee is taken from the input.
//! let trade = ledger
//!     .sell(alice, pool, usdt, Amount::new(1_000), Amount::ZERO, true)
//!     .expect("sold")
//!     .outcome;
//! assert_eq!(trade.fee.fee, Amount::new(150));
//! assert!(trade.base_amount <= Amount::new(850));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    Ledger     │  façade: clock, assets, authority, projector
//! └──────┬───────┘
//!        │ CallContext
//!        ▼
//! ┌──────────────┐      ┌───────────────────────┐
//! │ PoolRegistry  │      │ StakingRewardsLedger   │
//! └──────┬───────┘      └───────────────────────┘
//!        │ PoolFactory / Pool (enum dispatch)
//!        ▼
//! ┌──────────────┐
//! │    Pools      │  ConstantProduct, StableSwap, LiquidityBootstrapping
//! └──────┬───────┘
//!        │ SwapPool + LiquidityPool traits
//!        ▼
//! ┌──────────────┐
//! │ Domain / Math │  Amount, Permill, Fee, Sale, U256 mul-div, solvers
//! └──────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`Amount`](domain::Amount), [`Permill`](domain::Permill), [`FeeConfig`](domain::FeeConfig), ids |
//! | [`math`] | Checked and widened arithmetic, weighted and StableSwap solvers |
//! | [`config`] | Validated pool and reward-pool configs, [`LedgerConfig`](config::LedgerConfig) |
//! | [`traits`] | [`SwapPool`](traits::SwapPool), [`LiquidityPool`](traits::LiquidityPool) and the [`Assets`](traits::Assets), [`Clock`](traits::Clock), [`Authority`](traits::Authority) seams |
//! | [`env`] | In-memory collaborators |
//! | [`pools`] | Pool strategies and the [`Pool`](pools::Pool) dispatch enum |
//! | [`factory`] | [`PoolFactory`](factory::PoolFactory) |
//! | [`registry`] | [`PoolRegistry`](registry::PoolRegistry) and LP balances |
//! | [`staking`] | [`StakingRewardsLedger`](staking::StakingRewardsLedger) |
//! | [`events`] | [`Event`](events::Event) and [`Receipt`](events::Receipt) |
//! | [`projector`] | [`EventProjector`](projector::EventProjector) read models |
//! | [`ledger`] | [`Ledger`](ledger::Ledger) façade |
//! | [`logger`] | `tracing` subscriber setup |
//! | [`error`] | [`LedgerError`](error::LedgerError) |
//! | [`prelude`] | Convenience re-exports |

pub mod config;
pub mod context;
pub mod domain;
pub mod env;
pub mod error;
pub mod events;
pub mod factory;
pub mod ledger;
pub mod logger;
pub mod math;
pub mod pools;
pub mod prelude;
pub mod projector;
pub mod registry;
pub mod staking;
pub mod traits;
