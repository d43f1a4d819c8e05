//! End-to-end walkthrough of the ledger.
//!
//! Creates a constant product pool, seeds and trades it, then opens a
//! reward pool, stakes, lets a lock period elapse and unstakes.  Every
//! receipt's events are printed and folded into the attached projection.
//!
//! # Run
//!
//! ```bash
//! RUST_LOG=debug cargo run --example lifecycle
//! ```

use std::collections::BTreeMap;

use dex_ledger::config::{
    ConstantProductConfig, LedgerConfig, LockConfig, PoolConfig, RewardConfig, RewardPoolConfig,
    RewardRate,
};
use dex_ledger::domain::{AccountId, Amount, AssetId, AssetPair, FeeConfig, Perbill, Permill};
use dex_ledger::ledger::Ledger;
use dex_ledger::logger::setup_logger;
use dex_ledger::traits::{Assets, Clock};

const THIRTY_DAYS: u64 = 2_592_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logger();
    println!("=== DEX ledger lifecycle ===\n");

    // ── 1. Accounts and balances ────────────────────────────────────────
    let manager = AccountId::from_bytes([0x77; 32]);
    let alice = AccountId::from_bytes([0xa1; 32]);
    let bob = AccountId::from_bytes([0xb0; 32]);
    let (usdt, pica, reward) = (AssetId::new(1), AssetId::new(2), AssetId::new(3));

    let config = LedgerConfig {
        managers: vec![manager],
        ..LedgerConfig::default()
    };
    let mut ledger = Ledger::from_config(config).with_projector();
    for account in [manager, alice, bob] {
        for asset in [usdt, pica, reward] {
            ledger
                .assets_mut()
                .mint(asset, &account, Amount::new(10_000_000_000_000))?;
        }
    }

    // ── 2. A 50/50 pool with a 0.3% fee, a fifth of it to the owner ─────
    let pair = AssetPair::new(pica, usdt)?;
    let fee = FeeConfig::new(3_000, 200_000, 0)?;
    let pool_config = PoolConfig::ConstantProduct(ConstantProductConfig::balanced(pair, fee)?);
    println!("Creating {pool_config}");
    let pool = ledger.create_pool(alice, alice, pool_config)?.outcome;

    let seeded = ledger.add_liquidity(
        alice,
        pool,
        Amount::new(1_000_000_000_000),
        Amount::new(2_000_000_000_000),
        Amount::ZERO,
        true,
    )?;
    println!("Pool {pool}: minted {} LP", seeded.outcome.lp_minted);
    println!("Spot price of PICA: {} USDT", ledger.spot_price(pool, pica)?);

    // ── 3. Trade ────────────────────────────────────────────────────────
    let quote = ledger.quote_sell(pool, usdt, Amount::new(1_000_000))?;
    println!(
        "Quote: 1 000 000 USDT -> {} PICA (fee {})",
        quote.amount_out, quote.fee.fee
    );
    let sold = ledger.sell(bob, pool, usdt, Amount::new(1_000_000), quote.amount_out, true)?;
    println!(
        "Sold:  {} USDT -> {} PICA",
        sold.outcome.quote_amount, sold.outcome.base_amount
    );
    let bought = ledger.buy(bob, pool, usdt, Amount::new(500_000), Amount::ZERO, true)?;
    println!(
        "Bought: {} USDT for {} PICA",
        bought.outcome.base_amount, bought.outcome.quote_amount
    );
    for event in sold.events.iter().chain(&bought.events) {
        println!("  event: {event:?}");
    }

    // ── 4. Staking ──────────────────────────────────────────────────────
    let reward_config = RewardPoolConfig {
        owner: manager,
        staked_asset: pica,
        end_block: 1_000_000,
        reward_configs: BTreeMap::from([(
            reward,
            RewardConfig {
                max_rewards: Amount::new(1_000_000_000_000),
                reward_rate: RewardRate::per_seconds(10, Amount::new(1_000)),
            },
        )]),
        lock: LockConfig {
            duration_presets: BTreeMap::from([
                (THIRTY_DAYS, Perbill::from_percent(50)),
                (2 * THIRTY_DAYS, Perbill::from_percent(100)),
            ]),
            unlock_penalty: Perbill::from_percent(1),
        },
    };
    let reward_pool = ledger.create_reward_pool(manager, reward_config)?.outcome;
    ledger.add_to_rewards_pot(
        manager,
        reward_pool,
        reward,
        Amount::new(1_000_000_000),
        true,
    )?;

    let position =
        ledger.stake(alice, reward_pool, Amount::new(100_000_000_000), THIRTY_DAYS, true)?.outcome;
    let (kept, moved) = ledger
        .split(alice, position, Permill::from_percent(50))?
        .outcome;
    println!("\nStaked and split into positions {kept} and {moved}");

    // Leaving early costs 1% of the principal.
    let early = ledger.unstake(alice, moved)?.outcome;
    println!(
        "Early unstake of {moved}: returned {}, slashed {}",
        early.returned_amount, early.slashed_amount
    );

    ledger.clock_mut().advance_time(THIRTY_DAYS * 1_000);
    println!(
        "Block {}: pending {:?}",
        ledger.clock().current_block(),
        ledger.pending_rewards(kept)?
    );
    let done = ledger.unstake(alice, kept)?.outcome;
    println!(
        "Unstaked {kept}: returned {}, rewards {:?}",
        done.returned_amount, done.rewards
    );
    println!(
        "Alice now holds {} of the reward asset",
        ledger.assets().balance(reward, &alice)
    );

    // ── 5. Projection ───────────────────────────────────────────────────
    if let Some(projector) = ledger.projector() {
        println!("\nProjected {} events", projector.applied());
        if let Some(stats) = projector.pool_stats(pool) {
            println!("Pool {pool}: {stats:?}");
        }
        if let Some(totals) = projector.account(&alice) {
            println!("Alice: {totals:?}");
        }
    }

    Ok(())
}
