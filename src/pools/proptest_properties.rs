//! Property-based tests for pool invariants.
//!
//! 1. **Liquidity round trip**: add then remove the minted LP returns the
//!    deposit within rounding.
//! 2. **Invariant preservation**: the constant-product `k` never decreases
//!    across swaps.
//! 3. **Fee proportionality**: `fee ≈ amount × fee_rate`.
//! 4. **Swap reversibility**: selling and selling back never gains.
//! 5. **Sale weights**: the LBP weight is monotonic and hits both endpoints.

#![allow(clippy::panic)]

use proptest::prelude::*;

use crate::config::{ConstantProductConfig, StableSwapConfig};
use crate::domain::{AccountId, Amount, AssetId, AssetPair, FeeConfig, Permill, Sale};
use crate::pools::{ConstantProductPool, StableSwapPool};
use crate::traits::{FromConfig, LiquidityPool, PoolIdentity, SwapPool};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const BASE: AssetId = AssetId::new(1);
const QUOTE: AssetId = AssetId::new(2);

fn pair() -> AssetPair {
    let Ok(p) = AssetPair::new(BASE, QUOTE) else {
        panic!("distinct assets");
    };
    p
}

fn identity() -> PoolIdentity {
    PoolIdentity {
        owner: AccountId::from_bytes([1; 32]),
        lp_token: AssetId::new(100),
    }
}

fn fee(rate: u32) -> FeeConfig {
    let Ok(f) = FeeConfig::new(rate, 0, 0) else {
        panic!("valid fee");
    };
    f
}

fn seed<P: LiquidityPool>(pool: &mut P, base: u128, quote: u128) -> Amount {
    let Ok(out) = pool.quote_add(Amount::new(base), Amount::new(quote), Amount::ZERO) else {
        panic!("first deposit");
    };
    let Ok(()) = pool.apply_add(&out) else {
        panic!("seeded");
    };
    out.lp_minted
}

fn make_cp(rate: u32, base: u128, quote: u128) -> (ConstantProductPool, Amount) {
    let Ok(cfg) = ConstantProductConfig::balanced(pair(), fee(rate)) else {
        panic!("valid config");
    };
    let Ok(mut pool) = ConstantProductPool::from_config(&cfg, identity()) else {
        panic!("valid pool");
    };
    let supply = seed(&mut pool, base, quote);
    (pool, supply)
}

fn make_stable(amp: u32, reserve: u128) -> (StableSwapPool, Amount) {
    let Ok(cfg) = StableSwapConfig::new(pair(), fee(3_000), amp) else {
        panic!("valid config");
    };
    let Ok(mut pool) = StableSwapPool::from_config(&cfg, identity()) else {
        panic!("valid pool");
    };
    let supply = seed(&mut pool, reserve, reserve);
    (pool, supply)
}

fn k(pool: &ConstantProductPool) -> u128 {
    pool.state().base_reserve().get() * pool.state().quote_reserve().get()
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn reserve_strategy() -> impl Strategy<Value = u128> {
    10_000u128..=10_000_000_000u128
}

fn fee_rate_strategy() -> impl Strategy<Value = u32> {
    0u32..=200_000u32
}

// ---------------------------------------------------------------------------
// Property 1: Liquidity round trip
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_add_remove_round_trip(
        rb in reserve_strategy(),
        rq in reserve_strategy(),
        deposit in 1_000u128..=1_000_000_000u128,
    ) {
        let (mut pool, supply) = make_cp(3_000, rb, rq);
        let Ok(added) = pool.quote_add(Amount::new(deposit), Amount::MAX, supply) else {
            return Ok(());
        };
        let Ok(()) = pool.apply_add(&added) else {
            return Ok(());
        };
        let Some(grown) = supply.checked_add(&added.lp_minted) else {
            return Ok(());
        };
        let Ok(removed) = pool.quote_remove(added.lp_minted, grown) else {
            return Ok(());
        };

        prop_assert!(removed.base_returned <= added.base_used);
        prop_assert!(removed.quote_returned <= added.quote_used);
        // The loss is bounded by one LP unit's worth of reserves plus rounding.
        let base_unit = pool.state().base_reserve().get() / grown.get() + 2;
        let quote_unit = pool.state().quote_reserve().get() / grown.get() + 3;
        prop_assert!(added.base_used.get() - removed.base_returned.get() <= base_unit);
        prop_assert!(added.quote_used.get() - removed.quote_returned.get() <= quote_unit);
    }
}

// ---------------------------------------------------------------------------
// Property 2: Invariant preservation
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_constant_product_k_non_decreasing(
        rb in reserve_strategy(),
        rq in reserve_strategy(),
        rate in fee_rate_strategy(),
        trades in prop::collection::vec((any::<bool>(), 1u128..=1_000_000u128), 1..8),
    ) {
        let (mut pool, _) = make_cp(rate, rb, rq);
        let mut last = k(&pool);
        for (sell_base, amount) in trades {
            let asset = if sell_base { BASE } else { QUOTE };
            let Ok(quote) = pool.quote_exact_in(asset, Amount::new(amount), 1) else {
                continue;
            };
            let Ok(()) = pool.apply_swap(&quote) else {
                continue;
            };
            let now = k(&pool);
            prop_assert!(now >= last, "k decreased: {} -> {}", last, now);
            last = now;
        }
    }

    #[test]
    fn prop_stable_swap_invariant_non_decreasing(
        reserve in 1_000_000u128..=1_000_000_000u128,
        amp in 1u32..=500u32,
        amount in 10_000u128..=100_000u128,
    ) {
        let (mut pool, _) = make_stable(amp, reserve);
        let Ok(before) = pool.invariant() else {
            return Ok(());
        };
        let Ok(quote) = pool.quote_exact_in(BASE, Amount::new(amount), 1) else {
            return Ok(());
        };
        let Ok(()) = pool.apply_swap(&quote) else {
            return Ok(());
        };
        let Ok(after) = pool.invariant() else {
            return Ok(());
        };
        prop_assert!(after >= before);
    }
}

// ---------------------------------------------------------------------------
// Property 3: Fee proportionality
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_fee_tracks_rate(
        rate in fee_rate_strategy(),
        amount in 1_000_000u128..=1_000_000_000_000u128,
    ) {
        let Ok(split) = fee(rate).compute_fee(Amount::new(amount)) else {
            panic!("fee computed");
        };
        let exact = amount * u128::from(rate) / 1_000_000;
        prop_assert_eq!(split.fee.get(), exact);
        prop_assert!(split.external() <= split.fee);
    }

    #[test]
    fn prop_larger_trade_larger_fee(
        rate in fee_rate_strategy(),
        a in 1u128..=1_000_000_000u128,
        b in 1u128..=1_000_000_000u128,
    ) {
        let cfg = fee(rate);
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        let (Ok(fs), Ok(fl)) = (
            cfg.compute_fee(Amount::new(small)),
            cfg.compute_fee(Amount::new(large)),
        ) else {
            panic!("fee computed");
        };
        prop_assert!(fs.fee <= fl.fee);
    }
}

// ---------------------------------------------------------------------------
// Property 4: Swap reversibility
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_swap_reversibility_constant_product(
        rb in reserve_strategy(),
        rq in reserve_strategy(),
    ) {
        let swap_in = (rb / 1_000).max(1);
        let (mut pool, _) = make_cp(3_000, rb, rq);

        let Ok(forward) = pool.quote_exact_in(BASE, Amount::new(swap_in), 1) else {
            return Ok(());
        };
        let Ok(()) = pool.apply_swap(&forward) else {
            return Ok(());
        };
        let Ok(back) = pool.quote_exact_in(QUOTE, forward.amount_out, 1) else {
            return Ok(());
        };

        prop_assert!(
            back.amount_out.get() <= swap_in,
            "round-trip should lose value: final={} > original={}",
            back.amount_out.get(), swap_in
        );
    }
}

// ---------------------------------------------------------------------------
// Property 5: Sale weights
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_sale_weight_monotonic(
        start in 0u64..=1_000u64,
        length in 1u64..=10_000u64,
        initial in 1u32..=999_999u32,
        last in 1u32..=999_999u32,
        block in 0u64..=12_000u64,
    ) {
        let (Ok(iw), Ok(fw)) = (Permill::new(initial), Permill::new(last)) else {
            panic!("valid weights");
        };
        let end = start + length;
        let Ok(sale) = Sale::new(start, end, iw, fw) else {
            panic!("valid sale");
        };
        let (Ok(at_start), Ok(at_end)) = (sale.weight_at(start), sale.weight_at(end)) else {
            panic!("weights computed");
        };
        prop_assert_eq!(at_start, iw);
        prop_assert_eq!(at_end, fw);

        let (Ok(w), Ok(next)) = (sale.weight_at(block), sale.weight_at(block + 1)) else {
            panic!("weights computed");
        };
        if initial >= last {
            prop_assert!(next <= w);
        } else {
            prop_assert!(next >= w);
        }
    }
}
