//! Headless self-check harness.
//!
//! Validates the optimizer in-process: boundary cases, known pools, lumber
//! truncation, the command adapter, and a seeded random sweep against a
//! naive reference search.

use abidos_logic::command::{render_reply, run_command, NO_SOLUTION_REPLY};
use abidos_logic::optimizer::{
    evaluate_plan, optimize, NoSolution, Plan, ResourcePool, Solution,
};
use abidos_logic::rates::ConversionRates;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct CheckResult {
    name: String,
    passed: bool,
    detail: String,
}

/// Run every check, print the report, and return whether all passed.
pub fn run(verbose: bool, seed: u64, samples: usize) -> bool {
    println!("=== Fusion Optimizer Self-Check ===\n");

    let mut results = Vec::new();

    // 1. Threshold boundary
    results.extend(check_thresholds());

    // 2. Known pools
    results.extend(check_known_pools(verbose));

    // 3. Lumber truncation
    results.extend(check_truncation());

    // 4. Command adapter
    results.extend(check_command_adapter());

    // 5. Random sweep
    results.extend(check_random_sweep(seed, samples));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed,
        results.len(),
        failed
    );
    log::info!("self-check finished: {passed} passed, {failed} failed");

    failed == 0
}

// ── Reference search ────────────────────────────────────────────────────

/// Plain nested-loop search with the standard rates: (fusions, k1, k2).
fn reference_best(pool: ResourcePool) -> Option<(i64, i64, i64)> {
    let ResourcePool {
        timber,
        tender,
        abidos,
    } = pool;
    if timber < 86 || tender < 45 || abidos < 33 {
        return None;
    }
    let mut best = None;
    let mut best_fusions = 0;
    for k1 in 0..=timber / 100 {
        for k2 in 0..=tender / 50 {
            let new_abidos = (80 * k1 + 80 * k2) / 100 * 10;
            let fusions = ((timber - 100 * k1) / 86)
                .min((tender - 50 * k2) / 45)
                .min((abidos + new_abidos) / 33);
            if fusions > best_fusions {
                best_fusions = fusions;
                best = Some((fusions, k1, k2));
            }
        }
    }
    best
}

fn ledger_balances(pool: ResourcePool, s: &Solution) -> bool {
    pool.timber == s.timber_converted + 86 * s.max_fusions + s.remaining_timber
        && pool.tender == s.tender_converted + 45 * s.max_fusions + s.remaining_tender
        && pool.abidos + s.new_abidos_from_conversion == 33 * s.max_fusions + s.remaining_abidos
        && s.remaining_timber >= 0
        && s.remaining_tender >= 0
        && s.remaining_abidos >= 0
}

fn fusions_or_zero(pool: ResourcePool) -> i64 {
    optimize(pool.timber, pool.tender, pool.abidos).map_or(0, |s| s.max_fusions)
}

// ── 1. Thresholds ───────────────────────────────────────────────────────

fn check_thresholds() -> Vec<CheckResult> {
    println!("--- Thresholds ---");
    let mut results = Vec::new();

    let below = optimize(85, 45, 33);
    results.push(CheckResult {
        name: "threshold_timber_one_short".into(),
        passed: matches!(below, Err(NoSolution::Insufficient { .. })),
        detail: format!("85/45/33 → {:?}", below),
    });

    let exact = optimize(86, 45, 33);
    results.push(CheckResult {
        name: "threshold_exact_single_fusion".into(),
        passed: matches!(
            exact,
            Ok(Solution {
                max_fusions: 1,
                timber_converted: 0,
                tender_converted: 0,
                remaining_timber: 0,
                remaining_tender: 0,
                remaining_abidos: 0,
                ..
            })
        ),
        detail: "86/45/33 → one fusion, nothing left".into(),
    });

    // Conversions could cover the gap, but the raw pool is checked first.
    let low_abidos = optimize(1000, 500, 30);
    results.push(CheckResult {
        name: "threshold_precheck_before_conversion".into(),
        passed: low_abidos.is_err(),
        detail: format!("1000/500/30 → {:?}", low_abidos),
    });

    results
}

// ── 2. Known pools ──────────────────────────────────────────────────────

fn check_known_pools(verbose: bool) -> Vec<CheckResult> {
    println!("--- Known Pools ---");
    let mut results = Vec::new();

    let cases = [
        ((1000, 500, 33), (3, 200, 350)),
        ((1000, 500, 66), (4, 300, 300)),
        ((1200, 600, 50), (4, 400, 400)),
        ((2000, 1000, 100), (8, 1000, 600)),
        ((1000, 1000, 1000), (11, 0, 0)),
    ];

    for ((timber, tender, abidos), expected) in cases {
        let got = optimize(timber, tender, abidos)
            .map(|s| (s.max_fusions, s.timber_converted, s.tender_converted));
        if verbose {
            println!("  {timber:>5}/{tender:>5}/{abidos:>5} → {:?}", got);
        }
        results.push(CheckResult {
            name: format!("known_pool_{timber}_{tender}_{abidos}"),
            passed: got.as_ref() == Ok(&expected),
            detail: format!("expected {:?}, got {:?}", expected, got),
        });
    }

    results
}

// ── 3. Truncation ───────────────────────────────────────────────────────

fn check_truncation() -> Vec<CheckResult> {
    println!("--- Lumber Truncation ---");
    let mut results = Vec::new();
    let pool = ResourcePool::new(1000, 500, 33);
    let rates = ConversionRates::default();

    for (timber_steps, tender_steps, expected) in [(1, 0, 0), (1, 1, 10), (2, 1, 20), (6, 6, 90)] {
        let plan = Plan {
            timber_steps,
            tender_steps,
        };
        let got = evaluate_plan(pool, &rates, plan).map(|s| s.new_abidos_from_conversion);
        results.push(CheckResult {
            name: format!("truncation_{timber_steps}_{tender_steps}"),
            passed: got == Ok(expected),
            detail: format!(
                "{} powder → {:?} abidos (expected {})",
                80 * (timber_steps + tender_steps),
                got,
                expected
            ),
        });
    }

    results
}

// ── 4. Command adapter ──────────────────────────────────────────────────

fn check_command_adapter() -> Vec<CheckResult> {
    println!("--- Command Adapter ---");
    let mut results = Vec::new();
    let rates = ConversionRates::default();

    let rejected: [&[&str]; 5] = [
        &["1000", "500", "4.5"],
        &["85.99999999999999999999999999999", "45", "33"],
        &["1000", "500"],
        &["wood", "500", "100"],
        &["1", "2", "3", "4"],
    ];
    for tokens in rejected {
        let reply = render_reply(&run_command(tokens, &rates), &rates);
        results.push(CheckResult {
            name: format!("adapter_rejects_{}", tokens.join("_")),
            passed: reply == NO_SOLUTION_REPLY,
            detail: format!("{:?} → {:?}", tokens, reply),
        });
    }

    let accepted = run_command(&["1000.0", "500", "66"], &rates);
    results.push(CheckResult {
        name: "adapter_accepts_integral_decimal".into(),
        passed: accepted.map(|s| s.max_fusions) == Ok(4),
        detail: "1000.0/500/66 → 4 fusions".into(),
    });

    results
}

// ── 5. Random sweep ─────────────────────────────────────────────────────

fn check_random_sweep(seed: u64, samples: usize) -> Vec<CheckResult> {
    println!("--- Random Sweep (seed {seed}, {samples} pools) ---");
    let mut rng = StdRng::seed_from_u64(seed);

    let mut mismatches = Vec::new();
    let mut unbalanced = Vec::new();
    let mut regressions = Vec::new();

    for _ in 0..samples {
        let pool = ResourcePool::new(
            rng.gen_range(0..2000),
            rng.gen_range(0..1000),
            rng.gen_range(0..400),
        );
        let result = optimize(pool.timber, pool.tender, pool.abidos);

        let got = result
            .as_ref()
            .ok()
            .map(|s| (s.max_fusions, s.timber_converted / 100, s.tender_converted / 50));
        if got != reference_best(pool) {
            mismatches.push(pool);
        }
        if let Ok(s) = &result {
            if !ledger_balances(pool, s) {
                unbalanced.push(pool);
            }
        }

        let extra = rng.gen_range(1..300);
        let mut grown = pool;
        match rng.gen_range(0..3) {
            0 => grown.timber += extra,
            1 => grown.tender += extra,
            _ => grown.abidos += extra,
        }
        if fusions_or_zero(grown) < fusions_or_zero(pool) {
            regressions.push((pool, grown));
        }
    }

    vec![
        CheckResult {
            name: "sweep_matches_reference".into(),
            passed: mismatches.is_empty(),
            detail: if mismatches.is_empty() {
                format!("{samples} pools agree with the reference search")
            } else {
                format!("{} mismatches, first {:?}", mismatches.len(), mismatches[0])
            },
        },
        CheckResult {
            name: "sweep_ledger_balances".into(),
            passed: unbalanced.is_empty(),
            detail: if unbalanced.is_empty() {
                "every solution ledger balances".into()
            } else {
                format!("{} unbalanced, first {:?}", unbalanced.len(), unbalanced[0])
            },
        },
        CheckResult {
            name: "sweep_monotonic".into(),
            passed: regressions.is_empty(),
            detail: if regressions.is_empty() {
                "adding resources never lowered the fusion count".into()
            } else {
                format!("{} regressions, first {:?}", regressions.len(), regressions[0])
            },
        },
    ]
}
