//! Sensitivity index (d') from hit and false-alarm counts.
//!
//! Rates use the log-linear correction `(x + 0.5) / (N + 1)` so that perfect
//! or empty rounds still give a finite score.

/// Inverse of the standard normal CDF (Acklam's rational approximation,
/// relative error below 1.2e-9). `p` is clamped into `(0, 1)`.
pub fn probit(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.02425;

    let p = p.clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON);

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - P_LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}

/// d' = z(hit rate) - z(false-alarm rate).
///
/// `signal_trials` are trials where a press was correct; `noise_trials` are
/// trials where a press would be a false alarm.
pub fn d_prime(hits: u32, signal_trials: u32, false_alarms: u32, noise_trials: u32) -> f64 {
    let hit_rate = (hits as f64 + 0.5) / (signal_trials as f64 + 1.0);
    let fa_rate = (false_alarms as f64 + 0.5) / (noise_trials as f64 + 1.0);
    probit(hit_rate) - probit(fa_rate)
}
