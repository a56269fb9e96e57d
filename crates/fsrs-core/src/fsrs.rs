// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The FSRS memory model. Every function rounds its result to 8 decimal
//! places so stored values stay comparable across implementations.

use crate::fuzz::apply_fuzz;
use crate::params::Parameters;
use crate::params::S_MAX;
use crate::params::S_MIN;
use crate::types::rating::Grade;

pub type Recall = f64;
pub type Stability = f64;
pub type Difficulty = f64;

pub const DECAY: f64 = -0.5;
pub const FACTOR: f64 = 19.0 / 81.0;

/// Rounds to 8 decimal places, the precision of every stored value.
pub fn round8(x: f64) -> f64 {
    format!("{x:.8}").parse().unwrap_or(x)
}

fn clamp_d(d: Difficulty) -> Difficulty {
    d.clamp(1.0, 10.0)
}

fn clamp_s(s: Stability) -> Stability {
    s.clamp(S_MIN, S_MAX)
}

pub fn initial_stability(p: &Parameters, g: Grade) -> Stability {
    let w = p.w();
    let s = match g {
        Grade::Again => w[0],
        Grade::Hard => w[1],
        Grade::Good => w[2],
        Grade::Easy => w[3],
    };
    f64::max(s, 0.1)
}

pub fn initial_difficulty(p: &Parameters, g: Grade) -> Difficulty {
    let w = p.w();
    let g: f64 = g.into();
    clamp_d(round8(w[4] - f64::exp((g - 1.0) * w[5]) + 1.0))
}

pub fn next_difficulty(p: &Parameters, d: Difficulty, g: Grade) -> Difficulty {
    let w = p.w();
    let delta_d = -(w[6] * (f64::from(g) - 3.0));
    let d_p = d + linear_damping(delta_d, d);
    clamp_d(mean_reversion(p, initial_difficulty(p, Grade::Easy), d_p))
}

/// Shrinks difficulty changes as the difficulty approaches 10.
fn linear_damping(delta_d: f64, d: Difficulty) -> f64 {
    round8(delta_d * (10.0 - d) / 9.0)
}

fn mean_reversion(p: &Parameters, init: Difficulty, current: Difficulty) -> Difficulty {
    let w7 = p.w()[7];
    round8(w7 * init + (1.0 - w7) * current)
}

pub fn next_recall_stability(
    p: &Parameters,
    d: Difficulty,
    s: Stability,
    r: Recall,
    g: Grade,
) -> Stability {
    let w = p.w();
    let hard_penalty = if g == Grade::Hard { w[15] } else { 1.0 };
    let easy_bonus = if g == Grade::Easy { w[16] } else { 1.0 };
    let alpha = 1.0
        + f64::exp(w[8])
            * (11.0 - d)
            * s.powf(-w[9])
            * (f64::exp((1.0 - r) * w[10]) - 1.0)
            * hard_penalty
            * easy_bonus;
    round8(clamp_s(s * alpha))
}

pub fn next_forget_stability(p: &Parameters, d: Difficulty, s: Stability, r: Recall) -> Stability {
    let w = p.w();
    let s_f = w[11]
        * d.powf(-w[12])
        * ((s + 1.0).powf(w[13]) - 1.0)
        * f64::exp((1.0 - r) * w[14]);
    round8(clamp_s(s_f))
}

pub fn next_short_term_stability(p: &Parameters, s: Stability, g: Grade) -> Stability {
    let w = p.w();
    let g: f64 = g.into();
    round8(clamp_s(s * f64::exp(w[17] * (g - 3.0 + w[18]))))
}

/// Post-lapse stability: the forget stability, never above the pre-lapse
/// stability. With short-term scheduling on, the bound is lowered so that a
/// relearning step cannot grow past it. The result stays within
/// `[S_MIN, S_MAX]`.
pub fn next_lapse_stability(p: &Parameters, d: Difficulty, s: Stability, r: Recall) -> Stability {
    let forget = next_forget_stability(p, d, s, r);
    let cap = if p.enable_short_term() {
        let w = p.w();
        round8(s / f64::exp(w[17] * w[18]))
    } else {
        s
    };
    clamp_s(f64::min(cap, forget))
}

/// Probability of recall after `t` days.
pub fn forgetting_curve(t: f64, s: Stability) -> Recall {
    round8((1.0 + FACTOR * t / s).powf(DECAY))
}

/// The interval in whole days for a stability, fuzzed when enabled.
pub fn next_interval(p: &Parameters, s: Stability, elapsed_days: i64, seed: &str) -> i64 {
    let raw = (s * p.interval_modifier()).round();
    let ivl = raw.max(1.0).min(p.maximum_interval() as f64);
    apply_fuzz(p, ivl, elapsed_days, seed)
}
