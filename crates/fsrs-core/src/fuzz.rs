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

use crate::params::Parameters;
use crate::rng::alea;

/// Intervals shorter than this are never fuzzed.
const MIN_FUZZ_INTERVAL: f64 = 2.5;

struct FuzzRange {
    start: f64,
    end: f64,
    factor: f64,
}

const FUZZ_RANGES: [FuzzRange; 3] = [
    FuzzRange {
        start: 2.5,
        end: 7.0,
        factor: 0.15,
    },
    FuzzRange {
        start: 7.0,
        end: 20.0,
        factor: 0.1,
    },
    FuzzRange {
        start: 20.0,
        end: f64::INFINITY,
        factor: 0.05,
    },
];

/// The inclusive `(min, max)` window an interval may be fuzzed into.
pub fn fuzz_range(interval: f64, elapsed_days: i64, maximum_interval: i64) -> (i64, i64) {
    let mut delta = 1.0;
    for range in FUZZ_RANGES.iter() {
        delta += range.factor * f64::max(f64::min(interval, range.end) - range.start, 0.0);
    }
    let maximum_interval = maximum_interval as f64;
    let elapsed_days = elapsed_days as f64;
    let interval = f64::min(interval, maximum_interval);
    let mut min_ivl = f64::max(2.0, (interval - delta).round());
    let max_ivl = f64::min((interval + delta).round(), maximum_interval);
    if interval > elapsed_days {
        min_ivl = f64::max(min_ivl, elapsed_days + 1.0);
    }
    min_ivl = f64::min(min_ivl, max_ivl);
    (min_ivl as i64, max_ivl as i64)
}

/// Spreads an interval over its fuzz window, driven by `seed`. Returns the
/// interval rounded and untouched when fuzz is off or the interval is short.
pub fn apply_fuzz(p: &Parameters, interval: f64, elapsed_days: i64, seed: &str) -> i64 {
    if !p.enable_fuzz() || interval < MIN_FUZZ_INTERVAL {
        return interval.round() as i64;
    }
    let fuzz_factor = alea(seed).next_f64();
    let (min_ivl, max_ivl) = fuzz_range(interval, elapsed_days, p.maximum_interval());
    (fuzz_factor * (max_ivl - min_ivl + 1) as f64 + min_ivl as f64).floor() as i64
}
