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

//! Alea, a small seeded PRNG over doubles. Not cryptographically secure; it
//! only has to make fuzz reproducible from a string seed.

use serde::Deserialize;
use serde::Serialize;

const TWO_POW_32: f64 = 4294967296.0;
/// 2^-32
const TWO_POW_NEG_32: f64 = 2.3283064365386963e-10;
/// 2^-53
const TWO_POW_NEG_53: f64 = 1.1102230246251565e-16;

/// Converts to an unsigned 32-bit integer the way a `>>> 0` does, keeping
/// the result as a double.
fn to_uint32(x: f64) -> f64 {
    if x.is_finite() {
        x.trunc().rem_euclid(TWO_POW_32)
    } else {
        0.0
    }
}

/// The string hash used to seed the generator. Its state carries over
/// between calls.
struct Mash {
    n: f64,
}

impl Mash {
    fn new() -> Self {
        Mash {
            n: 0xefc8249d_u32 as f64,
        }
    }

    fn mash(&mut self, data: &str) -> f64 {
        let mut n = self.n;
        for code in data.encode_utf16() {
            n += code as f64;
            let mut h = 0.02519603282416938 * n;
            n = to_uint32(h);
            h -= n;
            h *= n;
            n = to_uint32(h);
            h -= n;
            n += h * TWO_POW_32;
        }
        self.n = n;
        to_uint32(n) * TWO_POW_NEG_32
    }
}

/// The full generator state. Importing it resumes the exact sequence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AleaState {
    pub c: f64,
    pub s0: f64,
    pub s1: f64,
    pub s2: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alea {
    c: f64,
    s0: f64,
    s1: f64,
    s2: f64,
}

impl Alea {
    /// Initialize the generator from a seed string.
    pub fn new(seed: &str) -> Self {
        let mut mash = Mash::new();
        let mut s0 = mash.mash(" ");
        let mut s1 = mash.mash(" ");
        let mut s2 = mash.mash(" ");
        s0 -= mash.mash(seed);
        if s0 < 0.0 {
            s0 += 1.0;
        }
        s1 -= mash.mash(seed);
        if s1 < 0.0 {
            s1 += 1.0;
        }
        s2 -= mash.mash(seed);
        if s2 < 0.0 {
            s2 += 1.0;
        }
        Alea { c: 1.0, s0, s1, s2 }
    }

    pub fn from_state(state: AleaState) -> Self {
        Alea {
            c: state.c,
            s0: state.s0,
            s1: state.s1,
            s2: state.s2,
        }
    }

    /// A double in `[0, 1)` with 32 bits of randomness.
    pub fn next_f64(&mut self) -> f64 {
        let t = 2091639.0 * self.s0 + self.c * TWO_POW_NEG_32;
        self.s0 = self.s1;
        self.s1 = self.s2;
        self.c = t.floor();
        self.s2 = t - self.c;
        self.s2
    }

    pub fn int32(&mut self) -> i32 {
        (self.next_f64() * TWO_POW_32) as u32 as i32
    }

    /// A double in `[0, 1)` with 53 bits of randomness. Consumes two outputs.
    pub fn double(&mut self) -> f64 {
        let hi = self.next_f64();
        let lo = (self.next_f64() * 2097152.0) as u64 as f64;
        hi + lo * TWO_POW_NEG_53
    }

    pub fn state(&self) -> AleaState {
        AleaState {
            c: self.c,
            s0: self.s0,
            s1: self.s1,
            s2: self.s2,
        }
    }

    pub fn import_state(&mut self, state: AleaState) {
        *self = Self::from_state(state);
    }
}

/// Shorthand for [`Alea::new`].
pub fn alea(seed: &str) -> Alea {
    Alea::new(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sequence() {
        let mut rng = alea("12345");
        assert_eq!(rng.next_f64(), 0.27138191112317145);
        assert_eq!(rng.next_f64(), 0.19615925149992108);
        assert_eq!(rng.next_f64(), 0.6810678059700876);
    }

    #[test]
    fn test_int32() {
        let mut rng = alea("12345");
        assert_eq!(rng.int32(), 1165576433);
        assert_eq!(rng.int32(), 842497570);
        assert_eq!(rng.int32(), -1369803343);
    }

    #[test]
    fn test_double() {
        let mut rng = alea("12345");
        assert_eq!(rng.double(), 0.27138191116884325);
        assert_eq!(rng.double(), 0.6810678062004586);
        assert_eq!(rng.double(), 0.3407802057882554);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = alea("1727015666066");
        let mut b = alea("1727015666066");
        for _ in 0..1000 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
        let mut c = alea("1727015666067");
        let mut a = alea("1727015666066");
        assert_ne!(a.next_f64(), c.next_f64());
    }

    #[test]
    fn test_state_after_one_output() {
        let cases = [
            (
                "1727015666066",
                0.6320083506871015,
                AleaState {
                    c: 1828249.0,
                    s0: 0.5888567129150033,
                    s1: 0.5074866858776659,
                    s2: 0.6320083506871015,
                },
            ),
            (
                "Seedp5fxh9kf4r0",
                0.14867847645655274,
                AleaState {
                    c: 1776946.0,
                    s0: 0.6778371171094477,
                    s1: 0.0770602801349014,
                    s2: 0.14867847645655274,
                },
            ),
            (
                "NegativeS2Seed",
                0.830770346801728,
                AleaState {
                    c: 952982.0,
                    s0: 0.25224833423271775,
                    s1: 0.9213257452938706,
                    s2: 0.830770346801728,
                },
            ),
        ];
        for (seed, first, state) in cases {
            let mut rng = alea(seed);
            assert_eq!(rng.next_f64(), first);
            assert_eq!(rng.state(), state);
        }
    }

    #[test]
    fn test_seeded_state() {
        let a = alea("1");
        assert_eq!(
            a.state(),
            AleaState {
                c: 1.0,
                s0: 0.14413124159909785,
                s1: 0.8855089824646711,
                s2: 0.6692055738531053,
            }
        );
        assert_ne!(alea("2").state(), a.state());
    }

    #[test]
    fn test_import_state_resumes_sequence() {
        let mut a = alea("12345");
        for _ in 0..10 {
            a.next_f64();
        }
        let mut b = alea("unrelated");
        b.import_state(a.state());
        for _ in 0..100 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
        let c = Alea::from_state(a.state());
        assert_eq!(c, a);
    }

    #[test]
    fn test_import_degenerate_state() {
        let mut rng = Alea::from_state(AleaState {
            c: 0.0,
            s0: 0.0,
            s1: 0.0,
            s2: -0.5,
        });
        assert_eq!(rng.next_f64(), 0.0);
        assert_eq!(
            rng.state(),
            AleaState {
                c: 0.0,
                s0: 0.0,
                s1: -0.5,
                s2: 0.0,
            }
        );
    }

    #[test]
    fn test_outputs_in_unit_interval() {
        let mut rng = alea("range");
        for _ in 0..1000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_to_uint32() {
        assert_eq!(to_uint32(-1.0), 4294967295.0);
        assert_eq!(to_uint32(4294967296.5), 0.0);
        assert_eq!(to_uint32(f64::NAN), 0.0);
    }
}
