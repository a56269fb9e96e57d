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

//! fsrs-core: the FSRS spaced repetition scheduler.
//!
//! This library provides:
//! - The FSRS-5 memory model (stability, difficulty, retrievability)
//! - Two schedulers, with and without sub-day learning steps
//! - Deterministic interval fuzz seeded from the review
//! - Rollback, forget and replay of a card's review history

pub mod engine;
pub mod error;
pub mod fsrs;
pub mod fuzz;
pub mod params;
pub mod reschedule;
pub mod rng;
pub mod scheduler;
pub mod types;

// Re-exports for convenience
pub use engine::Fsrs;
pub use error::{ErrorKind, ErrorReport, Fallible, fail};
pub use params::{ParameterConfig, Parameters};
pub use reschedule::{RescheduleOptions, RescheduleResult};
pub use scheduler::{Schedule, Scheduler};
pub use types::card::{Card, State};
pub use types::rating::{Grade, Rating};
pub use types::review_log::{RecordLog, RecordLogItem, ReviewLog};
pub use types::timestamp::Timestamp;
