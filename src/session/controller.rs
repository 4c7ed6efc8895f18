// ABOUTME: Workout session state machine: set progression, rest countdowns, auto-finish
// ABOUTME: Pure and tick-driven; all I/O lives in the runtime wrapper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pulse Fitness Labs

//! # Session Controller
//!
//! Phases: `Idle → Active ⇄ Resting → Completed` (or `Closed` on early
//! exit). Every mutation happens in reaction to a discrete event: a
//! completed set, a skip, or a one-second tick. Completing the final
//! prescribed set schedules finalization after a short grace period so the
//! user sees the finished state before the session record is handed off.

use tracing::{debug, info};
use uuid::Uuid;

use crate::constants::physiology::{
    KCAL_PER_MINUTE_FALLBACK, KCAL_PER_MINUTE_OFFSET, KCAL_PER_MINUTE_SLOPE,
};
use crate::constants::session::{AUTO_FINISH_GRACE_TICKS, DEFAULT_REST_SECONDS};
use crate::models::{ExerciseSummary, HeartRateSample, PrescribedExercise, WorkoutSummary};

/// Live progress for one prescribed exercise
#[derive(Debug, Clone)]
pub struct ExerciseProgress {
    /// Exercise id from the template
    pub exercise_id: Uuid,
    /// Display name
    pub name: String,
    /// Prescribed set count; zero when the prescription was unparseable,
    /// which excludes the exercise from progress tracking entirely
    pub required_sets: u32,
    /// Sets completed so far, never exceeds `required_sets`
    pub completed_sets: u32,
    /// Rest applied between sets of this exercise
    pub rest_seconds: u32,
}

/// Controller phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created, no set started yet
    Idle,
    /// Working through the exercise at the given index
    Active {
        /// Index into the exercise list
        exercise: usize,
    },
    /// Counting down rest before the next set of the same exercise
    Resting {
        /// Index into the exercise list
        exercise: usize,
        /// Ticks until the rest ends
        seconds_remaining: u32,
    },
    /// Every prescribed set is done
    Completed,
    /// The user exited before finishing
    Closed,
}

/// Result of a `start_set` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Set recorded; resting before the next set of the same exercise
    Resting {
        /// Rest countdown just started
        seconds_remaining: u32,
    },
    /// Exercise finished; moved on to the next one with unmet sets
    Advanced {
        /// Exercise now active
        next_exercise_id: Uuid,
    },
    /// Every prescribed set is complete; finalization is scheduled
    AllSetsComplete,
    /// The call was invalid for the current state and changed nothing
    Rejected,
}

/// The in-progress workout state machine
#[derive(Debug)]
pub struct SessionController {
    title: String,
    exercises: Vec<ExerciseProgress>,
    phase: SessionPhase,
    elapsed_seconds: u64,
    samples: Vec<HeartRateSample>,
    finalize_in: Option<u32>,
    finalized: bool,
}

impl SessionController {
    /// Build a session from a workout template's prescriptions
    #[must_use]
    pub fn new(title: impl Into<String>, prescriptions: Vec<PrescribedExercise>) -> Self {
        let exercises = prescriptions
            .into_iter()
            .map(|p| ExerciseProgress {
                exercise_id: p.exercise_id,
                name: p.name,
                required_sets: parse_required_sets(&p.sets),
                completed_sets: 0,
                rest_seconds: p
                    .rest_seconds
                    .filter(|&rest| rest > 0)
                    .unwrap_or(DEFAULT_REST_SECONDS),
            })
            .collect();
        Self {
            title: title.into(),
            exercises,
            phase: SessionPhase::Idle,
            elapsed_seconds: 0,
            samples: Vec::new(),
            finalize_in: None,
            finalized: false,
        }
    }

    /// Exercises in prescription order with live progress
    #[must_use]
    pub fn exercises(&self) -> &[ExerciseProgress] {
        &self.exercises
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Seconds elapsed since the first set started
    #[must_use]
    pub const fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Record one completed set of the given exercise
    ///
    /// Valid only while the exercise still has unmet sets. Reaching the
    /// prescribed count advances to the next exercise with unmet sets, or
    /// schedules finalization when none remain; otherwise the controller
    /// rests before the next set.
    pub fn start_set(&mut self, exercise_id: Uuid) -> SetOutcome {
        if matches!(self.phase, SessionPhase::Completed | SessionPhase::Closed) {
            debug!("set ignored: session is over");
            return SetOutcome::Rejected;
        }
        let Some(index) = self
            .exercises
            .iter()
            .position(|e| e.exercise_id == exercise_id)
        else {
            debug!("set ignored: exercise {exercise_id} not in this session");
            return SetOutcome::Rejected;
        };
        if self.exercises[index].completed_sets >= self.exercises[index].required_sets {
            debug!(
                "set ignored: {} already has all sets completed",
                self.exercises[index].name
            );
            return SetOutcome::Rejected;
        }

        self.exercises[index].completed_sets += 1;
        let exercise = &self.exercises[index];

        if exercise.completed_sets == exercise.required_sets {
            if let Some(next) = self.next_unmet_exercise() {
                self.phase = SessionPhase::Active { exercise: next };
                return SetOutcome::Advanced {
                    next_exercise_id: self.exercises[next].exercise_id,
                };
            }
            self.phase = SessionPhase::Completed;
            self.finalize_in = Some(AUTO_FINISH_GRACE_TICKS);
            info!("all prescribed sets complete, finalizing after grace period");
            return SetOutcome::AllSetsComplete;
        }

        let seconds_remaining = exercise.rest_seconds;
        self.phase = SessionPhase::Resting {
            exercise: index,
            seconds_remaining,
        };
        SetOutcome::Resting { seconds_remaining }
    }

    /// Force the rest countdown to zero, returning to the same exercise
    ///
    /// Returns whether the controller was resting.
    pub fn skip_rest(&mut self) -> bool {
        if let SessionPhase::Resting { exercise, .. } = self.phase {
            self.phase = SessionPhase::Active { exercise };
            true
        } else {
            false
        }
    }

    /// Advance time by one second
    ///
    /// Drives the rest countdown and the finalization grace period. Returns
    /// the finalized summary on the tick the grace period ends.
    pub fn tick(&mut self) -> Option<WorkoutSummary> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Closed => return None,
            SessionPhase::Completed if self.finalize_in.is_none() => return None,
            _ => {}
        }

        self.elapsed_seconds += 1;

        if let SessionPhase::Resting {
            exercise,
            seconds_remaining,
        } = self.phase
        {
            let remaining = seconds_remaining.saturating_sub(1);
            self.phase = if remaining == 0 {
                SessionPhase::Active { exercise }
            } else {
                SessionPhase::Resting {
                    exercise,
                    seconds_remaining: remaining,
                }
            };
        }

        if let Some(countdown) = self.finalize_in {
            if countdown <= 1 {
                self.finalize_in = None;
                self.finalized = true;
                info!("live session finalized");
                return Some(self.summarize());
            }
            self.finalize_in = Some(countdown - 1);
        }
        None
    }

    /// Append a telemetry sample to the session record
    pub fn record_sample(&mut self, sample: HeartRateSample) {
        if !matches!(self.phase, SessionPhase::Closed) && !self.finalized {
            self.samples.push(sample);
        }
    }

    /// Most recent recorded bpm, for display
    #[must_use]
    pub fn latest_bpm(&self) -> Option<u16> {
        self.samples.last().map(|s| s.bpm)
    }

    /// Close the session, cancelling any pending finalization
    ///
    /// Returns a summary to persist when at least one set was completed and
    /// the session was not already finalized; `None` means discard.
    pub fn close(&mut self) -> Option<WorkoutSummary> {
        if self.finalized || matches!(self.phase, SessionPhase::Closed) {
            return None;
        }
        self.finalize_in = None;
        let summary = (self.total_completed() > 0).then(|| self.summarize());
        self.phase = SessionPhase::Closed;
        summary
    }

    /// Completed share of all prescribed sets, in percent
    ///
    /// Exercises with unparseable prescriptions count toward neither sum;
    /// an empty denominator yields zero.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        let (completed, required) = self.totals();
        if required == 0 {
            return 0;
        }
        u8::try_from(completed * 100 / required).unwrap_or(100)
    }

    /// Whether every prescribed set is complete
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, SessionPhase::Completed) || self.finalized
    }

    fn next_unmet_exercise(&self) -> Option<usize> {
        self.exercises
            .iter()
            .position(|e| e.required_sets > 0 && e.completed_sets < e.required_sets)
    }

    fn totals(&self) -> (u32, u32) {
        self.exercises
            .iter()
            .filter(|e| e.required_sets > 0)
            .fold((0, 0), |(completed, required), e| {
                (completed + e.completed_sets, required + e.required_sets)
            })
    }

    fn total_completed(&self) -> u32 {
        self.totals().0
    }

    fn summarize(&self) -> WorkoutSummary {
        WorkoutSummary {
            title: self.title.clone(),
            exercises: self
                .exercises
                .iter()
                .map(|e| ExerciseSummary {
                    exercise_id: e.exercise_id,
                    name: e.name.clone(),
                    required_sets: e.required_sets,
                    completed_sets: e.completed_sets,
                })
                .collect(),
            duration_seconds: self.elapsed_seconds,
            calories_estimate: self.estimate_calories(),
            heart_rate_samples: self.samples.clone(),
        }
    }

    fn estimate_calories(&self) -> f64 {
        let minutes = self.elapsed_seconds as f64 / 60.0;
        if self.samples.is_empty() {
            return minutes * KCAL_PER_MINUTE_FALLBACK;
        }
        let average_bpm = self.samples.iter().map(|s| f64::from(s.bpm)).sum::<f64>()
            / self.samples.len() as f64;
        (minutes * (average_bpm * KCAL_PER_MINUTE_SLOPE - KCAL_PER_MINUTE_OFFSET)).max(0.0)
    }
}

/// A prescription that does not parse to a positive integer contributes
/// zero sets, excluding the exercise from progress sums.
fn parse_required_sets(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(0)
}
