//! Mission resolution, dispatch coordination, and the tick loop for the
//! dispatch engine.
//!
//! This crate owns the scheduler that drives every state change: calls
//! open, agents are dispatched, missions resolve by a weighted random
//! roll, and agents return to the pool.
//!
//! # Modules
//!
//! - [`clock`] -- Simulation clock and the [`Moment`] stamp.
//! - [`config`] -- Configuration loading from `dispatch-config.yaml`.
//! - [`control`] -- Pause, resume, interval, and stop control for the loop.
//! - [`director`] -- [`DispatchDirector`] trait plus stub and scripted
//!   directors.
//! - [`dispatch`] -- [`DispatchCoordinator`]: missions, the active set,
//!   and the available pool.
//! - [`events`] -- [`EventSink`] seam and an in-memory log.
//! - [`mission`] -- Call instances and their lifecycle.
//! - [`movement`] -- [`MovementSource`] seam and scripted movement.
//! - [`outcome`] -- Roll classification into four outcomes.
//! - [`random`] -- [`RandomSource`] seam, seeded and scripted sources.
//! - [`resolution`] -- Due checks and the resolve step.
//! - [`runner`] -- The async run loop around [`tick::run_tick`].
//! - [`scoring`] -- Success-probability formulas and shaping curves.
//! - [`services`] -- The collaborator bundle passed to coordinator calls.
//! - [`tick`] -- The four-phase tick cycle.
//!
//! [`Moment`]: clock::Moment
//! [`DispatchDirector`]: director::DispatchDirector
//! [`DispatchCoordinator`]: dispatch::DispatchCoordinator
//! [`EventSink`]: events::EventSink
//! [`MovementSource`]: movement::MovementSource
//! [`RandomSource`]: random::RandomSource

pub mod clock;
pub mod config;
pub mod control;
pub mod director;
pub mod dispatch;
pub mod events;
pub mod mission;
pub mod movement;
pub mod outcome;
pub mod random;
pub mod resolution;
pub mod runner;
pub mod scoring;
pub mod services;
pub mod tick;
