//! Background state consumption.
//!
//! [`StateStream`] drives a [`Simulation`] to completion while handing
//! emitted states to a consumer callback on a separate thread through a
//! bounded channel, so storage or analysis overlaps the next step's
//! compute. Emitted states are immutable, which is what makes handing
//! them across the thread boundary safe without coordination.

use std::error::Error;
use std::fmt;
use std::thread;

use crate::state::SimulationState;
use crate::step::Simulation;
use darcy_core::RunError;

/// Errors from a streamed run.
#[derive(Debug)]
pub enum StreamError {
    /// The simulation terminated fatally; the last stable state stays
    /// available on the simulation.
    Run(RunError),
    /// The consumer thread panicked.
    ConsumerPanicked,
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run(e) => write!(f, "run failed: {e}"),
            Self::ConsumerPanicked => write!(f, "state consumer panicked"),
        }
    }
}

impl Error for StreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Run(e) => Some(e),
            Self::ConsumerPanicked => None,
        }
    }
}

/// Summary of a completed streamed run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    /// Steps the engine accepted.
    pub states_emitted: u64,
    /// States handed to the consumer (per the output cadence).
    pub states_delivered: u64,
    /// Final simulation time, seconds.
    pub final_time: f64,
}

/// Drives a simulation while a background thread consumes its states.
pub struct StateStream<F> {
    simulation: Simulation,
    consumer: F,
    channel_capacity: usize,
}

impl<F> StateStream<F>
where
    F: FnMut(SimulationState) + Send + 'static,
{
    /// Couple a simulation to a consumer. `channel_capacity` bounds how
    /// far the engine may run ahead of the consumer.
    pub fn new(simulation: Simulation, consumer: F) -> Self {
        Self {
            simulation,
            consumer,
            channel_capacity: 8,
        }
    }

    /// Override the channel capacity (default 8).
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Run to completion, honoring the solver configuration's output
    /// cadence: every Nth accepted state (and always the final one)
    /// reaches the consumer.
    ///
    /// Returns the simulation alongside the result so callers can
    /// inspect the last stable state after a fatal termination.
    pub fn consume(self) -> (Simulation, Result<RunSummary, StreamError>) {
        let StateStream {
            mut simulation,
            mut consumer,
            channel_capacity,
        } = self;
        let cadence = simulation.config().output_frequency as u64;
        let (sender, receiver) = crossbeam_channel::bounded::<SimulationState>(channel_capacity);

        let handle = thread::spawn(move || {
            for state in receiver {
                consumer(state);
            }
        });

        let mut states_emitted: u64 = 0;
        let mut states_delivered: u64 = 0;
        let mut pending: Option<SimulationState> = None;
        let mut failure: Option<StreamError> = None;

        while let Some(result) = simulation.next() {
            match result {
                Ok(state) => {
                    states_emitted += 1;
                    if states_emitted % cadence == 0 {
                        if sender.send(state).is_err() {
                            failure = Some(StreamError::ConsumerPanicked);
                            break;
                        }
                        states_delivered += 1;
                        pending = None;
                    } else {
                        // Held back by the cadence; delivered at the
                        // end if it turns out to be the final state.
                        pending = Some(state);
                    }
                }
                Err(e) => {
                    failure = Some(StreamError::Run(e));
                    break;
                }
            }
        }

        if failure.is_none() {
            if let Some(state) = pending.take() {
                if sender.send(state).is_err() {
                    failure = Some(StreamError::ConsumerPanicked);
                } else {
                    states_delivered += 1;
                }
            }
        }

        drop(sender);
        if handle.join().is_err() && failure.is_none() {
            failure = Some(StreamError::ConsumerPanicked);
        }

        let final_time = simulation.timer().elapsed();
        let result = match failure {
            Some(e) => Err(e),
            None => Ok(RunSummary {
                states_emitted,
                states_delivered,
                final_time,
            }),
        };
        (simulation, result)
    }
}
