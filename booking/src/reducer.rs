//! The booking selection reducer.
//!
//! One reducer drives the whole form: selections, field edits, and the
//! submission pipeline. The pipeline is a three-stage machine
//! (Idle, Processing, Redirecting) wired with delayed actions, so the
//! simulated gateway wait and the redirect countdown both live in the
//! effect system rather than in ad-hoc timers.

use std::sync::Arc;

use ggwp_core::{
    SignalBus, SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec,
};

use crate::catalog::Catalog;
use crate::handoff::{self, HandoffOpener};
use crate::repository::BookingRepository;
use crate::types::{
    BookingId, BookingRecord, BookingState, DurationId, SeatId, Signal, SubmissionStatus, TierId,
};

/// Default simulated payment-gateway delay
pub const DEFAULT_PROCESSING_DELAY: std::time::Duration = std::time::Duration::from_millis(2000);
/// Default redirect countdown before the form resets
pub const DEFAULT_REDIRECT_DELAY: std::time::Duration = std::time::Duration::from_millis(1500);

/// Injected dependencies for the booking reducer
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Clock for booking ids and timestamps
    pub clock: Arc<dyn Clock>,
    /// Tier, duration, seat, and time-slot catalogs
    pub catalog: Arc<Catalog>,
    /// Booking collection
    pub repository: Arc<dyn BookingRepository>,
    /// Cross-component signal bus
    pub bus: Arc<SignalBus<Signal>>,
    /// Handoff deep-link destination
    pub opener: Arc<dyn HandoffOpener>,
    /// Simulated gateway delay before the record is built
    pub processing_delay: std::time::Duration,
    /// Countdown before the form resets after the handoff
    pub redirect_delay: std::time::Duration,
}

impl BookingEnvironment {
    /// Creates an environment with the default pipeline delays
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        catalog: Arc<Catalog>,
        repository: Arc<dyn BookingRepository>,
        bus: Arc<SignalBus<Signal>>,
        opener: Arc<dyn HandoffOpener>,
    ) -> Self {
        Self {
            clock,
            catalog,
            repository,
            bus,
            opener,
            processing_delay: DEFAULT_PROCESSING_DELAY,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
        }
    }

    /// Overrides both pipeline delays (tests use short ones)
    #[must_use]
    pub const fn with_delays(
        mut self,
        processing_delay: std::time::Duration,
        redirect_delay: std::time::Duration,
    ) -> Self {
        self.processing_delay = processing_delay;
        self.redirect_delay = redirect_delay;
        self
    }
}

/// Everything the booking form can do
#[derive(Clone, Debug)]
pub enum BookingAction {
    /// Choose a tier directly or via the inbound tier-selection signal
    SelectTier {
        /// Tier to select; unknown ids are ignored
        tier_id: TierId,
    },
    /// Choose a seat from the floor plan
    ///
    /// Selecting a seat also selects its owning tier. Tier selection never
    /// changes the seat; the override is one-directional.
    SelectSeat {
        /// Seat to select; disabled or unknown seats are ignored
        seat_id: SeatId,
    },
    /// Choose a session length
    SelectDuration {
        /// Duration to select; unknown ids are ignored
        duration_id: DurationId,
    },
    /// Set the customer name (raw, no format validation)
    UpdateName {
        /// New value
        value: String,
    },
    /// Set the phone number (raw, no format validation)
    UpdatePhone {
        /// New value
        value: String,
    },
    /// Set the booking date (raw, no format validation)
    UpdateDate {
        /// New value
        value: String,
    },
    /// Set the time slot
    UpdateTime {
        /// New value
        value: String,
    },
    /// Enter the submission pipeline
    Submit,
    /// Internal: the simulated gateway delay elapsed
    FinishProcessing,
    /// Internal: the record was persisted
    BookingPersisted {
        /// The record as written
        record: BookingRecord,
    },
    /// Internal: persistence failed
    PersistFailed {
        /// Human-readable failure description
        error: String,
    },
    /// Internal: the redirect countdown elapsed
    FinishRedirect,
}

/// Reducer for the booking form
#[derive(Clone, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn recompute_price(state: &mut BookingState, catalog: &Catalog) {
        if let (Some(tier), Some(duration)) = (
            catalog.tier(&state.tier_id),
            catalog.duration(&state.duration_id),
        ) {
            state.total_price = crate::pricing::compute_price(tier, duration);
        }
    }

    fn validate_submit(state: &BookingState) -> Result<(), String> {
        if state.customer_name.trim().is_empty()
            || state.phone_number.trim().is_empty()
            || state.date.trim().is_empty()
            || state.time.trim().is_empty()
            || state.seat_id.is_none()
        {
            return Err(
                "Please fill in all details, select a date/time, and choose a seat".to_string(),
            );
        }
        Ok(())
    }

    fn build_record(state: &BookingState, env: &BookingEnvironment) -> BookingRecord {
        let timestamp = env.clock.now().timestamp_millis();
        let platform = env
            .catalog
            .tier(&state.tier_id)
            .map_or_else(|| state.tier_id.to_string(), |t| t.name.clone());
        let duration = env
            .catalog
            .duration(&state.duration_id)
            .map_or_else(|| state.duration_id.to_string(), |d| d.full_label.clone());

        BookingRecord {
            id: BookingId::from_timestamp_ms(timestamp),
            customer_name: state.customer_name.clone(),
            phone_number: state.phone_number.clone(),
            date: format!("{} {}", state.date, state.time),
            platform,
            duration,
            price: state.total_price,
            timestamp,
            status: "CONFIRMED".to_string(),
        }
    }
}

impl Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action keeps the machine readable in one place
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        // Selections and edits are frozen once the pipeline starts, so the
        // persisted record reflects exactly the state at submission.
        let editing = matches!(
            action,
            BookingAction::SelectTier { .. }
                | BookingAction::SelectSeat { .. }
                | BookingAction::SelectDuration { .. }
                | BookingAction::UpdateName { .. }
                | BookingAction::UpdatePhone { .. }
                | BookingAction::UpdateDate { .. }
                | BookingAction::UpdateTime { .. }
        );
        if editing && state.status != SubmissionStatus::Idle {
            tracing::debug!(status = ?state.status, "Edit ignored while submission in flight");
            return SmallVec::new();
        }

        match action {
            BookingAction::SelectTier { tier_id } => {
                if env.catalog.tier(&tier_id).is_none() {
                    tracing::debug!(%tier_id, "Unknown tier ignored");
                    return SmallVec::new();
                }
                state.tier_id = tier_id;
                Self::recompute_price(state, &env.catalog);
                SmallVec::new()
            }

            BookingAction::SelectSeat { seat_id } => {
                let Some(seat) = env.catalog.seat(&seat_id) else {
                    tracing::debug!(%seat_id, "Unknown seat ignored");
                    return SmallVec::new();
                };
                if seat.is_disabled() {
                    tracing::debug!(%seat_id, status = ?seat.status, "Disabled seat ignored");
                    return SmallVec::new();
                }

                state.seat_id = Some(seat_id);
                state.tier_id = seat.tier_id.clone();
                Self::recompute_price(state, &env.catalog);
                SmallVec::new()
            }

            BookingAction::SelectDuration { duration_id } => {
                if env.catalog.duration(&duration_id).is_none() {
                    tracing::debug!(%duration_id, "Unknown duration ignored");
                    return SmallVec::new();
                }
                state.duration_id = duration_id;
                Self::recompute_price(state, &env.catalog);
                SmallVec::new()
            }

            BookingAction::UpdateName { value } => {
                state.customer_name = value;
                SmallVec::new()
            }
            BookingAction::UpdatePhone { value } => {
                state.phone_number = value;
                SmallVec::new()
            }
            BookingAction::UpdateDate { value } => {
                state.date = value;
                SmallVec::new()
            }
            BookingAction::UpdateTime { value } => {
                state.time = value;
                SmallVec::new()
            }

            BookingAction::Submit => {
                // Re-entrancy gate: the disabled submit button, enforced here
                if state.status != SubmissionStatus::Idle {
                    tracing::debug!(status = ?state.status, "Submit ignored, already in flight");
                    return SmallVec::new();
                }

                if let Err(error) = Self::validate_submit(state) {
                    state.last_error = Some(error);
                    return SmallVec::new();
                }

                state.last_error = None;
                state.status = SubmissionStatus::Processing;
                tracing::info!("Submission accepted, simulating gateway delay");

                smallvec![Effect::delay(
                    env.processing_delay,
                    BookingAction::FinishProcessing
                )]
            }

            BookingAction::FinishProcessing => {
                if state.status != SubmissionStatus::Processing {
                    return SmallVec::new();
                }

                let record = Self::build_record(state, env);
                let repository = Arc::clone(&env.repository);

                tracing::info!(booking_id = %record.id, "Persisting booking");

                smallvec![Effect::Future(Box::pin(async move {
                    match repository.append(&record) {
                        Ok(()) => Some(BookingAction::BookingPersisted { record }),
                        Err(error) => {
                            tracing::error!(%error, "Booking persistence failed");
                            Some(BookingAction::PersistFailed {
                                error: error.to_string(),
                            })
                        }
                    }
                }))]
            }

            BookingAction::BookingPersisted { record } => {
                if state.status != SubmissionStatus::Processing {
                    return SmallVec::new();
                }

                state.status = SubmissionStatus::Redirecting;
                env.bus.publish(&Signal::BookingUpdated);

                // Handoff fires exactly once, on entering Redirecting.
                if let Some(seat_id) = &state.seat_id {
                    let message = handoff::handoff_message(&record, seat_id, &state.date, &state.time);
                    let url = handoff::handoff_url(&message);
                    env.opener.open(&url);
                }

                tracing::info!(booking_id = %record.id, "Booking confirmed, redirect pending");

                smallvec![Effect::delay(
                    env.redirect_delay,
                    BookingAction::FinishRedirect
                )]
            }

            BookingAction::PersistFailed { error } => {
                // Fields are kept so the customer can retry as-is.
                state.status = SubmissionStatus::Idle;
                state.last_error = Some(error);
                SmallVec::new()
            }

            BookingAction::FinishRedirect => {
                if state.status != SubmissionStatus::Redirecting {
                    return SmallVec::new();
                }
                state.reset_fields();
                SmallVec::new()
            }
        }
    }
}
