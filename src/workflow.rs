//! The contact-submission workflow: field state, inline validation, and the
//! `idle -> submitting -> succeeded | failed -> idle` outcome lifecycle.
//!
//! One [`ContactWorkflow`] owns the form and its outcome. `submit` borrows it
//! mutably for the whole dispatch, so a second submission cannot start while
//! one is in flight. Hosts that drive their own event loop can use
//! [`ContactWorkflow::begin`] and [`ContactWorkflow::complete`] instead, in
//! which case a `begin` during `submitting` is ignored.

use crate::contact::{
    validate_field, validate_form, ContactForm, ContactSubmission, Field, FormKind,
    ValidationErrors, ValidationPolicy,
};
use crate::dispatch::{Delivery, DispatchError, Dispatcher, ReasonCode};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

pub const DEFAULT_DISPLAY_WINDOW: Duration = Duration::from_secs(5);
pub const SUCCESS_MESSAGE: &str = "Thank you! Your message has been sent successfully.";
pub const INVALID_FORM_MESSAGE: &str = "Please correct the errors in the form.";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Submitting {
        attempt: Uuid,
    },
    Succeeded {
        delivery: Delivery,
        since: Instant,
    },
    Failed {
        reason: ReasonCode,
        message: String,
        since: Instant,
    },
}

impl SubmissionState {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting { .. } => "submitting",
            SubmissionState::Succeeded { .. } => "succeeded",
            SubmissionState::Failed { .. } => "failed",
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting { .. })
    }

    /// Text of the outcome banner, if one is showing.
    pub fn banner(&self) -> Option<&str> {
        match self {
            SubmissionState::Succeeded { .. } => Some(SUCCESS_MESSAGE),
            SubmissionState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    fn shown_since(&self) -> Option<Instant> {
        match self {
            SubmissionState::Succeeded { since, .. } | SubmissionState::Failed { since, .. } => {
                Some(*since)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BeginError {
    #[error("A submission is already in flight")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The trigger was ignored because a submission is in flight.
    Ignored,
    /// Validation blocked the submission; nothing was dispatched.
    Invalid(ValidationErrors),
    Delivered(Delivery),
    Failed(DispatchError),
}

#[derive(Debug, Clone, Copy)]
pub struct WorkflowOptions {
    pub kind: FormKind,
    pub policy: ValidationPolicy,
    pub display_window: Duration,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            kind: FormKind::Full,
            policy: ValidationPolicy::default(),
            display_window: DEFAULT_DISPLAY_WINDOW,
        }
    }
}

#[derive(Debug)]
pub struct ContactWorkflow<D> {
    dispatcher: D,
    options: WorkflowOptions,
    form: ContactForm,
    touched: BTreeSet<Field>,
    errors: ValidationErrors,
    // aggregate "please correct" banner and when it appeared
    invalid_notice: Option<Instant>,
    state: SubmissionState,
}

impl<D: Dispatcher> ContactWorkflow<D> {
    pub fn new(dispatcher: D, options: WorkflowOptions) -> Self {
        Self {
            dispatcher,
            options,
            form: ContactForm::default(),
            touched: BTreeSet::new(),
            errors: ValidationErrors::default(),
            invalid_notice: None,
            state: SubmissionState::Idle,
        }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Let background deliveries finish. Call before the runtime shuts down.
    pub async fn shutdown(&self) {
        self.dispatcher.shutdown().await
    }

    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Inline error for a field. Untouched fields never show one.
    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn field_errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Aggregate banner shown after a blocked submit.
    pub fn invalid_notice(&self) -> Option<&str> {
        self.invalid_notice.map(|_| INVALID_FORM_MESSAGE)
    }

    /// Record user input. A field that was already touched is re-validated,
    /// so its error disappears as soon as the value becomes valid.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
        if self.touched.contains(&field) {
            self.revalidate(field);
        }
    }

    /// Fill several fields at once, e.g. from a decoded form body.
    pub fn fill(&mut self, form: ContactForm) {
        for field in Field::ALL {
            self.set_field(field, form.get(field));
        }
    }

    /// Mark a field as visited (blur) and validate it.
    pub fn touch(&mut self, field: Field) {
        self.touched.insert(field);
        self.revalidate(field);
    }

    fn revalidate(&mut self, field: Field) {
        match validate_field(field, self.form.get(field), &self.options.policy) {
            Some(error) if self.options.kind.fields().contains(&field) => {
                self.errors.insert(field, error)
            }
            _ => self.errors.remove(field),
        }
    }

    /// Validate and capture the form, moving to `submitting`.
    pub fn begin(&mut self) -> Result<ContactSubmission, BeginError> {
        if let SubmissionState::Submitting { attempt } = &self.state {
            tracing::debug!(%attempt, "Submit ignored while a submission is in flight.");
            return Err(BeginError::Busy);
        }
        self.touched
            .extend(self.options.kind.fields().iter().copied());
        match validate_form(&self.form, self.options.kind, &self.options.policy) {
            Ok(submission) => {
                self.errors.clear();
                self.invalid_notice = None;
                self.state = SubmissionState::Submitting {
                    attempt: submission.id,
                };
                tracing::info!(
                    attempt = %submission.id,
                    strategy = self.dispatcher.strategy(),
                    "Contact submission started."
                );
                Ok(submission)
            }
            Err(errors) => {
                tracing::debug!(
                    fields = ?errors.fields().collect::<Vec<_>>(),
                    "Contact submission blocked by validation."
                );
                self.errors = errors.clone();
                self.invalid_notice = Some(Instant::now());
                Err(BeginError::Invalid(errors))
            }
        }
    }

    /// Apply the dispatcher's result to the submission `attempt`. Results for
    /// any other attempt, or arriving outside `submitting`, are dropped.
    pub fn complete(
        &mut self,
        attempt: Uuid,
        result: Result<Delivery, DispatchError>,
    ) -> SubmitOutcome {
        match &self.state {
            SubmissionState::Submitting { attempt: current } if *current == attempt => {}
            _ => {
                tracing::warn!(%attempt, state = self.state.label(), "Stale delivery result dropped.");
                return SubmitOutcome::Ignored;
            }
        }
        let now = Instant::now();
        match result {
            Ok(delivery) => {
                tracing::info!(%attempt, ?delivery, "Contact submission delivered.");
                self.form.clear();
                self.touched.clear();
                self.errors.clear();
                self.state = SubmissionState::Succeeded {
                    delivery,
                    since: now,
                };
                SubmitOutcome::Delivered(delivery)
            }
            Err(error) => {
                let reason = error.reason();
                tracing::error!(
                    %attempt,
                    reason = reason.as_str(),
                    %error,
                    "Contact submission failed."
                );
                self.state = SubmissionState::Failed {
                    reason,
                    message: error.user_message(),
                    since: now,
                };
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Validate, dispatch and record the outcome.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let submission = match self.begin() {
            Ok(submission) => submission,
            Err(BeginError::Busy) => return SubmitOutcome::Ignored,
            Err(BeginError::Invalid(errors)) => return SubmitOutcome::Invalid(errors),
        };
        let result = self.dispatcher.dispatch(&submission).await;
        self.complete(submission.id, result)
    }

    /// User acknowledged the outcome banner.
    pub fn dismiss(&mut self) {
        if self.state.shown_since().is_some() {
            self.state = SubmissionState::Idle;
        }
        self.invalid_notice = None;
    }

    /// Earliest instant at which a banner expires.
    pub fn next_deadline(&self) -> Option<Instant> {
        let window = self.options.display_window;
        [self.state.shown_since(), self.invalid_notice]
            .into_iter()
            .flatten()
            .map(|since| since + window)
            .min()
    }

    /// Expire banners whose display window has passed at `now`.
    pub fn tick(&mut self, now: Instant) {
        let window = self.options.display_window;
        if let Some(since) = self.state.shown_since() {
            if now >= since + window {
                tracing::debug!(state = self.state.label(), "Outcome banner expired.");
                self.state = SubmissionState::Idle;
            }
        }
        if let Some(since) = self.invalid_notice {
            if now >= since + window {
                self.invalid_notice = None;
            }
        }
    }

    /// Wait until every banner has expired.
    pub async fn settle(&mut self) {
        while let Some(deadline) = self.next_deadline() {
            tokio::time::sleep_until(deadline).await;
            self.tick(Instant::now());
        }
    }
}
