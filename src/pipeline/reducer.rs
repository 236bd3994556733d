// Pipeline engine - the single pure state-transition function
//
// reduce(snapshot, intent) -> snapshot'. The input is never touched; every accepted
// intent produces a new snapshot with exactly one new log entry at the front.

use tracing::debug;

use super::audit::{AuditLog, LogEntry};
use super::clock::{Clock, SystemClock};
use super::error::PipelineError;
use super::guard::{advance, ensure_absent, require};
use super::intent::{Intent, IntentKind};
use super::machines::{
    InstallationAction, LeadStep, QuoteStep, ReconciliationStep, SalesAction, SalesStep,
    ServiceStep, StatusMachine,
};
use super::snapshot::Snapshot;
use super::sync::{self, Cascade};
use super::types::{
    EntityKind, Lead, Reconciliation, ReconciliationStatus, SalesOrderStatus, ServiceOrderStatus,
    DEFAULT_CUSTOMER_NAME, INSTALLATION_ID, LEAD_ID, MEASUREMENT_ID, RECONCILIATION_ID,
};

/// Actor labels written to the audit log
pub mod actors {
    pub const SYSTEM: &str = "system";
    pub const SALES_CONSULTANT: &str = "sales consultant";
    pub const STORE_MANAGER: &str = "store manager";
    pub const CUSTOMER: &str = "customer";
    pub const ORDER_DESK: &str = "order desk";
    pub const CUSTOMER_SERVICE: &str = "customer service";
    pub const FIELD_TECHNICIAN: &str = "field technician";
    pub const INSTALLER: &str = "installer";
    pub const FINANCE: &str = "finance";
}

/// Result of an accepted intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub snapshot: Snapshot,
    /// Cascade that fired alongside the local change, if any
    pub cascade: Option<Cascade>,
}

/// What a handler wants logged for the step it just applied
struct Effect {
    actor: &'static str,
    action: &'static str,
    detail: String,
    cascade: Option<Cascade>,
}

impl Effect {
    fn new(actor: &'static str, action: &'static str, detail: impl Into<String>) -> Self {
        Self {
            actor,
            action,
            detail: detail.into(),
            cascade: None,
        }
    }

    /// Folds the cascade's effect into the same message as its cause
    fn with_cascade(mut self, cascade: Option<Cascade>) -> Self {
        if let Some(cascade) = cascade {
            self.detail = format!("{} {}", self.detail, cascade.summary());
        }
        self.cascade = cascade;
        self
    }
}

#[derive(Debug, Clone)]
pub struct PipelineEngine<C = SystemClock> {
    clock: C,
    customer_name: String,
}

impl PipelineEngine<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for PipelineEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> PipelineEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            customer_name: DEFAULT_CUSTOMER_NAME.to_string(),
        }
    }

    /// Customer name recorded on newly created leads
    pub fn with_customer_name(mut self, customer_name: impl Into<String>) -> Self {
        self.customer_name = customer_name.into();
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Lenient reduce: an intent that does not apply returns the input unchanged
    /// and writes nothing to the log.
    pub fn reduce(&self, snapshot: &Snapshot, intent: &Intent) -> Snapshot {
        match self.try_reduce(snapshot, intent) {
            Ok(applied) => applied.snapshot,
            Err(error) => {
                debug!(intent = %intent.kind(), %error, "Pipeline intent ignored");
                snapshot.clone()
            }
        }
    }

    /// Strict reduce: reports why an intent was not applied
    pub fn try_reduce(&self, snapshot: &Snapshot, intent: &Intent) -> Result<Applied, PipelineError> {
        let kind = intent.kind();

        let mut next = snapshot.clone();
        let effect = match intent {
            Intent::CreateLead => self.create_lead(&mut next, kind)?,
            Intent::AssignLead => Self::lead_step(&mut next, LeadStep::Assign, kind)?,
            Intent::StartFollowing => Self::lead_step(&mut next, LeadStep::StartFollowing, kind)?,
            Intent::TagLead { tag } => Self::tag_lead(&mut next, tag, kind)?,
            Intent::ConvertLead => self.convert_lead(&mut next, kind)?,
            Intent::CloseLead => Self::lead_step(&mut next, LeadStep::Close, kind)?,
            Intent::PublishQuote => Self::publish_quote(&mut next, kind)?,
            Intent::RequestMeasurement => Self::request_measurement(&mut next, kind)?,
            Intent::MeasurementAction { action } => {
                Self::measurement_action(&mut next, *action, kind)?
            }
            Intent::NewQuoteVersion => self.new_quote_version(&mut next, kind)?,
            Intent::ConfirmQuote => Self::confirm_quote(&mut next, kind)?,
            Intent::SalesAction { action } => Self::sales_action(&mut next, *action, kind)?,
            Intent::CreateInstallation => Self::create_installation(&mut next, kind)?,
            Intent::InstallationAction { action } => {
                Self::installation_action(&mut next, *action, kind)?
            }
            Intent::CreateReconciliation => Self::create_reconciliation(&mut next, kind)?,
            Intent::ReconciliationAction { action } => {
                Self::reconciliation_action(&mut next, *action, kind)?
            }
            Intent::Reset => return Ok(self.reset()),
        };

        debug!(
            intent = %kind,
            actor = effect.actor,
            cascade = ?effect.cascade,
            detail = %effect.detail,
            "Pipeline intent applied"
        );

        next.log.prepend(LogEntry::new(
            self.clock.now(),
            effect.actor,
            effect.action,
            effect.detail,
        ));

        Ok(Applied {
            snapshot: next,
            cascade: effect.cascade,
        })
    }

    fn reset(&self) -> Applied {
        debug!(intent = %IntentKind::Reset, "Pipeline reset");
        let entry = LogEntry::new(
            self.clock.now(),
            actors::SYSTEM,
            "reset",
            "Notebook page turned (reset)",
        );
        Applied {
            snapshot: Snapshot {
                log: AuditLog::starting_with(entry),
                ..Snapshot::default()
            },
            cascade: None,
        }
    }

    /// Whether `intent` would be accepted against `snapshot`
    pub fn check(&self, snapshot: &Snapshot, intent: &Intent) -> Result<(), PipelineError> {
        self.try_reduce(snapshot, intent).map(|_| ())
    }

    fn create_lead(&self, next: &mut Snapshot, intent: IntentKind) -> Result<Effect, PipelineError> {
        ensure_absent(&next.lead, intent, EntityKind::Lead)?;
        next.lead = Some(Lead::new(self.customer_name.clone()));
        Ok(Effect::new(
            actors::SALES_CONSULTANT,
            "create lead",
            format!(
                "Captured new customer {}, lead {}.",
                self.customer_name, LEAD_ID
            ),
        ))
    }

    fn lead_step(next: &mut Snapshot, step: LeadStep, intent: IntentKind) -> Result<Effect, PipelineError> {
        let lead = require(&mut next.lead, intent, EntityKind::Lead)?;
        lead.status = advance(lead.status, step, intent, EntityKind::Lead)?;
        let effect = match step {
            LeadStep::Assign => Effect::new(
                actors::STORE_MANAGER,
                "assign",
                "Lead assigned to a sales consultant.",
            ),
            LeadStep::StartFollowing => Effect::new(
                actors::SALES_CONSULTANT,
                "follow up",
                "Started contacting the customer.",
            ),
            LeadStep::Close => Effect::new(
                actors::SALES_CONSULTANT,
                "close",
                "Lead marked invalid.",
            ),
            LeadStep::Convert => Effect::new(actors::SYSTEM, "convert", "Lead converted."),
        };
        Ok(effect)
    }

    fn tag_lead(next: &mut Snapshot, tag: &str, intent: IntentKind) -> Result<Effect, PipelineError> {
        let lead = require(&mut next.lead, intent, EntityKind::Lead)?;
        if !lead.status.accepts_tags() {
            return Err(PipelineError::IllegalTransition {
                intent,
                entity: EntityKind::Lead,
                status: lead.status.label(),
            });
        }
        if tag.trim().is_empty() {
            return Err(PipelineError::InvalidPayload {
                intent,
                reason: "tag must not be blank".to_string(),
            });
        }
        lead.tags.push(tag.to_string());
        Ok(Effect::new(
            actors::SALES_CONSULTANT,
            "tag",
            format!("Added tag: {tag}"),
        ))
    }

    fn convert_lead(&self, next: &mut Snapshot, intent: IntentKind) -> Result<Effect, PipelineError> {
        let lead = require(&mut next.lead, intent, EntityKind::Lead)?;
        lead.status = advance(lead.status, LeadStep::Convert, intent, EntityKind::Lead)?;
        let cascade = sync::open_quote(next, intent, self.clock.now())?;
        Ok(Effect::new(actors::SYSTEM, "convert", "Lead converted.").with_cascade(Some(cascade)))
    }

    fn publish_quote(next: &mut Snapshot, intent: IntentKind) -> Result<Effect, PipelineError> {
        let quote = require(&mut next.quote, intent, EntityKind::Quote)?;
        quote.current_status = advance(quote.current_status, QuoteStep::Publish, intent, EntityKind::Quote)?;
        Ok(Effect::new(
            actors::SALES_CONSULTANT,
            "publish",
            format!("Quote {} published as preliminary.", quote.current_version_id()),
        ))
    }

    fn request_measurement(next: &mut Snapshot, intent: IntentKind) -> Result<Effect, PipelineError> {
        let cascade = sync::start_measuring(next, intent)?;
        Ok(Effect::new(
            actors::SYSTEM,
            "measurement request",
            format!("Measurement task {MEASUREMENT_ID} created."),
        )
        .with_cascade(Some(cascade)))
    }

    fn measurement_action(
        next: &mut Snapshot,
        step: ServiceStep,
        intent: IntentKind,
    ) -> Result<Effect, PipelineError> {
        let measurement = require(&mut next.measurement, intent, EntityKind::Measurement)?;
        measurement.status = advance(measurement.status, step, intent, EntityKind::Measurement)?;
        let completed = measurement.status == ServiceOrderStatus::Completed;

        let detail = match step {
            ServiceStep::Assign => "Measurer dispatched.",
            ServiceStep::Accept => "Measurer accepted the job.",
            ServiceStep::CompleteSite => "On-site measurement done, awaiting confirmation.",
            ServiceStep::Reject => "Measurement rejected, reassigning.",
            ServiceStep::Confirm => "Measurement data confirmed.",
        };
        let cascade = if completed {
            sync::revise_quote(&mut next.quote)
        } else {
            None
        };
        Ok(Effect::new(actors::FIELD_TECHNICIAN, "progress update", detail).with_cascade(cascade))
    }

    fn new_quote_version(&self, next: &mut Snapshot, intent: IntentKind) -> Result<Effect, PipelineError> {
        let quote = require(&mut next.quote, intent, EntityKind::Quote)?;
        quote.current_status = advance(quote.current_status, QuoteStep::AddVersion, intent, EntityKind::Quote)?;
        let version_id = quote.push_version(self.clock.now());
        Ok(Effect::new(
            actors::SALES_CONSULTANT,
            "new version",
            format!("Created {version_id} from measurement data."),
        ))
    }

    fn confirm_quote(next: &mut Snapshot, intent: IntentKind) -> Result<Effect, PipelineError> {
        let cascade = sync::open_sales_order(next, intent)?;
        let version = next
            .quote
            .as_ref()
            .map(|quote| quote.current_version_id())
            .unwrap_or_default();
        Ok(Effect::new(
            actors::CUSTOMER,
            "sign-off",
            format!("Quote {version} confirmed."),
        )
        .with_cascade(Some(cascade)))
    }

    fn sales_action(next: &mut Snapshot, action: SalesAction, intent: IntentKind) -> Result<Effect, PipelineError> {
        let order = require(&mut next.sales_order, intent, EntityKind::SalesOrder)?;
        order.status = advance(order.status, action.step(), intent, EntityKind::SalesOrder)?;
        let detail = match action.step() {
            SalesStep::Procure => {
                let procurement_id = order.next_procurement_id();
                order.procurement_ids.push(procurement_id.clone());
                format!("Procurement {procurement_id} recorded.")
            }
            SalesStep::Ship => {
                order.logistics_status = Some("dispatched".to_string());
                "Logistics details added, goods dispatched.".to_string()
            }
            _ => "Sales order confirmed.".to_string(),
        };
        Ok(Effect::new(actors::ORDER_DESK, "order update", detail))
    }

    fn create_installation(next: &mut Snapshot, intent: IntentKind) -> Result<Effect, PipelineError> {
        let cascade = sync::schedule_installation(next, intent)?;
        Ok(Effect::new(
            actors::CUSTOMER_SERVICE,
            "installation request",
            format!("Installation task {INSTALLATION_ID} created."),
        )
        .with_cascade(Some(cascade)))
    }

    fn installation_action(
        next: &mut Snapshot,
        action: InstallationAction,
        intent: IntentKind,
    ) -> Result<Effect, PipelineError> {
        let installation = require(&mut next.installation, intent, EntityKind::Installation)?;

        let Some(step) = action.step() else {
            // Side-effect-only: logged, status untouched, closed once terminal
            if installation.status.is_terminal() {
                return Err(PipelineError::IllegalTransition {
                    intent,
                    entity: EntityKind::Installation,
                    status: installation.status.label(),
                });
            }
            return Ok(Effect::new(
                actors::INSTALLER,
                "progress update",
                "Site photos uploaded.",
            ));
        };

        installation.status = advance(installation.status, step, intent, EntityKind::Installation)?;
        let completed = installation.status == ServiceOrderStatus::Completed;

        let detail = match step {
            ServiceStep::Assign => "Installer dispatched.",
            ServiceStep::Accept => "Installer accepted the job.",
            ServiceStep::CompleteSite => "Installation done, awaiting acceptance.",
            ServiceStep::Reject => "Installation rejected.",
            ServiceStep::Confirm => "Installation accepted.",
        };
        let cascade = if completed {
            sync::await_reconciliation(&mut next.sales_order)
        } else {
            None
        };
        Ok(Effect::new(actors::INSTALLER, "progress update", detail).with_cascade(cascade))
    }

    fn create_reconciliation(next: &mut Snapshot, intent: IntentKind) -> Result<Effect, PipelineError> {
        let order = require(&mut next.sales_order, intent, EntityKind::SalesOrder)?;
        if order.status != SalesOrderStatus::Reconciliation {
            return Err(PipelineError::IllegalTransition {
                intent,
                entity: EntityKind::SalesOrder,
                status: order.status.label(),
            });
        }
        ensure_absent(&next.reconciliation, intent, EntityKind::Reconciliation)?;
        next.reconciliation = Some(Reconciliation::open(&order.id));
        Ok(Effect::new(
            actors::FINANCE,
            "reconciliation opened",
            format!("Settlement statement {RECONCILIATION_ID} generated."),
        ))
    }

    fn reconciliation_action(
        next: &mut Snapshot,
        step: ReconciliationStep,
        intent: IntentKind,
    ) -> Result<Effect, PipelineError> {
        let reconciliation = require(&mut next.reconciliation, intent, EntityKind::Reconciliation)?;
        reconciliation.status = advance(reconciliation.status, step, intent, EntityKind::Reconciliation)?;
        let completed = reconciliation.status == ReconciliationStatus::Completed;

        let detail = match step {
            ReconciliationStep::Start => "Started checking the accounts.",
            ReconciliationStep::Discrepancy => "Discrepancy found, needs review.",
            ReconciliationStep::Adjust => "Discrepancy adjusted.",
            ReconciliationStep::Complete => "Reconciliation completed.",
        };
        let cascade = if completed {
            sync::close_sales_order(&mut next.sales_order)
        } else {
            None
        };
        Ok(Effect::new(actors::FINANCE, "reconciliation update", detail).with_cascade(cascade))
    }
}

/// Reduce with the host clock and default settings
pub fn reduce(snapshot: &Snapshot, intent: &Intent) -> Snapshot {
    PipelineEngine::new().reduce(snapshot, intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::clock::FixedClock;
    use crate::pipeline::types::{LeadStatus, QuoteStatus};
    use chrono::{TimeZone, Utc};

    fn engine() -> PipelineEngine<FixedClock> {
        let instant = Utc.with_ymd_and_hms(2024, 11, 1, 9, 30, 0).unwrap();
        PipelineEngine::with_clock(FixedClock::at(instant))
    }

    fn run(engine: &PipelineEngine<FixedClock>, intents: &[Intent]) -> Snapshot {
        intents
            .iter()
            .fold(Snapshot::empty(), |snapshot, intent| engine.reduce(&snapshot, intent))
    }

    #[test]
    fn test_create_lead_logs_once() {
        let engine = engine();
        let snapshot = engine.reduce(&Snapshot::empty(), &Intent::CreateLead);

        let lead = snapshot.lead.as_ref().unwrap();
        assert_eq!(lead.status, LeadStatus::New);
        assert_eq!(lead.id, LEAD_ID);
        assert_eq!(snapshot.log.len(), 1);
        assert_eq!(snapshot.log.latest().unwrap().actor, actors::SALES_CONSULTANT);
        assert_eq!(snapshot.log.latest().unwrap().timestamp, engine.clock().now());
    }

    #[test]
    fn test_customer_name_is_configurable() {
        let engine = engine().with_customer_name("Li Si");
        let snapshot = engine.reduce(&Snapshot::empty(), &Intent::CreateLead);
        assert_eq!(snapshot.lead.unwrap().customer_name, "Li Si");
    }

    #[test]
    fn test_second_create_lead_is_rejected() {
        let engine = engine();
        let once = engine.reduce(&Snapshot::empty(), &Intent::CreateLead);

        let err = engine.try_reduce(&once, &Intent::CreateLead).unwrap_err();
        assert_eq!(
            err,
            PipelineError::DuplicateEntity {
                intent: IntentKind::CreateLead,
                entity: EntityKind::Lead
            }
        );
        assert_eq!(engine.reduce(&once, &Intent::CreateLead), once);
    }

    #[test]
    fn test_missing_prerequisite_is_reported() {
        let err = engine()
            .try_reduce(&Snapshot::empty(), &Intent::measurement(ServiceStep::Assign))
            .unwrap_err();
        assert_eq!(
            err,
            PipelineError::MissingPrerequisite {
                intent: IntentKind::MeasurementAction,
                entity: EntityKind::Measurement
            }
        );
    }

    #[test]
    fn test_tagging_only_while_following() {
        let engine = engine();
        let assigned = run(&engine, &[Intent::CreateLead, Intent::AssignLead]);
        assert!(engine.check(&assigned, &Intent::tag("quoted")).is_err());

        let following = engine.reduce(&assigned, &Intent::StartFollowing);
        let once = engine.reduce(&following, &Intent::tag("quoted"));
        let twice = engine.reduce(&once, &Intent::tag("quoted"));
        let lead = twice.lead.as_ref().unwrap();
        assert_eq!(lead.tags, vec!["quoted", "quoted"]);
        assert_eq!(lead.status, LeadStatus::Following);
        assert_eq!(twice.log.len(), following.log.len() + 2);
    }

    #[test]
    fn test_blank_tag_is_invalid_payload() {
        let engine = engine();
        let following = run(&engine, &[Intent::CreateLead, Intent::AssignLead, Intent::StartFollowing]);
        let err = engine.try_reduce(&following, &Intent::tag("   ")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPayload { .. }));
    }

    #[test]
    fn test_convert_logs_cause_and_effect_together() {
        let engine = engine();
        let following = run(&engine, &[Intent::CreateLead, Intent::AssignLead, Intent::StartFollowing]);
        let applied = engine.try_reduce(&following, &Intent::ConvertLead).unwrap();

        assert_eq!(applied.cascade, Some(Cascade::QuoteOpened));
        assert_eq!(applied.snapshot.log.len(), following.log.len() + 1);
        let detail = &applied.snapshot.log.latest().unwrap().detail;
        assert!(detail.contains("Lead converted."));
        assert!(detail.contains("QT-888"));
        assert_eq!(
            applied.snapshot.quote.as_ref().map(|q| q.current_status),
            Some(QuoteStatus::Draft)
        );
    }

    #[test]
    fn test_close_lead_is_terminal() {
        let engine = engine();
        let closed = run(
            &engine,
            &[Intent::CreateLead, Intent::AssignLead, Intent::StartFollowing, Intent::CloseLead],
        );
        assert_eq!(closed.lead.as_ref().unwrap().status, LeadStatus::Invalid);
        assert_eq!(engine.reduce(&closed, &Intent::ConvertLead), closed);
        assert!(closed.quote.is_none());
    }

    #[test]
    fn test_reset_clears_everything_but_one_entry() {
        let engine = engine();
        let busy = run(&engine, &[Intent::CreateLead, Intent::AssignLead]);
        let reset = engine.reduce(&busy, &Intent::Reset);

        assert!(reset.is_blank());
        assert_eq!(reset.log.len(), 1);
        assert_eq!(reset.log.latest().unwrap().action, "reset");
    }

    #[test]
    fn test_rejected_intent_leaves_input_untouched() {
        let engine = engine();
        let before = run(&engine, &[Intent::CreateLead]);
        let copy = before.clone();
        let _ = engine.try_reduce(&before, &Intent::ConfirmQuote);
        assert_eq!(before, copy);
    }
}
