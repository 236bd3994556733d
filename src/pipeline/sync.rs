// Cross-document synchronization rules
//
// Each rule mutates the working copy of the next snapshot only. The reducer
// discards that copy on any error, so a cascade is either fully visible or not at all.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::error::PipelineError;
use super::guard::{advance, ensure_absent, require};
use super::intent::IntentKind;
use super::machines::{QuoteStep, SalesStep, StatusMachine};
use super::snapshot::Snapshot;
use super::types::{
    EntityKind, Installation, Measurement, Quote, SalesOrder, LEAD_ID, INSTALLATION_ID,
    MEASUREMENT_ID, QUOTE_ID, SALES_ORDER_ID,
};

/// Secondary change made in a related document within the same step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cascade {
    /// Converted lead opened a draft quote
    QuoteOpened,
    /// Measurement request moved the quote to measuring
    QuoteMeasuring,
    /// Completed measurement moved the quote to revised
    QuoteRevised,
    /// Confirmed quote opened a draft sales order
    SalesOrderOpened,
    /// New installation moved the sales order to installing
    SalesOrderInstalling,
    /// Completed installation moved the sales order to reconciliation
    SalesOrderAwaitingReconciliation,
    /// Completed reconciliation closed the sales order
    SalesOrderClosed,
}

impl Cascade {
    /// Effect half of the combined cause-and-effect log message
    pub fn summary(self) -> String {
        match self {
            Cascade::QuoteOpened => format!("Quote {QUOTE_ID} opened (V1.0 draft)."),
            Cascade::QuoteMeasuring => "Quote synced to measuring.".to_string(),
            Cascade::QuoteRevised => "Quote synced to revised for rework.".to_string(),
            Cascade::SalesOrderOpened => format!("Sales order {SALES_ORDER_ID} opened (draft)."),
            Cascade::SalesOrderInstalling => "Sales order synced to installing.".to_string(),
            Cascade::SalesOrderAwaitingReconciliation => {
                "Sales order synced to awaiting reconciliation.".to_string()
            }
            Cascade::SalesOrderClosed => "Sales order closed.".to_string(),
        }
    }

    pub fn target(self) -> EntityKind {
        match self {
            Cascade::QuoteOpened | Cascade::QuoteMeasuring | Cascade::QuoteRevised => {
                EntityKind::Quote
            }
            Cascade::SalesOrderOpened
            | Cascade::SalesOrderInstalling
            | Cascade::SalesOrderAwaitingReconciliation
            | Cascade::SalesOrderClosed => EntityKind::SalesOrder,
        }
    }
}

impl fmt::Display for Cascade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Converting a lead opens the quote with a single draft version
pub(crate) fn open_quote(
    next: &mut Snapshot,
    intent: IntentKind,
    now: DateTime<Utc>,
) -> Result<Cascade, PipelineError> {
    ensure_absent(&next.quote, intent, EntityKind::Quote)?;
    let lead_id = next
        .lead
        .as_ref()
        .map(|lead| lead.id.clone())
        .unwrap_or_else(|| LEAD_ID.to_string());
    next.quote = Some(Quote::open(&lead_id, now));
    debug!(quote = QUOTE_ID, lead = %lead_id, "Quote opened from converted lead");
    Ok(Cascade::QuoteOpened)
}

/// Requesting a measurement creates it and moves the quote to measuring
pub(crate) fn start_measuring(
    next: &mut Snapshot,
    intent: IntentKind,
) -> Result<Cascade, PipelineError> {
    let quote = require(&mut next.quote, intent, EntityKind::Quote)?;
    let status = advance(
        quote.current_status,
        QuoteStep::StartMeasuring,
        intent,
        EntityKind::Quote,
    )?;
    ensure_absent(&next.measurement, intent, EntityKind::Measurement)?;

    quote.current_status = status;
    next.measurement = Some(Measurement::request(quote.current_version_id()));
    debug!(measurement = MEASUREMENT_ID, "Measurement requested, quote measuring");
    Ok(Cascade::QuoteMeasuring)
}

/// A completed measurement sends the quote back for rework
pub(crate) fn revise_quote(quote: &mut Option<Quote>) -> Option<Cascade> {
    let quote = quote.as_mut()?;
    let status = quote.current_status.next(QuoteStep::Revise)?;
    quote.current_status = status;
    debug!(quote = %quote.id, "Quote revised after measurement");
    Some(Cascade::QuoteRevised)
}

/// Confirming a revised quote opens the sales order for the confirmed version
pub(crate) fn open_sales_order(
    next: &mut Snapshot,
    intent: IntentKind,
) -> Result<Cascade, PipelineError> {
    let quote = require(&mut next.quote, intent, EntityKind::Quote)?;
    let status = advance(
        quote.current_status,
        QuoteStep::Confirm,
        intent,
        EntityKind::Quote,
    )?;
    ensure_absent(&next.sales_order, intent, EntityKind::SalesOrder)?;

    quote.current_status = status;
    quote.mark_current_version(status);
    let version = quote.current_version_id();
    debug!(sales_order = SALES_ORDER_ID, version = %version, "Sales order opened");
    next.sales_order = Some(SalesOrder::open(&quote.id, version));
    Ok(Cascade::SalesOrderOpened)
}

/// Scheduling the installation moves a shipping sales order to installing
pub(crate) fn schedule_installation(
    next: &mut Snapshot,
    intent: IntentKind,
) -> Result<Cascade, PipelineError> {
    let order = require(&mut next.sales_order, intent, EntityKind::SalesOrder)?;
    let status = advance(
        order.status,
        SalesStep::StartInstalling,
        intent,
        EntityKind::SalesOrder,
    )?;
    ensure_absent(&next.installation, intent, EntityKind::Installation)?;

    order.status = status;
    next.installation = Some(Installation::schedule(&order.id));
    debug!(installation = INSTALLATION_ID, "Installation scheduled, sales order installing");
    Ok(Cascade::SalesOrderInstalling)
}

/// A completed installation hands the sales order to finance
pub(crate) fn await_reconciliation(order: &mut Option<SalesOrder>) -> Option<Cascade> {
    let order = order.as_mut()?;
    let status = order.status.next(SalesStep::AwaitReconciliation)?;
    order.status = status;
    debug!(sales_order = %order.id, "Sales order awaiting reconciliation");
    Some(Cascade::SalesOrderAwaitingReconciliation)
}

/// A completed reconciliation closes the whole pipeline instance
pub(crate) fn close_sales_order(order: &mut Option<SalesOrder>) -> Option<Cascade> {
    let order = order.as_mut()?;
    let status = order.status.next(SalesStep::Close)?;
    order.status = status;
    debug!(sales_order = %order.id, "Sales order closed");
    Some(Cascade::SalesOrderClosed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{QuoteStatus, SalesOrderStatus};

    #[test]
    fn test_revise_quote_only_from_measuring() {
        let mut quote = Some(Quote::open(LEAD_ID, Utc::now()));
        assert_eq!(revise_quote(&mut quote), None);
        assert_eq!(quote.as_ref().map(|q| q.current_status), Some(QuoteStatus::Draft));

        if let Some(q) = quote.as_mut() {
            q.current_status = QuoteStatus::Measuring;
        }
        assert_eq!(revise_quote(&mut quote), Some(Cascade::QuoteRevised));
        assert_eq!(quote.map(|q| q.current_status), Some(QuoteStatus::Revised));
    }

    #[test]
    fn test_missing_targets_produce_no_cascade() {
        assert_eq!(revise_quote(&mut None), None);
        assert_eq!(await_reconciliation(&mut None), None);
        assert_eq!(close_sales_order(&mut None), None);
    }

    #[test]
    fn test_close_sales_order_requires_reconciliation_status() {
        let mut order = Some(SalesOrder::open(QUOTE_ID, "V1.1".to_string()));
        assert_eq!(close_sales_order(&mut order), None);

        if let Some(o) = order.as_mut() {
            o.status = SalesOrderStatus::Reconciliation;
        }
        assert_eq!(close_sales_order(&mut order), Some(Cascade::SalesOrderClosed));
        assert_eq!(order.map(|o| o.status), Some(SalesOrderStatus::Completed));
    }

    #[test]
    fn test_start_measuring_rejects_draft_quote_without_side_effects() {
        let mut next = Snapshot::empty();
        next.quote = Some(Quote::open(LEAD_ID, Utc::now()));

        let err = start_measuring(&mut next, IntentKind::RequestMeasurement).unwrap_err();
        assert!(matches!(err, PipelineError::IllegalTransition { status: "draft", .. }));
        assert!(next.measurement.is_none());
    }

    #[test]
    fn test_cascade_targets() {
        assert_eq!(Cascade::QuoteRevised.target(), EntityKind::Quote);
        assert_eq!(Cascade::SalesOrderClosed.target(), EntityKind::SalesOrder);
    }
}
