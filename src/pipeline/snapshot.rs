use serde::{Deserialize, Serialize};

use super::audit::AuditLog;
use super::types::{Installation, Lead, Measurement, Quote, Reconciliation, SalesOrder};

/// Full aggregate state of one pipeline run plus its audit log.
///
/// At most one instance of each document exists; a later-stage document only
/// exists once its predecessor reached the status that spawns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub lead: Option<Lead>,
    pub quote: Option<Quote>,
    pub measurement: Option<Measurement>,
    pub sales_order: Option<SalesOrder>,
    pub installation: Option<Installation>,
    pub reconciliation: Option<Reconciliation>,
    pub log: AuditLog,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no document has been created yet
    pub fn is_blank(&self) -> bool {
        self.lead.is_none()
            && self.quote.is_none()
            && self.measurement.is_none()
            && self.sales_order.is_none()
            && self.installation.is_none()
            && self.reconciliation.is_none()
    }

    /// Same documents, ignoring the log
    pub fn same_documents(&self, other: &Snapshot) -> bool {
        self.lead == other.lead
            && self.quote == other.quote
            && self.measurement == other.measurement
            && self.sales_order == other.sales_order
            && self.installation == other.installation
            && self.reconciliation == other.reconciliation
    }
}
