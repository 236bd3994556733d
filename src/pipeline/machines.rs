// Entity status machines - the single source of truth for which step is legal from which status
//
// Every table is a pure `(status, step) -> Option<status>` lookup. `None` means the step
// does not apply; terminal statuses map every step to `None`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::{
    LeadStatus, QuoteStatus, ReconciliationStatus, SalesOrderStatus, ServiceOrderStatus,
};

/// Common shape of the per-entity transition tables
pub trait StatusMachine: Copy + Eq + fmt::Debug + fmt::Display {
    type Step: Copy + fmt::Debug;

    /// Status reached by applying `step`, or `None` when the step is illegal here
    fn next(self, step: Self::Step) -> Option<Self>;

    fn is_terminal(self) -> bool;

    fn label(self) -> &'static str;

    fn can(self, step: Self::Step) -> bool {
        self.next(step).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeadStep {
    Assign,
    StartFollowing,
    Convert,
    Close,
}

impl StatusMachine for LeadStatus {
    type Step = LeadStep;

    fn next(self, step: LeadStep) -> Option<Self> {
        match (self, step) {
            (LeadStatus::New, LeadStep::Assign) => Some(LeadStatus::Assigned),
            (LeadStatus::Assigned, LeadStep::StartFollowing) => Some(LeadStatus::Following),
            (LeadStatus::Following, LeadStep::Convert) => Some(LeadStatus::Converted),
            (LeadStatus::Following, LeadStep::Close) => Some(LeadStatus::Invalid),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, LeadStatus::Converted | LeadStatus::Invalid)
    }

    fn label(self) -> &'static str {
        self.as_str()
    }
}

impl LeadStatus {
    /// Tagging never changes status and is only open while following up
    pub fn accepts_tags(self) -> bool {
        self == LeadStatus::Following
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteStep {
    Publish,
    StartMeasuring,
    /// Measurement data came back; the quote needs rework
    Revise,
    /// New version while revised; status stays revised
    AddVersion,
    Confirm,
}

impl StatusMachine for QuoteStatus {
    type Step = QuoteStep;

    fn next(self, step: QuoteStep) -> Option<Self> {
        match (self, step) {
            (QuoteStatus::Draft, QuoteStep::Publish) => Some(QuoteStatus::Preliminary),
            (QuoteStatus::Preliminary, QuoteStep::StartMeasuring) => Some(QuoteStatus::Measuring),
            (QuoteStatus::Measuring, QuoteStep::Revise) => Some(QuoteStatus::Revised),
            (QuoteStatus::Revised, QuoteStep::AddVersion) => Some(QuoteStatus::Revised),
            (QuoteStatus::Revised, QuoteStep::Confirm) => Some(QuoteStatus::Confirmed),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, QuoteStatus::Confirmed | QuoteStatus::Cancelled)
    }

    fn label(self) -> &'static str {
        self.as_str()
    }
}

/// Steps of the shared service-order machine; also the measurement intent payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStep {
    Assign,
    Accept,
    CompleteSite,
    /// Rework loop from confirming back to assigning
    Reject,
    Confirm,
}

impl ServiceStep {
    pub const ALL: [ServiceStep; 5] = [
        ServiceStep::Assign,
        ServiceStep::Accept,
        ServiceStep::CompleteSite,
        ServiceStep::Reject,
        ServiceStep::Confirm,
    ];
}

impl StatusMachine for ServiceOrderStatus {
    type Step = ServiceStep;

    fn next(self, step: ServiceStep) -> Option<Self> {
        match (self, step) {
            (ServiceOrderStatus::Pending, ServiceStep::Assign) => Some(ServiceOrderStatus::Assigning),
            (ServiceOrderStatus::Assigning, ServiceStep::Accept) => Some(ServiceOrderStatus::Waiting),
            (ServiceOrderStatus::Waiting, ServiceStep::CompleteSite) => {
                Some(ServiceOrderStatus::Confirming)
            }
            (ServiceOrderStatus::Confirming, ServiceStep::Reject) => {
                Some(ServiceOrderStatus::Assigning)
            }
            (ServiceOrderStatus::Confirming, ServiceStep::Confirm) => {
                Some(ServiceOrderStatus::Completed)
            }
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(
            self,
            ServiceOrderStatus::Completed | ServiceOrderStatus::Cancelled
        )
    }

    fn label(self) -> &'static str {
        self.as_str()
    }
}

/// Installation intent payload. There is no reject path for installations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstallationAction {
    Assign,
    Accept,
    CompleteSite,
    /// Logged only, never changes status
    UploadPhotos,
    Confirm,
}

impl InstallationAction {
    pub const ALL: [InstallationAction; 5] = [
        InstallationAction::Assign,
        InstallationAction::Accept,
        InstallationAction::CompleteSite,
        InstallationAction::UploadPhotos,
        InstallationAction::Confirm,
    ];

    /// Status step this action drives, `None` for side-effect-only actions
    pub fn step(self) -> Option<ServiceStep> {
        match self {
            InstallationAction::Assign => Some(ServiceStep::Assign),
            InstallationAction::Accept => Some(ServiceStep::Accept),
            InstallationAction::CompleteSite => Some(ServiceStep::CompleteSite),
            InstallationAction::UploadPhotos => None,
            InstallationAction::Confirm => Some(ServiceStep::Confirm),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SalesStep {
    Confirm,
    Procure,
    Ship,
    /// Only through creating an installation
    StartInstalling,
    /// Only as a cascade from a completed installation
    AwaitReconciliation,
    /// Only as a cascade from a completed reconciliation
    Close,
}

impl StatusMachine for SalesOrderStatus {
    type Step = SalesStep;

    fn next(self, step: SalesStep) -> Option<Self> {
        match (self, step) {
            (SalesOrderStatus::Draft, SalesStep::Confirm) => Some(SalesOrderStatus::Confirmed),
            (SalesOrderStatus::Confirmed, SalesStep::Procure) => Some(SalesOrderStatus::Purchasing),
            (SalesOrderStatus::Purchasing, SalesStep::Ship) => Some(SalesOrderStatus::Shipping),
            (SalesOrderStatus::Shipping, SalesStep::StartInstalling) => {
                Some(SalesOrderStatus::Installing)
            }
            (SalesOrderStatus::Installing, SalesStep::AwaitReconciliation) => {
                Some(SalesOrderStatus::Reconciliation)
            }
            (SalesOrderStatus::Reconciliation, SalesStep::Close) => {
                Some(SalesOrderStatus::Completed)
            }
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(
            self,
            SalesOrderStatus::Completed | SalesOrderStatus::Cancelled
        )
    }

    fn label(self) -> &'static str {
        self.as_str()
    }
}

/// The subset of sales steps a caller may request directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SalesAction {
    Confirm,
    Procure,
    Ship,
}

impl SalesAction {
    pub const ALL: [SalesAction; 3] = [SalesAction::Confirm, SalesAction::Procure, SalesAction::Ship];

    pub fn step(self) -> SalesStep {
        match self {
            SalesAction::Confirm => SalesStep::Confirm,
            SalesAction::Procure => SalesStep::Procure,
            SalesAction::Ship => SalesStep::Ship,
        }
    }
}

/// Reconciliation steps; also the reconciliation intent payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconciliationStep {
    Start,
    Discrepancy,
    Adjust,
    Complete,
}

impl ReconciliationStep {
    pub const ALL: [ReconciliationStep; 4] = [
        ReconciliationStep::Start,
        ReconciliationStep::Discrepancy,
        ReconciliationStep::Adjust,
        ReconciliationStep::Complete,
    ];
}

impl StatusMachine for ReconciliationStatus {
    type Step = ReconciliationStep;

    fn next(self, step: ReconciliationStep) -> Option<Self> {
        match (self, step) {
            (ReconciliationStatus::Pending, ReconciliationStep::Start)
            | (ReconciliationStatus::Adjusted, ReconciliationStep::Start) => {
                Some(ReconciliationStatus::Reconciling)
            }
            (ReconciliationStatus::Reconciling, ReconciliationStep::Discrepancy) => {
                Some(ReconciliationStatus::Discrepancy)
            }
            (ReconciliationStatus::Discrepancy, ReconciliationStep::Adjust) => {
                Some(ReconciliationStatus::Adjusted)
            }
            (ReconciliationStatus::Reconciling, ReconciliationStep::Complete) => {
                Some(ReconciliationStatus::Completed)
            }
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(
            self,
            ReconciliationStatus::Completed | ReconciliationStatus::Cancelled
        )
    }

    fn label(self) -> &'static str {
        self.as_str()
    }
}
