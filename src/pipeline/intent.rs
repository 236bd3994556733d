use serde::{Deserialize, Serialize};
use std::fmt;

use super::machines::{InstallationAction, ReconciliationStep, SalesAction, ServiceStep};

/// Tag a lead gets when the presentation offers the one-click "quoted" marker
pub const DEFAULT_TAG: &str = "quoted";

/// A caller-submitted request to change pipeline state
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Intent {
    CreateLead,
    AssignLead,
    StartFollowing,
    TagLead { tag: String },
    ConvertLead,
    CloseLead,
    PublishQuote,
    RequestMeasurement,
    MeasurementAction { action: ServiceStep },
    NewQuoteVersion,
    ConfirmQuote,
    SalesAction { action: SalesAction },
    CreateInstallation,
    InstallationAction { action: InstallationAction },
    CreateReconciliation,
    ReconciliationAction { action: ReconciliationStep },
    Reset,
}

/// Payload-free discriminant of [`Intent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentKind {
    CreateLead,
    AssignLead,
    StartFollowing,
    TagLead,
    ConvertLead,
    CloseLead,
    PublishQuote,
    RequestMeasurement,
    MeasurementAction,
    NewQuoteVersion,
    ConfirmQuote,
    SalesAction,
    CreateInstallation,
    InstallationAction,
    CreateReconciliation,
    ReconciliationAction,
    Reset,
}

impl IntentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IntentKind::CreateLead => "create-lead",
            IntentKind::AssignLead => "assign-lead",
            IntentKind::StartFollowing => "start-following",
            IntentKind::TagLead => "tag-lead",
            IntentKind::ConvertLead => "convert-lead",
            IntentKind::CloseLead => "close-lead",
            IntentKind::PublishQuote => "publish-quote",
            IntentKind::RequestMeasurement => "request-measurement",
            IntentKind::MeasurementAction => "measurement-action",
            IntentKind::NewQuoteVersion => "new-quote-version",
            IntentKind::ConfirmQuote => "confirm-quote",
            IntentKind::SalesAction => "sales-action",
            IntentKind::CreateInstallation => "create-installation",
            IntentKind::InstallationAction => "installation-action",
            IntentKind::CreateReconciliation => "create-reconciliation",
            IntentKind::ReconciliationAction => "reconciliation-action",
            IntentKind::Reset => "reset",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Intent {
    pub fn tag(tag: impl Into<String>) -> Self {
        Intent::TagLead { tag: tag.into() }
    }

    pub fn measurement(action: ServiceStep) -> Self {
        Intent::MeasurementAction { action }
    }

    pub fn sales(action: SalesAction) -> Self {
        Intent::SalesAction { action }
    }

    pub fn installation(action: InstallationAction) -> Self {
        Intent::InstallationAction { action }
    }

    pub fn reconciliation(action: ReconciliationStep) -> Self {
        Intent::ReconciliationAction { action }
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::CreateLead => IntentKind::CreateLead,
            Intent::AssignLead => IntentKind::AssignLead,
            Intent::StartFollowing => IntentKind::StartFollowing,
            Intent::TagLead { .. } => IntentKind::TagLead,
            Intent::ConvertLead => IntentKind::ConvertLead,
            Intent::CloseLead => IntentKind::CloseLead,
            Intent::PublishQuote => IntentKind::PublishQuote,
            Intent::RequestMeasurement => IntentKind::RequestMeasurement,
            Intent::MeasurementAction { .. } => IntentKind::MeasurementAction,
            Intent::NewQuoteVersion => IntentKind::NewQuoteVersion,
            Intent::ConfirmQuote => IntentKind::ConfirmQuote,
            Intent::SalesAction { .. } => IntentKind::SalesAction,
            Intent::CreateInstallation => IntentKind::CreateInstallation,
            Intent::InstallationAction { .. } => IntentKind::InstallationAction,
            Intent::CreateReconciliation => IntentKind::CreateReconciliation,
            Intent::ReconciliationAction { .. } => IntentKind::ReconciliationAction,
            Intent::Reset => IntentKind::Reset,
        }
    }

    /// Every intent the presentation can offer, with default payloads, in display order
    pub fn catalog() -> Vec<Intent> {
        let mut intents = vec![
            Intent::CreateLead,
            Intent::AssignLead,
            Intent::StartFollowing,
            Intent::tag(DEFAULT_TAG),
            Intent::ConvertLead,
            Intent::CloseLead,
            Intent::PublishQuote,
            Intent::RequestMeasurement,
            Intent::NewQuoteVersion,
            Intent::ConfirmQuote,
        ];
        intents.extend(ServiceStep::ALL.into_iter().map(Intent::measurement));
        intents.extend(SalesAction::ALL.into_iter().map(Intent::sales));
        intents.push(Intent::CreateInstallation);
        intents.extend(InstallationAction::ALL.into_iter().map(Intent::installation));
        intents.push(Intent::CreateReconciliation);
        intents.extend(ReconciliationStep::ALL.into_iter().map(Intent::reconciliation));
        intents.push(Intent::Reset);
        intents
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::TagLead { tag } => write!(f, "{} \"{}\"", self.kind(), tag),
            Intent::MeasurementAction { action } => write!(f, "{} {:?}", self.kind(), action),
            Intent::SalesAction { action } => write!(f, "{} {:?}", self.kind(), action),
            Intent::InstallationAction { action } => write!(f, "{} {:?}", self.kind(), action),
            Intent::ReconciliationAction { action } => write!(f, "{} {:?}", self.kind(), action),
            other => f.write_str(other.kind().as_str()),
        }
    }
}
