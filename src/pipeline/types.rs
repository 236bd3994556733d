// Pipeline documents - immutable value records replaced wholesale on every reducer step

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifiers of the single demonstration pipeline instance
pub const LEAD_ID: &str = "LD-2024-001";
pub const QUOTE_ID: &str = "QT-888";
pub const MEASUREMENT_ID: &str = "MS-101";
pub const SALES_ORDER_ID: &str = "SO-9000";
pub const INSTALLATION_ID: &str = "INS-500";
pub const RECONCILIATION_ID: &str = "REC-2024-NOV";

/// Customer name used when no configuration overrides it
pub const DEFAULT_CUSTOMER_NAME: &str = "Zhang San (prospect)";

/// The six kinds of document that make up a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Lead,
    Quote,
    Measurement,
    SalesOrder,
    Installation,
    Reconciliation,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Lead => "lead",
            EntityKind::Quote => "quote",
            EntityKind::Measurement => "measurement",
            EntityKind::SalesOrder => "sales order",
            EntityKind::Installation => "installation",
            EntityKind::Reconciliation => "reconciliation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Assigned,
    Following,
    Converted,
    Invalid,
}

impl LeadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Assigned => "assigned",
            LeadStatus::Following => "following",
            LeadStatus::Converted => "converted",
            LeadStatus::Invalid => "invalid",
        }
    }
}

/// Pipeline stage of a quote as a whole; also carried informationally per version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Preliminary,
    Measuring,
    Revised,
    Confirmed,
    Cancelled,
}

impl QuoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Preliminary => "preliminary",
            QuoteStatus::Measuring => "measuring",
            QuoteStatus::Revised => "revised",
            QuoteStatus::Confirmed => "confirmed",
            QuoteStatus::Cancelled => "cancelled",
        }
    }
}

/// Shared by measurement and installation service orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOrderStatus {
    /// Waiting to be dispatched
    Pending,
    /// Dispatched, waiting for a worker to accept
    Assigning,
    /// Accepted, waiting for the site visit
    Waiting,
    /// Site work done, waiting for sign-off
    Confirming,
    Completed,
    Cancelled,
}

impl ServiceOrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceOrderStatus::Pending => "pending",
            ServiceOrderStatus::Assigning => "assigning",
            ServiceOrderStatus::Waiting => "waiting",
            ServiceOrderStatus::Confirming => "confirming",
            ServiceOrderStatus::Completed => "completed",
            ServiceOrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesOrderStatus {
    Draft,
    Confirmed,
    Purchasing,
    Shipping,
    Installing,
    /// Installed and waiting for financial reconciliation
    Reconciliation,
    Completed,
    Cancelled,
}

impl SalesOrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SalesOrderStatus::Draft => "draft",
            SalesOrderStatus::Confirmed => "confirmed",
            SalesOrderStatus::Purchasing => "purchasing",
            SalesOrderStatus::Shipping => "shipping",
            SalesOrderStatus::Installing => "installing",
            SalesOrderStatus::Reconciliation => "reconciliation",
            SalesOrderStatus::Completed => "completed",
            SalesOrderStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    Pending,
    Reconciling,
    Discrepancy,
    Adjusted,
    Completed,
    Cancelled,
}

impl ReconciliationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReconciliationStatus::Pending => "pending",
            ReconciliationStatus::Reconciling => "reconciling",
            ReconciliationStatus::Discrepancy => "discrepancy",
            ReconciliationStatus::Adjusted => "adjusted",
            ReconciliationStatus::Completed => "completed",
            ReconciliationStatus::Cancelled => "cancelled",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_str!(
    LeadStatus,
    QuoteStatus,
    ServiceOrderStatus,
    SalesOrderStatus,
    ReconciliationStatus,
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub customer_name: String,
    pub status: LeadStatus,
    /// Free-text tags in insertion order, duplicates allowed
    pub tags: Vec<String>,
    /// Reserved, always empty
    pub history: Vec<String>,
}

impl Lead {
    pub fn new(customer_name: impl Into<String>) -> Self {
        Self {
            id: LEAD_ID.to_string(),
            customer_name: customer_name.into(),
            status: LeadStatus::New,
            tags: Vec::new(),
            history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteVersion {
    pub version_id: String,
    pub status: QuoteStatus,
    pub created_at: DateTime<Utc>,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub lead_id: String,
    pub versions: Vec<QuoteVersion>,
    /// Authoritative status used by every downstream rule
    pub current_status: QuoteStatus,
}

impl Quote {
    /// Opens a quote for `lead_id` with a single draft `V1.0`
    pub fn open(lead_id: &str, created_at: DateTime<Utc>) -> Self {
        let mut quote = Self {
            id: QUOTE_ID.to_string(),
            lead_id: lead_id.to_string(),
            versions: Vec::new(),
            current_status: QuoteStatus::Draft,
        };
        quote.push_version(created_at);
        quote
    }

    pub fn current_version(&self) -> Option<&QuoteVersion> {
        self.versions.iter().find(|v| v.is_current)
    }

    /// Version id of the current version, or the first one if none is flagged
    pub fn current_version_id(&self) -> String {
        self.current_version()
            .or_else(|| self.versions.first())
            .map(|v| v.version_id.clone())
            .unwrap_or_else(|| version_label(0))
    }

    /// Appends a new draft version and makes it the only current one
    pub(crate) fn push_version(&mut self, created_at: DateTime<Utc>) -> String {
        let version_id = version_label(self.versions.len());
        for version in &mut self.versions {
            version.is_current = false;
        }
        self.versions.push(QuoteVersion {
            version_id: version_id.clone(),
            status: QuoteStatus::Draft,
            created_at,
            is_current: true,
        });
        version_id
    }

    pub(crate) fn mark_current_version(&mut self, status: QuoteStatus) {
        if let Some(version) = self.versions.iter_mut().find(|v| v.is_current) {
            version.status = status;
        }
    }
}

/// `V1.0`, `V1.1`, ... by position in the version list
fn version_label(index: usize) -> String {
    format!("V1.{index}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: String,
    /// Quote version that was current when the measurement was requested
    pub quote_version_id: String,
    pub status: ServiceOrderStatus,
}

impl Measurement {
    pub fn request(quote_version_id: String) -> Self {
        Self {
            id: MEASUREMENT_ID.to_string(),
            quote_version_id,
            status: ServiceOrderStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesOrder {
    pub id: String,
    pub quote_id: String,
    /// Version of the quote the customer signed
    pub quote_version: String,
    pub status: SalesOrderStatus,
    /// Append-only procurement references
    pub procurement_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistics_status: Option<String>,
}

impl SalesOrder {
    pub fn open(quote_id: &str, quote_version: String) -> Self {
        Self {
            id: SALES_ORDER_ID.to_string(),
            quote_id: quote_id.to_string(),
            quote_version,
            status: SalesOrderStatus::Draft,
            procurement_ids: Vec::new(),
            logistics_status: None,
        }
    }

    /// Next procurement reference, e.g. `PO-9000-01`
    pub(crate) fn next_procurement_id(&self) -> String {
        let number = self.id.trim_start_matches("SO-");
        format!("PO-{}-{:02}", number, self.procurement_ids.len() + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    pub id: String,
    pub sales_order_id: String,
    pub status: ServiceOrderStatus,
}

impl Installation {
    pub fn schedule(sales_order_id: &str) -> Self {
        Self {
            id: INSTALLATION_ID.to_string(),
            sales_order_id: sales_order_id.to_string(),
            status: ServiceOrderStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub id: String,
    pub sales_order_id: String,
    pub status: ReconciliationStatus,
}

impl Reconciliation {
    pub fn open(sales_order_id: &str) -> Self {
        Self {
            id: RECONCILIATION_ID.to_string(),
            sales_order_id: sales_order_id.to_string(),
            status: ReconciliationStatus::Pending,
        }
    }
}
