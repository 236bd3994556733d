// Stage map - the per-stage node state and per-edge flow flags rendered as the pipeline diagram

use serde::{Deserialize, Serialize};
use std::fmt;

use super::snapshot::Snapshot;
use super::types::{
    LeadStatus, QuoteStatus, ReconciliationStatus, SalesOrderStatus, ServiceOrderStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Lead,
    Quote,
    Measurement,
    SalesOrder,
    Installation,
    Reconciliation,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Lead,
        Stage::Quote,
        Stage::Measurement,
        Stage::SalesOrder,
        Stage::Installation,
        Stage::Reconciliation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Stage::Lead => "Lead",
            Stage::Quote => "Quote",
            Stage::Measurement => "Measurement",
            Stage::SalesOrder => "Sales order",
            Stage::Installation => "Installation",
            Stage::Reconciliation => "Reconciliation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    /// Document does not exist yet
    Inactive,
    Active,
    Completed,
    /// Document ended in its failure terminal
    Error,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeState::Inactive => "inactive",
            NodeState::Active => "active",
            NodeState::Completed => "completed",
            NodeState::Error => "error",
        };
        f.write_str(label)
    }
}

/// Diagram edges. An edge is lit while work is flowing along it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    LeadToQuote,
    QuoteToMeasurement,
    MeasurementToQuote,
    QuoteToSalesOrder,
    SalesOrderToInstallation,
    InstallationToSalesOrder,
    SalesOrderToFinance,
}

impl Flow {
    pub const ALL: [Flow; 7] = [
        Flow::LeadToQuote,
        Flow::QuoteToMeasurement,
        Flow::MeasurementToQuote,
        Flow::QuoteToSalesOrder,
        Flow::SalesOrderToInstallation,
        Flow::InstallationToSalesOrder,
        Flow::SalesOrderToFinance,
    ];

    pub fn endpoints(self) -> (Stage, Stage) {
        match self {
            Flow::LeadToQuote => (Stage::Lead, Stage::Quote),
            Flow::QuoteToMeasurement => (Stage::Quote, Stage::Measurement),
            Flow::MeasurementToQuote => (Stage::Measurement, Stage::Quote),
            Flow::QuoteToSalesOrder => (Stage::Quote, Stage::SalesOrder),
            Flow::SalesOrderToInstallation => (Stage::SalesOrder, Stage::Installation),
            Flow::InstallationToSalesOrder => (Stage::Installation, Stage::SalesOrder),
            Flow::SalesOrderToFinance => (Stage::SalesOrder, Stage::Reconciliation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMap {
    pub nodes: Vec<(Stage, NodeState)>,
    pub flows: Vec<(Flow, bool)>,
}

impl StageMap {
    pub fn node(&self, stage: Stage) -> NodeState {
        self.nodes
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, state)| *state)
            .unwrap_or(NodeState::Inactive)
    }

    pub fn is_flowing(&self, flow: Flow) -> bool {
        self.flows.iter().any(|(f, lit)| *f == flow && *lit)
    }
}

pub fn stage_map(snapshot: &Snapshot) -> StageMap {
    let nodes = Stage::ALL
        .into_iter()
        .map(|stage| (stage, node_state(snapshot, stage)))
        .collect();
    let flows = Flow::ALL
        .into_iter()
        .map(|flow| (flow, is_flowing(snapshot, flow)))
        .collect();
    StageMap { nodes, flows }
}

fn node_state(snapshot: &Snapshot, stage: Stage) -> NodeState {
    match stage {
        Stage::Lead => classify(
            snapshot.lead.as_ref().map(|l| l.status),
            LeadStatus::Converted,
            LeadStatus::Invalid,
        ),
        Stage::Quote => classify(
            snapshot.quote.as_ref().map(|q| q.current_status),
            QuoteStatus::Confirmed,
            QuoteStatus::Cancelled,
        ),
        Stage::Measurement => classify(
            snapshot.measurement.as_ref().map(|m| m.status),
            ServiceOrderStatus::Completed,
            ServiceOrderStatus::Cancelled,
        ),
        Stage::SalesOrder => classify(
            snapshot.sales_order.as_ref().map(|o| o.status),
            SalesOrderStatus::Completed,
            SalesOrderStatus::Cancelled,
        ),
        Stage::Installation => classify(
            snapshot.installation.as_ref().map(|i| i.status),
            ServiceOrderStatus::Completed,
            ServiceOrderStatus::Cancelled,
        ),
        Stage::Reconciliation => classify(
            snapshot.reconciliation.as_ref().map(|r| r.status),
            ReconciliationStatus::Completed,
            ReconciliationStatus::Cancelled,
        ),
    }
}

fn classify<S: PartialEq>(status: Option<S>, done: S, failed: S) -> NodeState {
    match status {
        None => NodeState::Inactive,
        Some(s) if s == done => NodeState::Completed,
        Some(s) if s == failed => NodeState::Error,
        Some(_) => NodeState::Active,
    }
}

fn is_flowing(snapshot: &Snapshot, flow: Flow) -> bool {
    let quote = snapshot.quote.as_ref().map(|q| q.current_status);
    let order = snapshot.sales_order.as_ref().map(|o| o.status);
    match flow {
        Flow::LeadToQuote => snapshot
            .lead
            .as_ref()
            .is_some_and(|l| l.status == LeadStatus::Converted),
        Flow::QuoteToMeasurement => matches!(
            quote,
            Some(QuoteStatus::Preliminary | QuoteStatus::Measuring)
        ),
        Flow::MeasurementToQuote => snapshot
            .measurement
            .as_ref()
            .is_some_and(|m| m.status == ServiceOrderStatus::Completed),
        Flow::QuoteToSalesOrder => quote == Some(QuoteStatus::Confirmed),
        Flow::SalesOrderToInstallation => matches!(
            order,
            Some(SalesOrderStatus::Shipping | SalesOrderStatus::Installing)
        ),
        Flow::InstallationToSalesOrder => snapshot
            .installation
            .as_ref()
            .is_some_and(|i| i.status == ServiceOrderStatus::Completed),
        Flow::SalesOrderToFinance => matches!(
            order,
            Some(SalesOrderStatus::Reconciliation | SalesOrderStatus::Completed)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::Lead;

    #[test]
    fn test_empty_snapshot_is_all_inactive() {
        let map = stage_map(&Snapshot::empty());
        assert!(map.nodes.iter().all(|(_, s)| *s == NodeState::Inactive));
        assert!(map.flows.iter().all(|(_, lit)| !lit));
        assert_eq!(map.nodes.len(), 6);
        assert_eq!(map.flows.len(), 7);
    }

    #[test]
    fn test_invalid_lead_is_error_node() {
        let mut snapshot = Snapshot::empty();
        let mut lead = Lead::new("Li Si");
        lead.status = LeadStatus::Invalid;
        snapshot.lead = Some(lead);

        let map = stage_map(&snapshot);
        assert_eq!(map.node(Stage::Lead), NodeState::Error);
        assert!(!map.is_flowing(Flow::LeadToQuote));
    }

    #[test]
    fn test_converted_lead_lights_first_edge() {
        let mut snapshot = Snapshot::empty();
        let mut lead = Lead::new("Li Si");
        lead.status = LeadStatus::Converted;
        snapshot.lead = Some(lead);

        let map = stage_map(&snapshot);
        assert_eq!(map.node(Stage::Lead), NodeState::Completed);
        assert!(map.is_flowing(Flow::LeadToQuote));
        assert_eq!(map.node(Stage::Quote), NodeState::Inactive);
    }

    #[test]
    fn test_flow_endpoints_link_adjacent_stages() {
        assert_eq!(Flow::SalesOrderToFinance.endpoints(), (Stage::SalesOrder, Stage::Reconciliation));
        assert_eq!(Flow::MeasurementToQuote.endpoints().1, Stage::Quote);
    }
}
