//! Field-lock predicate.
//!
//! The single place that decides whether a workflow field may be written.
//! Every caller (staff CLI, portal) goes through [`is_field_locked`].

use serde::Serialize;

use super::fields::{FieldGroup, WorkflowField};
use super::influencer::InfluencerStatus;
use super::workflow::PartnershipWorkflow;

/// Whether `field` is write-protected for `workflow` under `status`.
pub fn is_field_locked(
    field: WorkflowField,
    workflow: &PartnershipWorkflow,
    status: InfluencerStatus,
) -> bool {
    if workflow.is_terminal() || status == InfluencerStatus::Analyzing {
        return true;
    }

    match field.group() {
        // An accepted price is final.
        FieldGroup::Price => status.has_reached(InfluencerStatus::Agreed),
        FieldGroup::Contact => {
            if status.is_past(InfluencerStatus::Agreed) {
                true
            } else if status == InfluencerStatus::CounterProposal {
                // Blanks may still be filled mid-negotiation.
                field.is_populated(workflow)
            } else {
                false
            }
        }
        FieldGroup::Shipping => {
            if status.is_past(InfluencerStatus::Agreed) {
                true
            } else if status == InfluencerStatus::Agreed {
                workflow.shipping.is_submitted()
            } else {
                false
            }
        }
        FieldGroup::Other => false,
    }
}

/// Subset of `fields` that are locked, preserving order.
pub fn locked_fields(
    fields: &[WorkflowField],
    workflow: &PartnershipWorkflow,
    status: InfluencerStatus,
) -> Vec<WorkflowField> {
    fields
        .iter()
        .copied()
        .filter(|f| is_field_locked(*f, workflow, status))
        .collect()
}

/// Lock state of one field, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldLockState {
    pub field: WorkflowField,
    pub locked: bool,
}

/// Lock state for every field of the workflow.
pub fn lock_matrix(workflow: &PartnershipWorkflow, status: InfluencerStatus) -> Vec<FieldLockState> {
    WorkflowField::ALL
        .into_iter()
        .map(|field| FieldLockState {
            field,
            locked: is_field_locked(field, workflow, status),
        })
        .collect()
}
