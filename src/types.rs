//! Core types for fpds-task-orders

use serde::{Deserialize, Serialize};

/// One raw feed entry, keyed by flattened `__`-joined element paths
///
/// Example keys: `title`, `link__href`,
/// `content__award__dollarValues__obligatedAmount`.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A contractor holding one contract vehicle, as listed in the input file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contractor {
    /// Contractor name
    pub name: String,

    /// IDV PIID without dashes (e.g. "N0002325D0001")
    pub award_number: String,

    /// Same PIID in dashed form (e.g. "N00023-25-D-0001"), if known
    #[serde(default)]
    pub award_number_dashes: String,

    /// Unique Entity Identifier
    #[serde(default)]
    pub uei: String,

    /// Free-text location
    #[serde(default)]
    pub location: String,
}

/// A task order or award record flattened out of the verbose feed schema
///
/// Every field is always present. Missing source values become empty
/// strings and unparseable dollar values become `0.0`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct FlatRecord {
    pub piid: String,
    pub ref_idv_piid: String,
    pub mod_number: String,
    pub contract_type: String,
    pub title: String,
    pub obligated_amount: f64,
    pub total_obligated_amount: f64,
    pub base_and_all_options_value: f64,
    pub description: String,
    pub action_type: String,
    pub action_type_description: String,
    pub signed_date: String,
    pub effective_date: String,
    pub completion_date: String,
    pub ultimate_completion_date: String,
    pub naics_code: String,
    pub naics_description: String,
    pub psc_code: String,
    pub psc_description: String,
    pub vendor_name: String,
    pub uei: String,
    pub parent_uei: String,
    pub parent_name: String,
    pub cage_code: String,
    pub vendor_city: String,
    pub vendor_state: String,
    pub vendor_zip: String,
    pub vendor_country: String,
    pub contracting_agency: String,
    pub contracting_office: String,
    pub funding_agency: String,
    pub funding_office: String,
    pub pop_city: String,
    pub pop_state: String,
    pub pop_country: String,
    pub contract_pricing: String,
    pub extent_competed: String,
    pub set_aside: String,
    pub business_size: String,
    pub last_modified: String,
    pub fpds_link: String,
}

/// Everything collected for one contract vehicle in one run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdvResult {
    /// Contractor name from the input file
    pub contractor_name: String,

    /// IDV PIID the task orders were queried by
    pub idv_piid: String,

    /// Dashed PIID from the input file
    pub idv_piid_dashes: String,

    /// Contractor UEI from the input file
    pub contractor_uei: String,

    /// Contractor location from the input file
    pub contractor_location: String,

    /// Number of task orders found
    pub task_order_count: usize,

    /// Sum of `obligated_amount` over the task orders
    pub total_obligated: f64,

    /// Normalized task orders
    pub task_orders: Vec<FlatRecord>,

    /// Fetch error message, when the query failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IdvResult {
    /// Result for a successful fetch
    pub fn fetched(contractor: &Contractor, task_orders: Vec<FlatRecord>) -> Self {
        let total_obligated = task_orders.iter().map(|to| to.obligated_amount).sum();
        Self {
            task_order_count: task_orders.len(),
            total_obligated,
            task_orders,
            ..Self::identity(contractor)
        }
    }

    /// Placeholder for a failed fetch: zero counts, error recorded
    pub fn failed(contractor: &Contractor, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::identity(contractor)
        }
    }

    fn identity(contractor: &Contractor) -> Self {
        Self {
            contractor_name: contractor.name.clone(),
            idv_piid: contractor.award_number.clone(),
            idv_piid_dashes: contractor.award_number_dashes.clone(),
            contractor_uei: contractor.uei.clone(),
            contractor_location: contractor.location.clone(),
            ..Default::default()
        }
    }
}

/// One failed fetch in the current run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchErrorEntry {
    /// Contractor name
    pub name: String,
    /// IDV PIID that failed
    pub idv_piid: String,
    /// Error message
    pub error: String,
}

/// Metadata block of the consolidated output
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct RunMetadata {
    pub description: String,
    pub source: String,
    pub query_method: String,
    /// UTC timestamp, `%Y-%m-%dT%H:%M:%SZ`
    pub generated_at: String,
    pub idv_count: usize,
    pub idvs_with_task_orders: usize,
    pub total_task_orders: usize,
    pub total_obligated: f64,
}

/// The consolidated output document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct ConsolidatedOutput {
    pub metadata: RunMetadata,
    pub errors: Vec<FetchErrorEntry>,
    pub idvs: Vec<IdvResult>,
}
