//! Normalization of raw FPDS entries into [`FlatRecord`]s
//!
//! FPDS returns two shapes: award records (task and delivery orders, keyed
//! under `content__award__`) and IDV records (keyed under `content__IDV__`).
//! [`RecordVariant::detect`] picks the shape once and a single field-path
//! table drives extraction for both. Extraction is total: a missing or
//! malformed field degrades to its default and never aborts the batch.

use crate::types::{FlatRecord, RawRecord};
use serde_json::Value;

/// Key whose presence marks an award-shaped record
pub const AWARD_PIID_KEY: &str = "content__award__awardID__awardContractID__PIID";

/// Which schema a raw record follows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordVariant {
    /// Task order, delivery order, or other award referencing an IDV
    Award,
    /// Indefinite-delivery vehicle record
    Idv,
}

impl RecordVariant {
    /// Detect the variant from the record's keys
    pub fn detect(record: &RawRecord) -> Self {
        if record.contains_key(AWARD_PIID_KEY) {
            RecordVariant::Award
        } else {
            RecordVariant::Idv
        }
    }

    /// Key prefix all content fields of this variant live under
    pub fn prefix(self) -> &'static str {
        match self {
            RecordVariant::Award => "content__award__",
            RecordVariant::Idv => "content__IDV__",
        }
    }
}

/// Source paths of one logical field, relative to the variant prefix
///
/// `None` means the variant does not carry the field and it stays at its
/// default.
struct FieldPath<T> {
    award: Option<&'static str>,
    idv: Option<&'static str>,
    slot: fn(&mut FlatRecord) -> &mut T,
}

impl<T> FieldPath<T> {
    fn path(&self, variant: RecordVariant) -> Option<&'static str> {
        match variant {
            RecordVariant::Award => self.award,
            RecordVariant::Idv => self.idv,
        }
    }
}

const fn both<T>(path: &'static str, slot: fn(&mut FlatRecord) -> &mut T) -> FieldPath<T> {
    FieldPath {
        award: Some(path),
        idv: Some(path),
        slot,
    }
}

const fn award_only<T>(path: &'static str, slot: fn(&mut FlatRecord) -> &mut T) -> FieldPath<T> {
    FieldPath {
        award: Some(path),
        idv: None,
        slot,
    }
}

const fn split<T>(
    award: &'static str,
    idv: &'static str,
    slot: fn(&mut FlatRecord) -> &mut T,
) -> FieldPath<T> {
    FieldPath {
        award: Some(award),
        idv: Some(idv),
        slot,
    }
}

const TEXT_FIELDS: &[FieldPath<String>] = &[
    split(
        "awardID__awardContractID__PIID",
        "contractID__IDVID__PIID",
        |r| &mut r.piid,
    ),
    award_only("awardID__referencedIDVID__PIID", |r| &mut r.ref_idv_piid),
    split(
        "awardID__awardContractID__modNumber",
        "contractID__IDVID__modNumber",
        |r| &mut r.mod_number,
    ),
    both("contractData__descriptionOfContractRequirement", |r| {
        &mut r.description
    }),
    both("contractData__contractActionType", |r| &mut r.action_type),
    both("contractData__contractActionType__description", |r| {
        &mut r.action_type_description
    }),
    both("relevantContractDates__signedDate", |r| &mut r.signed_date),
    both("relevantContractDates__effectiveDate", |r| {
        &mut r.effective_date
    }),
    award_only("relevantContractDates__currentCompletionDate", |r| {
        &mut r.completion_date
    }),
    split(
        "relevantContractDates__ultimateCompletionDate",
        "relevantContractDates__lastDateToOrder",
        |r| &mut r.ultimate_completion_date,
    ),
    both("productOrServiceInformation__principalNAICSCode", |r| {
        &mut r.naics_code
    }),
    both(
        "productOrServiceInformation__principalNAICSCode__description",
        |r| &mut r.naics_description,
    ),
    both("productOrServiceInformation__productOrServiceCode", |r| {
        &mut r.psc_code
    }),
    both(
        "productOrServiceInformation__productOrServiceCode__description",
        |r| &mut r.psc_description,
    ),
    both("vendor__vendorHeader__vendorName", |r| &mut r.vendor_name),
    both("vendor__vendorSiteDetails__entityIdentifiers__vendorUEIInformation__UEI", |r| &mut r.uei),
    both("vendor__vendorSiteDetails__entityIdentifiers__vendorUEIInformation__ultimateParentUEI", |r| {
        &mut r.parent_uei
    }),
    both("vendor__vendorSiteDetails__entityIdentifiers__vendorUEIInformation__ultimateParentUEIName", |r| {
        &mut r.parent_name
    }),
    both("vendor__vendorSiteDetails__entityIdentifiers__cageCode", |r| {
        &mut r.cage_code
    }),
    both("vendor__vendorSiteDetails__vendorLocation__city", |r| &mut r.vendor_city),
    both("vendor__vendorSiteDetails__vendorLocation__state", |r| {
        &mut r.vendor_state
    }),
    both("vendor__vendorSiteDetails__vendorLocation__ZIPCode", |r| &mut r.vendor_zip),
    both("vendor__vendorSiteDetails__vendorLocation__countryCode", |r| {
        &mut r.vendor_country
    }),
    both("purchaserInformation__contractingOfficeAgencyID__name", |r| {
        &mut r.contracting_agency
    }),
    both("purchaserInformation__contractingOfficeID__name", |r| {
        &mut r.contracting_office
    }),
    both("purchaserInformation__fundingRequestingAgencyID__name", |r| {
        &mut r.funding_agency
    }),
    both("purchaserInformation__fundingRequestingOfficeID__name", |r| {
        &mut r.funding_office
    }),
    award_only(
        "placeOfPerformance__principalPlaceOfPerformance__locationCode__city",
        |r| &mut r.pop_city,
    ),
    award_only(
        "placeOfPerformance__principalPlaceOfPerformance__stateCode",
        |r| &mut r.pop_state,
    ),
    award_only(
        "placeOfPerformance__principalPlaceOfPerformance__countryCode",
        |r| &mut r.pop_country,
    ),
    both("contractData__typeOfContractPricing__description", |r| {
        &mut r.contract_pricing
    }),
    both("competition__extentCompeted__description", |r| {
        &mut r.extent_competed
    }),
    award_only("competition__idvTypeOfSetAside__description", |r| {
        &mut r.set_aside
    }),
    award_only(
        "vendor__contractingOfficerBusinessSizeDetermination__description",
        |r| &mut r.business_size,
    ),
];

const DOLLAR_FIELDS: &[FieldPath<f64>] = &[
    both("dollarValues__obligatedAmount", |r| &mut r.obligated_amount),
    both("totalDollarValues__totalObligatedAmount", |r| {
        &mut r.total_obligated_amount
    }),
    both("dollarValues__baseAndAllOptionsValue", |r| {
        &mut r.base_and_all_options_value
    }),
];

/// Entry-level fields, read without the variant prefix
const ENTRY_FIELDS: &[(&str, fn(&mut FlatRecord) -> &mut String)] = &[
    ("contract_type", |r| &mut r.contract_type),
    ("title", |r| &mut r.title),
    ("modified", |r| &mut r.last_modified),
    ("link__href", |r| &mut r.fpds_link),
];

/// Look up a flattened key. Total: a missing key is `None`, never an error.
pub fn lookup<'a>(record: &'a RawRecord, path: &str) -> Option<&'a Value> {
    record.get(path)
}

/// Render a raw value as field text
///
/// Strings pass through; numbers and booleans use their JSON text. Null,
/// arrays and objects have no sensible flat form and become empty.
pub fn text_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null | Value::Array(_) | Value::Object(_)) | None => String::new(),
    }
}

/// Parse a dollar amount such as `"$1,234.56"`
///
/// Currency symbols and thousands separators are stripped. Anything that
/// does not yield a finite number (null, empty, `"N/A"`, `"NaN"`) is `0.0`.
pub fn parse_dollars(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && *c != '$').collect();
            cleaned.trim().parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Map one raw record of either variant to a [`FlatRecord`]
pub fn normalize_record(record: &RawRecord) -> FlatRecord {
    let variant = RecordVariant::detect(record);
    let prefix = variant.prefix();
    let mut flat = FlatRecord::default();

    for field in TEXT_FIELDS {
        if let Some(path) = field.path(variant) {
            let key = format!("{prefix}{path}");
            *(field.slot)(&mut flat) = text_value(lookup(record, &key));
        }
    }

    for field in DOLLAR_FIELDS {
        if let Some(path) = field.path(variant) {
            let key = format!("{prefix}{path}");
            *(field.slot)(&mut flat) = parse_dollars(lookup(record, &key));
        }
    }

    for (key, slot) in ENTRY_FIELDS {
        *slot(&mut flat) = text_value(lookup(record, key));
    }

    flat
}
