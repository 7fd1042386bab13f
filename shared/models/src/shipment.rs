use serde::{Deserialize, Serialize};

use crate::record::ExtractionRecord;

pub const PACKAGES_PER_UNIT: i64 = 2;
pub const PACKAGE_WEIGHT: &str = "4.5kg";
pub const PACKAGE_TYPE: &str = "24 Pack";
/// Two 4.5kg packages per ordered unit.
pub const KG_PER_UNIT: i64 = 9;
pub const SHIPPER_ACCOUNT: &str = "K100C4";
pub const BILL_TRANSPORTATION_TO: &str = "shipper";
pub const COUNTRY_TERRITORY: &str = "Canada";

/// Column order of the exported CSV. Matches the field order of [`ShipmentRecord`].
pub const CSV_COLUMNS: [&str; 16] = [
    "customerId",
    "companyName",
    "attention",
    "address1",
    "stateProvinceCounty",
    "countryTerritory",
    "postalCode",
    "cityOrTown",
    "telephone",
    "upsService",
    "packages",
    "packageWeight",
    "type",
    "totalWeight",
    "shipper",
    "billTransportationTo",
];

/// A shipment row ready for export.
///
/// Field declaration order is the CSV column order; serializers rely on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRecord {
    pub customer_id: String,
    pub company_name: String,
    pub attention: String,
    pub address1: String,
    pub state_province_county: String,
    pub country_territory: String,
    pub postal_code: String,
    pub city_or_town: String,
    pub telephone: String,
    pub ups_service: String,
    pub packages: i64,
    pub package_weight: String,
    #[serde(rename = "type")]
    pub package_type: String,
    pub total_weight: String,
    pub shipper: String,
    pub bill_transportation_to: String,
}

impl From<ExtractionRecord> for ShipmentRecord {
    fn from(record: ExtractionRecord) -> Self {
        let quantity = record.quantity;

        Self {
            customer_id: record.customer_id,
            company_name: record.company_name,
            attention: record.attention,
            address1: record.address1,
            state_province_county: record.state_province_county,
            country_territory: COUNTRY_TERRITORY.to_string(),
            postal_code: record.postal_code,
            city_or_town: record.city_or_town,
            telephone: record.telephone,
            ups_service: record.ups_service,
            packages: quantity.saturating_mul(PACKAGES_PER_UNIT),
            package_weight: PACKAGE_WEIGHT.to_string(),
            package_type: PACKAGE_TYPE.to_string(),
            total_weight: format!("{}kg", quantity.saturating_mul(KG_PER_UNIT)),
            shipper: SHIPPER_ACCOUNT.to_string(),
            bill_transportation_to: BILL_TRANSPORTATION_TO.to_string(),
        }
    }
}
