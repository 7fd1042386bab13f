//! CSV export of shipment records.

use packslip_models::ShipmentRecord;

use crate::error::PackslipResult;

pub const CSV_FILENAME: &str = "packing_slip_data.csv";

/// Serialize shipments to CSV bytes, header first, one row per record.
///
/// Column order follows [`ShipmentRecord`]'s field order, which is
/// [`packslip_models::CSV_COLUMNS`].
pub fn shipments_to_csv(records: &[ShipmentRecord]) -> PackslipResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if records.is_empty() {
        writer.write_record(packslip_models::CSV_COLUMNS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| crate::PackslipError::internal(format!("CSV export failed: {}", e)))
}
