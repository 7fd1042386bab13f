//! # Packslip Domain Models
//!
//! Types shared by the packing slip parser service.
//!
//! ## Key Models
//!
//! - **PageText**: the text of one PDF page and its position in the document
//! - **ExtractionRecord**: one packing slip as returned by the model, normalized so
//!   every field is present
//! - **ShipmentRecord**: an extraction record extended with the derived shipping
//!   fields, laid out in CSV column order
//!
//! ## Normalization
//!
//! Model output is untrusted. [`ExtractionRecord::normalize`] guarantees:
//! - every required key is present, unresolved values are `"Not found"`
//! - `quantity` is an integer, defaulting to 1
//! - `companyName` falls back to the attention line when unresolved

pub mod page;
pub mod record;
pub mod shipment;


pub use page::*;
pub use record::*;
pub use shipment::*;
