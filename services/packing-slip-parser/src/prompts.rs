//! Extraction prompts for Canadian packing slips.

use packslip_models::PageText;

const FIELD_SCHEMA: &str = r#"{
    "customerId": "10-digit customer number (NOT purchase order number)",
    "companyName": "Company name if present, otherwise same as attention",
    "attention": "Person's name (first and last name)",
    "address1": "Street address with apartment/unit/buzzer if present",
    "cityOrTown": "City name only (e.g., 'Red Deer', 'East St Paul', 'North York')",
    "stateProvinceCounty": "2-letter province code (e.g., 'ON', 'BC', 'AB')",
    "postalCode": "Canadian postal code in format A1A1A1 (no spaces)",
    "telephone": "10-digit phone number",
    "upsService": "UPS service type (usually 'UPS Express Saver')",
    "quantity": 1
}"#;

const SINGLE_PAGE_RULES: &str = r#"CRITICAL EXTRACTION RULES:
1. Customer ID: Look for the pattern "14-digit-number 10-digit-number dd/dd/yyyy" - extract ONLY the 10-digit middle number, NOT the purchase order number
   Example: "12345678901234 1214327946 01/15/2025" → customerId should be "1214327946"
2. Company vs Person: If text contains "Ltd", "Inc", "Corp", "Construction", "Company" - that's the company name. If NO company is found, use the person's name for companyName
3. Address: Include apartment numbers, unit numbers, buzzer codes in address1
4. City: Extract only the city name, not street parts (e.g., "HENDERSON HWY EAST ST PAUL" → city is "EAST ST PAUL")
5. Phone: 10-digit Canadian format, may have dashes or spaces
6. Postal Code: Canadian format like "A1A 1A1" - remove spaces for output
7. Quantity: Look for "X GINGER DEFENCE" where X is the quantity number
8. If any field cannot be found, use "Not found""#;

const BATCH_RULES: &str = r#"CRITICAL EXTRACTION RULES:
1. Customer ID: Look for "14-digit-number 10-digit-number dd/dd/yyyy" - extract ONLY the 10-digit middle number
2. Company: If no business name found, use person's name
3. Address: Include apt/unit/buzzer in address1
4. Quantity: Look for "X GINGER DEFENCE" where X is the quantity
5. If any field cannot be found, use "Not found""#;

/// Prompt for a single packing slip, answered with one JSON object.
pub fn single_page_prompt(text: &str) -> String {
    format!(
        "You are an expert data extraction system for Canadian packing slips. \
Extract the following information from this packing slip text with 100% accuracy:\n\n\
PACKING SLIP TEXT:\n{text}\n\n\
Extract these exact fields and return ONLY a valid JSON object:\n\n\
{FIELD_SCHEMA}\n\n\
{SINGLE_PAGE_RULES}\n\n\
Return ONLY the JSON object, no other text.\n"
    )
}

/// Prompt for several packing slips, answered with a JSON array in page order.
pub fn batch_prompt(pages: &[PageText]) -> String {
    let mut prompt = format!(
        "You are an expert data extraction system for Canadian packing slips. \
Process ALL packing slips below and return a JSON array with one object per packing slip.\n\n\
For each packing slip, extract these fields:\n{FIELD_SCHEMA}\n\n\
{BATCH_RULES}\n\n\
Return ONLY a JSON array: [{{\"customerId\": \"...\", ...}}, {{\"customerId\": \"...\", ...}}]\n\n\
PACKING SLIPS TO PROCESS:\n"
    );

    for (position, page) in pages.iter().enumerate() {
        prompt.push_str(&format!(
            "\n--- PACKING SLIP {} (Page {}) ---\n{}\n",
            position + 1,
            page.page_number(),
            page.text
        ));
    }

    prompt.push_str("\nReturn ONLY the JSON array with one object per packing slip:");
    prompt
}
