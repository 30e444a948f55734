//! Internal invoice request model (service inbound contract, camelCase JSON).

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fiscal document type, keyed by the authority's numeric code.
///
/// This is a closed enum: an unrecognized code fails deserialization at the
/// service boundary instead of silently skipping conditional validation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum DocumentType {
    StandardInvoice,
    PointOfSale,
    DebitNote,
    CreditNote,
}

impl DocumentType {
    pub fn code(self) -> u16 {
        match self {
            DocumentType::StandardInvoice => 7,
            DocumentType::PointOfSale => 20,
            DocumentType::DebitNote => 93,
            DocumentType::CreditNote => 94,
        }
    }

    /// Debit and credit notes share the discrepancy/billing-reference rules.
    pub fn is_note(self) -> bool {
        matches!(self, DocumentType::DebitNote | DocumentType::CreditNote)
    }
}

impl TryFrom<u16> for DocumentType {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            7 => Ok(DocumentType::StandardInvoice),
            20 => Ok(DocumentType::PointOfSale),
            93 => Ok(DocumentType::DebitNote),
            94 => Ok(DocumentType::CreditNote),
            other => Err(format!(
                "unknown typeDocumentId {other}; expected 7 (standard invoice), 20 (point of sale), 93 (debit note) or 94 (credit note)"
            )),
        }
    }
}

impl From<DocumentType> for u16 {
    fn from(value: DocumentType) -> Self {
        value.code()
    }
}

/// Customer block. A single shape covers both profiles: point-of-sale
/// documents only need `company_name` + `tax_id`, standard invoices require
/// the full fiscal profile (enforced by the validator, not the parser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub company_name: String,
    pub tax_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country_id: Option<String>,
    #[serde(default)]
    pub city_id: Option<String>,
    #[serde(default)]
    pub identity_document_type_id: Option<String>,
    #[serde(default)]
    pub organization_type_id: Option<i32>,
    #[serde(default)]
    pub tax_regime_id: Option<i32>,
    #[serde(default)]
    pub tax_level_id: Option<i32>,
}

impl Customer {
    /// True when the six full-profile fields required for standard invoices
    /// are all present (string ids additionally non-blank).
    pub fn has_full_profile(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.country_id)
            && present(&self.city_id)
            && present(&self.identity_document_type_id)
            && self.organization_type_id.is_some()
            && self.tax_regime_id.is_some()
            && self.tax_level_id.is_some()
    }
}

/// A discount (`is_charge = false`) or surcharge (`is_charge = true`)
/// applied against a line's base amount before tax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceCharge {
    pub amount: Decimal,
    pub base_amount: Decimal,
    pub is_charge: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    #[serde(default)]
    pub code: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Explicit 0 means "no tax" and is distinct from absent (defaults to 19).
    #[serde(default)]
    pub tax_percent: Option<Decimal>,
    #[serde(default)]
    pub quantity_units_id: Option<String>,
    #[serde(default)]
    pub type_item_identifications_id: Option<String>,
    #[serde(default)]
    pub reference_price_id: Option<String>,
    #[serde(default)]
    pub allowance_charges: Vec<AllowanceCharge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_method_id: i32,
    pub means_payment_id: i32,
    pub value_paid: Decimal,
}

/// Cashier/seller signature block (point-of-sale documents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSignature {
    #[serde(default)]
    pub cashier: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
}

/// Terminal/cashier metadata required for point-of-sale documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfSaleInfo {
    pub cashier_name: String,
    pub terminal_number: String,
    pub cashier_type: String,
    pub sales_code: String,
    pub address: String,
    pub sub_total: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareManufacturerInfo {
    pub owner_name: String,
    pub company_name: String,
    pub software_name: String,
}

/// Links a debit/credit note to the discrepancy being answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscrepancyResponse {
    pub reference_id: String,
    pub response_id: String,
}

/// Reference to the prior invoice a note adjusts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingReference {
    pub number: String,
    pub date: String,
    pub uuid: String,
    #[serde(default)]
    pub scheme_name: Option<String>,
}

/// Inbound issuance request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    /// Idempotency key: maps to at most one issued invoice.
    pub order_code: String,
    pub resolution_number: String,
    pub prefix: String,
    pub document_number: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Defaults to today at transform time; the authority requires the
    /// generation date to match the signature date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub graphic_representation: Option<i32>,
    #[serde(default)]
    pub send_email: Option<i32>,
    pub operation_type_id: i32,
    #[serde(rename = "typeDocumentId")]
    pub document_type: DocumentType,
    #[serde(default)]
    pub customer: Option<Customer>,
    pub items: Vec<LineItem>,
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub document_signature: Option<DocumentSignature>,
    #[serde(default)]
    pub point_of_sale: Option<PointOfSaleInfo>,
    #[serde(default)]
    pub software_manufacturer: Option<SoftwareManufacturerInfo>,
    #[serde(default)]
    pub discrepancy_response: Option<DiscrepancyResponse>,
    #[serde(default)]
    pub billing_reference: Option<BillingReference>,
}
