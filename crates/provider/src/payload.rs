//! Provider wire schema and the transformation into it.
//!
//! Field names and value formats follow the provider contract exactly:
//! snake_case keys, most amounts as fixed two-decimal strings, tax amounts
//! as JSON numbers. Document-type-specific sub-sections are a tagged union
//! so each type's shape is checked at construction time.

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use factura_core::IssuanceError;
use factura_invoicing::request::{Customer, DocumentType, InvoiceRequest, LineItem};
use factura_invoicing::totals::{InvoiceTotals, DEFAULT_TAX_PERCENT};

const DEFAULT_UNIT_CODE: &str = "1093";
const DEFAULT_ITEM_IDENTIFICATION_CODE: &str = "4";
const DEFAULT_REFERENCE_PRICE_CODE: &str = "1";
const DEFAULT_ITEM_CODE: &str = "PROD001";
const VAT_TAX_ID: &str = "1";
const DEFAULT_DISCOUNT_REASON: &str = "Promocion";
const DEFAULT_SURCHARGE_REASON: &str = "Cargo adicional";

/// Round to two decimals the way the provider expects.
fn rounded(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed two-decimal wire string, e.g. `"180.00"`.
fn money(value: Decimal) -> String {
    format!("{:.2}", rounded(value))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderInvoicePayload {
    pub resolution_number: String,
    pub prefix: String,
    pub notes: String,
    pub document_number: String,
    pub date: String,
    pub time: String,
    pub graphic_representation: i32,
    pub send_email: i32,
    pub operation_type_id: i32,
    pub type_document_id: u16,
    #[serde(flatten)]
    pub sections: DocumentSections,
    pub lines: Vec<PayloadLine>,
    pub legal_monetary_totals: LegalMonetaryTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_totals: Option<Vec<TaxTotal>>,
    pub payments: Vec<PayloadPayment>,
}

/// Sub-sections that exist only for specific document types.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentSections {
    Standard {
        customer: FullCustomer,
    },
    PointOfSale {
        #[serde(skip_serializing_if = "Option::is_none")]
        customer: Option<PosCustomer>,
        #[serde(skip_serializing_if = "Option::is_none")]
        document_signature: Option<SignatureSection>,
        point_of_sale: PointOfSaleSection,
        software_manufacturer: SoftwareManufacturerSection,
    },
    Note {
        #[serde(skip_serializing_if = "Option::is_none")]
        customer: Option<FullCustomer>,
        discrepancy_response: DiscrepancySection,
        billing_reference: BillingReferenceSection,
    },
}

/// Simplified customer shape for point-of-sale documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PosCustomer {
    pub company_name: String,
    pub dni: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Fixed loyalty-points value the provider expects for POS buyers.
    pub points: i32,
}

/// Full fiscal-profile customer shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullCustomer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_organization_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_regime_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_level_id: Option<i32>,
    pub company_name: String,
    pub dni: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointOfSaleSection {
    pub cashier_name: String,
    pub terminal_number: String,
    pub cashier_type: String,
    pub sales_code: String,
    pub address: String,
    pub sub_total: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoftwareManufacturerSection {
    pub owner_name: String,
    pub company_name: String,
    pub software_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscrepancySection {
    pub reference_id: String,
    pub response_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingReferenceSection {
    pub number: String,
    pub date: String,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadLine {
    pub invoiced_quantity: String,
    pub quantity_units_id: String,
    pub line_extension_amount: String,
    pub free_of_charge_indicator: bool,
    pub description: String,
    pub code: String,
    pub type_item_identifications_id: String,
    pub reference_price_id: String,
    pub price_amount: String,
    pub base_quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowance_charges: Option<Vec<PayloadAllowanceCharge>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_totals: Option<Vec<TaxTotal>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadAllowanceCharge {
    pub amount: String,
    pub base_amount: String,
    pub charge_indicator: bool,
    pub allowance_charge_reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxTotal {
    pub tax_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub taxable_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegalMonetaryTotals {
    pub line_extension_amount: String,
    pub tax_exclusive_amount: String,
    pub tax_inclusive_amount: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub payable_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadPayment {
    pub payment_method_id: i32,
    pub means_payment_id: i32,
    pub value_paid: String,
}

/// Map a validated request plus its computed totals into the provider schema.
///
/// `totals.lines` must be positionally aligned with `request.items`, which
/// `totals::compute` guarantees.
pub fn transform(
    request: &InvoiceRequest,
    totals: &InvoiceTotals,
) -> Result<ProviderInvoicePayload, IssuanceError> {
    let lines = request
        .items
        .iter()
        .zip(&totals.lines)
        .map(|(item, amounts)| build_line(item, amounts.net_amount, amounts.tax_percent, amounts.tax_amount))
        .collect();

    let legal_monetary_totals = LegalMonetaryTotals {
        line_extension_amount: money(totals.net_amount),
        tax_exclusive_amount: money(totals.tax_exclusive_amount()),
        tax_inclusive_amount: money(totals.tax_inclusive_amount()),
        payable_amount: rounded(totals.tax_inclusive_amount()),
    };

    // Invoice-level tax summary only when there is tax to report.
    let tax_totals = (totals.tax_amount > Decimal::ZERO).then(|| {
        vec![TaxTotal {
            tax_id: VAT_TAX_ID.to_string(),
            tax_amount: rounded(totals.tax_amount),
            taxable_amount: rounded(totals.net_amount),
            percent: DEFAULT_TAX_PERCENT,
        }]
    });

    let payments = request
        .payments
        .iter()
        .map(|p| PayloadPayment {
            payment_method_id: p.payment_method_id,
            means_payment_id: p.means_payment_id,
            value_paid: money(p.value_paid),
        })
        .collect();

    // The authority requires the generation timestamp to match the legal
    // signature timestamp, so omitted date/time default to now.
    let now = Utc::now();
    let date = request.date.unwrap_or_else(|| now.date_naive());
    let time = request.time.unwrap_or_else(|| now.time());

    Ok(ProviderInvoicePayload {
        resolution_number: request.resolution_number.clone(),
        prefix: request.prefix.clone(),
        notes: request.notes.clone().unwrap_or_default(),
        document_number: request.document_number.clone(),
        date: date.format("%Y-%m-%d").to_string(),
        time: time.format("%H:%M:%S").to_string(),
        graphic_representation: request.graphic_representation.unwrap_or(0),
        send_email: request.send_email.unwrap_or(1),
        operation_type_id: request.operation_type_id,
        type_document_id: request.document_type.code(),
        sections: build_sections(request)?,
        lines,
        legal_monetary_totals,
        tax_totals,
        payments,
    })
}

fn build_line(item: &LineItem, net_amount: Decimal, tax_percent: Decimal, tax_amount: Decimal) -> PayloadLine {
    let allowance_charges: Vec<PayloadAllowanceCharge> = item
        .allowance_charges
        .iter()
        .map(|charge| PayloadAllowanceCharge {
            amount: money(charge.amount),
            base_amount: money(charge.base_amount),
            charge_indicator: charge.is_charge,
            allowance_charge_reason: charge.reason.clone().unwrap_or_else(|| {
                if charge.is_charge {
                    DEFAULT_SURCHARGE_REASON.to_string()
                } else {
                    DEFAULT_DISCOUNT_REASON.to_string()
                }
            }),
        })
        .collect();

    // Per-line tax sub-list only when the line actually carries tax.
    let tax_totals = (tax_amount > Decimal::ZERO).then(|| {
        vec![TaxTotal {
            tax_id: VAT_TAX_ID.to_string(),
            tax_amount: rounded(tax_amount),
            taxable_amount: rounded(net_amount),
            percent: tax_percent,
        }]
    });

    PayloadLine {
        invoiced_quantity: item.quantity.to_string(),
        quantity_units_id: item
            .quantity_units_id
            .clone()
            .unwrap_or_else(|| DEFAULT_UNIT_CODE.to_string()),
        line_extension_amount: money(net_amount),
        free_of_charge_indicator: false,
        description: item.description.clone(),
        code: item.code.clone().unwrap_or_else(|| DEFAULT_ITEM_CODE.to_string()),
        type_item_identifications_id: item
            .type_item_identifications_id
            .clone()
            .unwrap_or_else(|| DEFAULT_ITEM_IDENTIFICATION_CODE.to_string()),
        reference_price_id: item
            .reference_price_id
            .clone()
            .unwrap_or_else(|| DEFAULT_REFERENCE_PRICE_CODE.to_string()),
        price_amount: item.unit_price.to_string(),
        base_quantity: item.quantity.to_string(),
        allowance_charges: (!allowance_charges.is_empty()).then_some(allowance_charges),
        tax_totals,
    }
}

fn build_sections(request: &InvoiceRequest) -> Result<DocumentSections, IssuanceError> {
    match request.document_type {
        DocumentType::StandardInvoice => {
            let customer = request.customer.as_ref().ok_or_else(|| {
                IssuanceError::validation_field(
                    "customer",
                    "customer is required for standard invoices (typeDocumentId: 7)",
                )
            })?;
            Ok(DocumentSections::Standard {
                customer: full_customer(customer),
            })
        }
        DocumentType::PointOfSale => {
            let point_of_sale = request.point_of_sale.as_ref().ok_or_else(|| {
                IssuanceError::validation_field(
                    "pointOfSale",
                    "pointOfSale is required for point-of-sale documents (typeDocumentId: 20)",
                )
            })?;
            let software_manufacturer = request.software_manufacturer.as_ref().ok_or_else(|| {
                IssuanceError::validation_field(
                    "softwareManufacturer",
                    "softwareManufacturer is required for point-of-sale documents (typeDocumentId: 20)",
                )
            })?;
            Ok(DocumentSections::PointOfSale {
                customer: request.customer.as_ref().map(|c| PosCustomer {
                    company_name: c.company_name.clone(),
                    dni: sanitize_tax_id(&c.tax_id),
                    email: c.email.clone(),
                    points: 0,
                }),
                document_signature: request.document_signature.as_ref().map(|s| SignatureSection {
                    cashier: s.cashier.clone(),
                    seller: s.seller.clone(),
                }),
                point_of_sale: PointOfSaleSection {
                    cashier_name: point_of_sale.cashier_name.clone(),
                    terminal_number: point_of_sale.terminal_number.clone(),
                    cashier_type: point_of_sale.cashier_type.clone(),
                    sales_code: point_of_sale.sales_code.clone(),
                    address: point_of_sale.address.clone(),
                    sub_total: point_of_sale.sub_total.clone(),
                },
                software_manufacturer: SoftwareManufacturerSection {
                    owner_name: software_manufacturer.owner_name.clone(),
                    company_name: software_manufacturer.company_name.clone(),
                    software_name: software_manufacturer.software_name.clone(),
                },
            })
        }
        DocumentType::DebitNote | DocumentType::CreditNote => {
            let discrepancy = request.discrepancy_response.as_ref().ok_or_else(|| {
                IssuanceError::validation_field(
                    "discrepancyResponse",
                    "discrepancyResponse is required for debit/credit notes",
                )
            })?;
            let billing = request.billing_reference.as_ref().ok_or_else(|| {
                IssuanceError::validation_field(
                    "billingReference",
                    "billingReference is required for debit/credit notes",
                )
            })?;
            Ok(DocumentSections::Note {
                customer: request.customer.as_ref().map(full_customer),
                discrepancy_response: DiscrepancySection {
                    reference_id: discrepancy.reference_id.clone(),
                    response_id: discrepancy.response_id.clone(),
                },
                billing_reference: BillingReferenceSection {
                    number: billing.number.clone(),
                    date: billing.date.clone(),
                    uuid: billing.uuid.clone(),
                    scheme_name: billing.scheme_name.clone(),
                },
            })
        }
    }
}

fn full_customer(customer: &Customer) -> FullCustomer {
    FullCustomer {
        country_id: customer.country_id.clone(),
        city_id: customer.city_id.clone(),
        identity_document_id: customer.identity_document_type_id.clone(),
        type_organization_id: customer.organization_type_id,
        tax_regime_id: customer.tax_regime_id,
        tax_level_id: customer.tax_level_id,
        company_name: customer.company_name.clone(),
        dni: sanitize_tax_id(&customer.tax_id),
        mobile: customer.mobile.clone(),
        email: customer.email.clone(),
        address: customer.address.clone(),
        postal_code: customer.postal_code.clone(),
    }
}

/// The provider only accepts alphanumeric tax ids. Falls back to the raw
/// value when stripping would leave nothing.
fn sanitize_tax_id(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if cleaned.is_empty() { raw.to_string() } else { cleaned }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use factura_invoicing::request::{
        AllowanceCharge, BillingReference, Customer, DiscrepancyResponse, LineItem, Payment,
        PointOfSaleInfo, SoftwareManufacturerInfo,
    };
    use factura_invoicing::totals;

    fn line() -> LineItem {
        LineItem {
            description: "Widget".into(),
            code: None,
            quantity: dec!(2),
            unit_price: dec!(100),
            tax_percent: None,
            quantity_units_id: None,
            type_item_identifications_id: None,
            reference_price_id: None,
            allowance_charges: vec![AllowanceCharge {
                amount: dec!(20),
                base_amount: dec!(200),
                is_charge: false,
                reason: None,
            }],
        }
    }

    fn full_customer_input() -> Customer {
        Customer {
            company_name: "ACME".into(),
            tax_id: "900.123-456".into(),
            email: Some("billing@acme.co".into()),
            mobile: None,
            address: None,
            postal_code: None,
            country_id: Some("46".into()),
            city_id: Some("149".into()),
            identity_document_type_id: Some("3".into()),
            organization_type_id: Some(1),
            tax_regime_id: Some(1),
            tax_level_id: Some(5),
        }
    }

    fn pos_request() -> InvoiceRequest {
        InvoiceRequest {
            order_code: "ORD-1".into(),
            resolution_number: "18760000001".into(),
            prefix: "SETP".into(),
            document_number: "990000001".into(),
            notes: None,
            date: None,
            time: None,
            graphic_representation: None,
            send_email: None,
            operation_type_id: 10,
            document_type: DocumentType::PointOfSale,
            customer: None,
            items: vec![line()],
            payments: vec![Payment {
                payment_method_id: 1,
                means_payment_id: 10,
                value_paid: dec!(214.2),
            }],
            document_signature: None,
            point_of_sale: Some(PointOfSaleInfo {
                cashier_name: "Ana".into(),
                terminal_number: "T-01".into(),
                cashier_type: "cashier".into(),
                sales_code: "S-01".into(),
                address: "Calle 1".into(),
                sub_total: "180.00".into(),
            }),
            software_manufacturer: Some(SoftwareManufacturerInfo {
                owner_name: "Owner".into(),
                company_name: "Soft SAS".into(),
                software_name: "POS".into(),
            }),
            discrepancy_response: None,
            billing_reference: None,
        }
    }

    fn payload_for(request: &InvoiceRequest) -> serde_json::Value {
        let computed = totals::compute(&request.items).unwrap();
        let payload = transform(request, &computed).unwrap();
        serde_json::to_value(&payload).unwrap()
    }

    #[test]
    fn worked_example_renders_exact_wire_amounts() {
        let json = payload_for(&pos_request());

        let line = &json["lines"][0];
        assert_eq!(line["invoiced_quantity"], "2");
        assert_eq!(line["line_extension_amount"], "180.00");
        assert_eq!(line["price_amount"], "100");
        assert_eq!(line["quantity_units_id"], "1093");
        assert_eq!(line["code"], "PROD001");
        assert_eq!(line["tax_totals"][0]["tax_amount"], 34.2);
        assert_eq!(line["tax_totals"][0]["taxable_amount"], 180.0);
        assert_eq!(line["tax_totals"][0]["percent"], 19.0);
        assert_eq!(line["allowance_charges"][0]["amount"], "20.00");
        assert_eq!(line["allowance_charges"][0]["charge_indicator"], false);
        assert_eq!(line["allowance_charges"][0]["allowance_charge_reason"], "Promocion");

        let legal = &json["legal_monetary_totals"];
        assert_eq!(legal["line_extension_amount"], "180.00");
        assert_eq!(legal["tax_exclusive_amount"], "180.00");
        assert_eq!(legal["tax_inclusive_amount"], "214.20");
        assert_eq!(legal["payable_amount"], 214.2);

        assert_eq!(json["tax_totals"][0]["tax_amount"], 34.2);
        assert_eq!(json["payments"][0]["value_paid"], "214.20");
    }

    #[test]
    fn zero_tax_invoice_omits_tax_sections_and_forces_exclusive_total() {
        let mut request = pos_request();
        request.items[0].tax_percent = Some(dec!(0));

        let json = payload_for(&request);
        assert!(json["lines"][0].get("tax_totals").is_none());
        assert!(json.get("tax_totals").is_none());

        let legal = &json["legal_monetary_totals"];
        assert_eq!(legal["tax_exclusive_amount"], "0.00");
        assert_eq!(legal["tax_inclusive_amount"], "180.00");
        assert_eq!(legal["payable_amount"], 180.0);
    }

    #[test]
    fn line_without_adjustments_omits_allowance_charges() {
        let mut request = pos_request();
        request.items[0].allowance_charges.clear();

        let json = payload_for(&request);
        assert!(json["lines"][0].get("allowance_charges").is_none());
    }

    #[test]
    fn pos_sections_are_emitted_and_customer_is_simplified() {
        let mut request = pos_request();
        request.customer = Some(full_customer_input());

        let json = payload_for(&request);
        assert_eq!(json["type_document_id"], 20);
        assert_eq!(json["point_of_sale"]["terminal_number"], "T-01");
        assert_eq!(json["software_manufacturer"]["software_name"], "POS");
        assert!(json.get("discrepancy_response").is_none());

        let customer = &json["customer"];
        assert_eq!(customer["dni"], "900123456");
        assert_eq!(customer["points"], 0);
        assert!(customer.get("country_id").is_none());
    }

    #[test]
    fn standard_invoice_emits_full_customer_shape() {
        let mut request = pos_request();
        request.document_type = DocumentType::StandardInvoice;
        request.point_of_sale = None;
        request.software_manufacturer = None;
        request.customer = Some(full_customer_input());

        let json = payload_for(&request);
        let customer = &json["customer"];
        assert_eq!(customer["dni"], "900123456");
        assert_eq!(customer["country_id"], "46");
        assert_eq!(customer["tax_level_id"], 5);
        assert!(customer.get("points").is_none());
        assert!(json.get("point_of_sale").is_none());
    }

    #[test]
    fn notes_emit_discrepancy_and_billing_reference() {
        let mut request = pos_request();
        request.document_type = DocumentType::CreditNote;
        request.point_of_sale = None;
        request.software_manufacturer = None;
        request.discrepancy_response = Some(DiscrepancyResponse {
            reference_id: "SETP-990000001".into(),
            response_id: "2".into(),
        });
        request.billing_reference = Some(BillingReference {
            number: "SETP990000001".into(),
            date: "2026-01-15".into(),
            uuid: "cufe-abc".into(),
            scheme_name: None,
        });

        let json = payload_for(&request);
        assert_eq!(json["type_document_id"], 94);
        assert_eq!(json["discrepancy_response"]["response_id"], "2");
        assert_eq!(json["billing_reference"]["uuid"], "cufe-abc");
        assert!(json.get("point_of_sale").is_none());
    }

    #[test]
    fn omitted_date_and_time_default_to_now() {
        let json = payload_for(&pos_request());
        let date = json["date"].as_str().unwrap();
        let time = json["time"].as_str().unwrap();
        assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
        assert!(chrono::NaiveTime::parse_from_str(time, "%H:%M:%S").is_ok());
    }

    #[test]
    fn sanitize_keeps_raw_value_when_nothing_survives() {
        assert_eq!(sanitize_tax_id("900.123-456"), "900123456");
        assert_eq!(sanitize_tax_id("---"), "---");
    }
}
