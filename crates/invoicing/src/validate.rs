//! Type-conditional request validation.
//!
//! Rules are evaluated independently so every violation is collected, not
//! just the first. An empty list means the request is valid.

use rust_decimal::Decimal;

use factura_core::FieldError;

use crate::request::{DocumentType, InvoiceRequest};

/// Validate an issuance request against the rules of its document type.
pub fn validate(request: &InvoiceRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    required_string(&mut errors, "orderCode", &request.order_code);
    required_string(&mut errors, "resolutionNumber", &request.resolution_number);
    required_string(&mut errors, "prefix", &request.prefix);
    required_string(&mut errors, "documentNumber", &request.document_number);

    if request.items.is_empty() {
        errors.push(FieldError::new("items", "at least one line item is required"));
    }
    for (idx, item) in request.items.iter().enumerate() {
        if item.description.trim().is_empty() {
            errors.push(FieldError::new(
                format!("items[{idx}].description"),
                "description must not be empty",
            ));
        }
        if item.quantity <= Decimal::ZERO {
            errors.push(FieldError::new(
                format!("items[{idx}].quantity"),
                "quantity must be positive",
            ));
        }
        if item.unit_price < Decimal::ZERO {
            errors.push(FieldError::new(
                format!("items[{idx}].unitPrice"),
                "unitPrice must not be negative",
            ));
        }
        if item.tax_percent.is_some_and(|p| p < Decimal::ZERO) {
            errors.push(FieldError::new(
                format!("items[{idx}].taxPercent"),
                "taxPercent must not be negative",
            ));
        }
        for (cidx, charge) in item.allowance_charges.iter().enumerate() {
            if charge.amount < Decimal::ZERO || charge.base_amount < Decimal::ZERO {
                errors.push(FieldError::new(
                    format!("items[{idx}].allowanceCharges[{cidx}]"),
                    "amount and baseAmount must not be negative",
                ));
            }
        }
    }

    match request.document_type {
        DocumentType::PointOfSale => {
            if request.point_of_sale.is_none() {
                errors.push(FieldError::new(
                    "pointOfSale",
                    "pointOfSale is required for point-of-sale documents (typeDocumentId: 20)",
                ));
            }
            if request.software_manufacturer.is_none() {
                errors.push(FieldError::new(
                    "softwareManufacturer",
                    "softwareManufacturer is required for point-of-sale documents (typeDocumentId: 20)",
                ));
            }
            // Customer is optional for POS, but when present it must at
            // least identify the buyer.
            if let Some(customer) = &request.customer {
                if customer.company_name.trim().is_empty() || customer.tax_id.trim().is_empty() {
                    errors.push(FieldError::new(
                        "customer",
                        "customer.companyName and customer.taxId are required when a customer is provided for point-of-sale documents",
                    ));
                }
            }
        }
        DocumentType::DebitNote | DocumentType::CreditNote => {
            let label = match request.document_type {
                DocumentType::DebitNote => "debit notes (typeDocumentId: 93)",
                _ => "credit notes (typeDocumentId: 94)",
            };
            if request.discrepancy_response.is_none() {
                errors.push(FieldError::new(
                    "discrepancyResponse",
                    format!("discrepancyResponse is required for {label}"),
                ));
            }
            if request.billing_reference.is_none() {
                errors.push(FieldError::new(
                    "billingReference",
                    format!("billingReference is required for {label}"),
                ));
            }
        }
        DocumentType::StandardInvoice => match &request.customer {
            None => errors.push(FieldError::new(
                "customer",
                "customer is required for standard invoices (typeDocumentId: 7)",
            )),
            // One aggregated error for the whole customer block.
            Some(customer) if !customer.has_full_profile() => errors.push(FieldError::new(
                "customer",
                "customer must have countryId, cityId, identityDocumentTypeId, organizationTypeId, taxRegimeId and taxLevelId for standard invoices (typeDocumentId: 7)",
            )),
            Some(_) => {}
        },
    }

    errors
}

fn required_string(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, format!("{field} must not be empty")));
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::request::{
        BillingReference, Customer, DiscrepancyResponse, DocumentType, InvoiceRequest, LineItem,
        Payment, PointOfSaleInfo, SoftwareManufacturerInfo,
    };

    fn line() -> LineItem {
        LineItem {
            description: "Widget".into(),
            code: Some("W-1".into()),
            quantity: dec!(1),
            unit_price: dec!(100),
            tax_percent: None,
            quantity_units_id: None,
            type_item_identifications_id: None,
            reference_price_id: None,
            allowance_charges: Vec::new(),
        }
    }

    fn base_request(document_type: DocumentType) -> InvoiceRequest {
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
            document_type,
            customer: None,
            items: vec![line()],
            payments: vec![Payment {
                payment_method_id: 1,
                means_payment_id: 10,
                value_paid: dec!(119),
            }],
            document_signature: None,
            point_of_sale: None,
            software_manufacturer: None,
            discrepancy_response: None,
            billing_reference: None,
        }
    }

    fn pos_info() -> PointOfSaleInfo {
        PointOfSaleInfo {
            cashier_name: "Ana".into(),
            terminal_number: "T-01".into(),
            cashier_type: "cashier".into(),
            sales_code: "S-01".into(),
            address: "Calle 1".into(),
            sub_total: "100.00".into(),
        }
    }

    fn manufacturer() -> SoftwareManufacturerInfo {
        SoftwareManufacturerInfo {
            owner_name: "Owner".into(),
            company_name: "Soft SAS".into(),
            software_name: "POS".into(),
        }
    }

    fn full_customer() -> Customer {
        Customer {
            company_name: "ACME".into(),
            tax_id: "900123456".into(),
            email: None,
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

    #[test]
    fn pos_without_terminal_or_manufacturer_blocks_collects_both_errors() {
        let request = base_request(DocumentType::PointOfSale);
        let errors = validate(&request);

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"pointOfSale"));
        assert!(fields.contains(&"softwareManufacturer"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn pos_with_blocks_and_no_customer_is_valid() {
        let mut request = base_request(DocumentType::PointOfSale);
        request.point_of_sale = Some(pos_info());
        request.software_manufacturer = Some(manufacturer());

        assert!(validate(&request).is_empty());
    }

    #[test]
    fn pos_customer_must_carry_name_and_tax_id() {
        let mut request = base_request(DocumentType::PointOfSale);
        request.point_of_sale = Some(pos_info());
        request.software_manufacturer = Some(manufacturer());
        request.customer = Some(Customer {
            tax_id: "".into(),
            ..full_customer()
        });

        let errors = validate(&request);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "customer");
    }

    #[test]
    fn notes_require_discrepancy_response_and_billing_reference() {
        for document_type in [DocumentType::DebitNote, DocumentType::CreditNote] {
            let request = base_request(document_type);
            let errors = validate(&request);
            let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
            assert!(fields.contains(&"discrepancyResponse"));
            assert!(fields.contains(&"billingReference"));
        }

        let mut request = base_request(DocumentType::CreditNote);
        request.discrepancy_response = Some(DiscrepancyResponse {
            reference_id: "SETP-990000001".into(),
            response_id: "2".into(),
        });
        request.billing_reference = Some(BillingReference {
            number: "SETP990000001".into(),
            date: "2026-01-15".into(),
            uuid: "cufe".into(),
            scheme_name: None,
        });
        assert!(validate(&request).is_empty());
    }

    #[test]
    fn standard_invoice_requires_customer() {
        let request = base_request(DocumentType::StandardInvoice);
        let errors = validate(&request);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "customer");
    }

    #[test]
    fn standard_invoice_customer_missing_tax_level_is_one_aggregated_error() {
        let mut request = base_request(DocumentType::StandardInvoice);
        request.customer = Some(Customer {
            tax_level_id: None,
            ..full_customer()
        });

        let errors = validate(&request);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "customer");
        assert!(errors[0].message.contains("taxLevelId"));
    }

    #[test]
    fn line_item_defects_are_reported_per_line() {
        let mut request = base_request(DocumentType::StandardInvoice);
        request.customer = Some(full_customer());
        request.items.push(LineItem {
            description: "  ".into(),
            quantity: dec!(0),
            unit_price: dec!(-1),
            ..line()
        });

        let errors = validate(&request);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"items[1].description"));
        assert!(fields.contains(&"items[1].quantity"));
        assert!(fields.contains(&"items[1].unitPrice"));
    }

    #[test]
    fn blank_header_fields_are_collected_alongside_type_rules() {
        let mut request = base_request(DocumentType::StandardInvoice);
        request.order_code = " ".into();

        let errors = validate(&request);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"orderCode"));
        assert!(fields.contains(&"customer"));
    }
}
