//! GST tax invoice

use super::FormDefinition;
use crate::state::{
    format_amount, parse_number, AggregateSpec, ApprovalChain, ColumnSpec, DynamicFieldMap,
    FormDocument, FormError, FormField, LineItem, LineItemCollection, Rule, ValidationRules,
};

pub const DEFINITION: FormDefinition = FormDefinition {
    id: "tax-invoice",
    title: "Tax Invoice",
    category: "Billing",
    open,
    rules,
    roles_editable: true,
};

/// One billed line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceLine {
    pub description: String,
    pub hsn_code: String,
    pub quantity: String,
    pub rate: String,
    pub tax_rate: String,
    pub dynamic_fields: DynamicFieldMap,
}

impl InvoiceLine {
    fn taxable_value(&self) -> Option<f64> {
        Some(parse_number(&self.quantity)? * parse_number(&self.rate)?)
    }

    fn tax_amount(&self) -> Option<f64> {
        let percent = parse_number(&self.tax_rate).unwrap_or(0.0);
        Some(self.taxable_value()? * percent / 100.0)
    }
}

const GST_SLABS: [&str; 5] = ["0", "5", "12", "18", "28"];

const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("description", "Description"),
    ColumnSpec::text("hsn_code", "HSN/SAC"),
    ColumnSpec::number("quantity", "Qty"),
    ColumnSpec::number("rate", "Rate"),
    ColumnSpec::number("tax_rate", "GST %"),
    ColumnSpec::derived("taxable_value", "Taxable"),
    ColumnSpec::derived("tax_amount", "GST"),
    ColumnSpec::derived("line_total", "Total"),
];

const AGGREGATES: &[AggregateSpec] = &[
    AggregateSpec {
        key: "taxable_total",
        label: "Taxable Value",
        column: "taxable_value",
    },
    AggregateSpec {
        key: "tax_total",
        label: "Total GST",
        column: "tax_amount",
    },
    AggregateSpec {
        key: "grand_total",
        label: "Invoice Total",
        column: "line_total",
    },
];

impl LineItem for InvoiceLine {
    fn columns() -> &'static [ColumnSpec] {
        COLUMNS
    }

    fn aggregates() -> &'static [AggregateSpec] {
        AGGREGATES
    }

    fn fixed(&self, key: &str) -> Option<String> {
        match key {
            "description" => Some(self.description.clone()),
            "hsn_code" => Some(self.hsn_code.clone()),
            "quantity" => Some(self.quantity.clone()),
            "rate" => Some(self.rate.clone()),
            "tax_rate" => Some(self.tax_rate.clone()),
            "taxable_value" => self.taxable_value().map(format_amount),
            "tax_amount" => self.tax_amount().map(format_amount),
            "line_total" => Some(format_amount(self.taxable_value()? + self.tax_amount()?)),
            _ => None,
        }
    }

    fn set_fixed(&mut self, key: &str, value: String) -> Result<(), FormError> {
        let slot = match key {
            "description" => &mut self.description,
            "hsn_code" => &mut self.hsn_code,
            "quantity" => &mut self.quantity,
            "rate" => &mut self.rate,
            "tax_rate" => &mut self.tax_rate,
            _ => {
                return Err(FormError::UnknownColumn {
                    key: key.to_string(),
                })
            }
        };
        *slot = value;
        Ok(())
    }

    fn extension(&self) -> &DynamicFieldMap {
        &self.dynamic_fields
    }

    fn extension_mut(&mut self) -> &mut DynamicFieldMap {
        &mut self.dynamic_fields
    }
}

fn open() -> FormDocument {
    FormDocument::new(DEFINITION.id, DEFINITION.title)
        .with_field(FormField::text("invoice_no", "Invoice No.", false))
        .with_field(FormField::date("invoice_date", "Invoice Date"))
        .with_field(FormField::text("supplier_gstin", "Supplier GSTIN", false))
        .with_field(FormField::text("customer_name", "Bill To", false))
        .with_field(FormField::text("customer_gstin", "Customer GSTIN", false))
        .with_field(FormField::text("place_of_supply", "Place of Supply", false))
        .with_field(FormField::text("notes", "Terms & Notes", true))
        .with_table(
            "lines",
            "Line Items",
            LineItemCollection::<InvoiceLine>::seeded(1),
        )
        .with_chain(
            "approvals",
            "Authorisation",
            ApprovalChain::with_roles(&["Prepared By", "Checked By", "Authorised Signatory"]),
        )
}

fn rules() -> ValidationRules {
    ValidationRules::new()
        .rule("invoice_no", Rule::Required)
        .rule("invoice_date", Rule::Required)
        .rule("invoice_date", Rule::IsoDate)
        .rule("supplier_gstin", Rule::Required)
        .rule("supplier_gstin", Rule::ExactLength(15))
        .rule("customer_name", Rule::Required)
        .rule("customer_gstin", Rule::ExactLength(15))
        .rule("lines.quantity", Rule::NonNegative)
        .rule("lines.rate", Rule::NonNegative)
        .rule(
            "lines.tax_rate",
            Rule::OneOf(GST_SLABS.iter().map(|s| s.to_string()).collect()),
        )
}
