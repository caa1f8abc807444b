//! Fixed-asset register

use super::FormDefinition;
use crate::state::{
    format_amount, parse_number, AggregateSpec, ApprovalChain, ColumnSpec, DynamicFieldMap,
    FormDocument, FormError, FormField, LineItem, LineItemCollection, Rule, ValidationRules,
};

pub const DEFINITION: FormDefinition = FormDefinition {
    id: "asset-register",
    title: "Fixed Asset Register",
    category: "Finance",
    open,
    rules,
    roles_editable: true,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetEntry {
    pub asset_tag: String,
    pub description: String,
    pub location: String,
    pub acquired_on: String,
    pub cost: String,
    pub depreciation: String,
    pub dynamic_fields: DynamicFieldMap,
}

impl AssetEntry {
    fn book_value(&self) -> Option<f64> {
        let cost = parse_number(&self.cost)?;
        let depreciation = parse_number(&self.depreciation).unwrap_or(0.0);
        Some(cost - depreciation)
    }
}

const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("asset_tag", "Tag"),
    ColumnSpec::text("description", "Description"),
    ColumnSpec::text("location", "Location"),
    ColumnSpec::date("acquired_on", "Acquired"),
    ColumnSpec::number("cost", "Cost"),
    ColumnSpec::number("depreciation", "Accum. Dep."),
    ColumnSpec::derived("book_value", "Book Value"),
];

const AGGREGATES: &[AggregateSpec] = &[
    AggregateSpec {
        key: "total_cost",
        label: "Total Cost",
        column: "cost",
    },
    AggregateSpec {
        key: "total_book_value",
        label: "Net Book Value",
        column: "book_value",
    },
];

impl LineItem for AssetEntry {
    fn columns() -> &'static [ColumnSpec] {
        COLUMNS
    }

    fn aggregates() -> &'static [AggregateSpec] {
        AGGREGATES
    }

    fn fixed(&self, key: &str) -> Option<String> {
        let value = match key {
            "asset_tag" => &self.asset_tag,
            "description" => &self.description,
            "location" => &self.location,
            "acquired_on" => &self.acquired_on,
            "cost" => &self.cost,
            "depreciation" => &self.depreciation,
            "book_value" => return self.book_value().map(format_amount),
            _ => return None,
        };
        Some(value.clone())
    }

    fn set_fixed(&mut self, key: &str, value: String) -> Result<(), FormError> {
        let slot = match key {
            "asset_tag" => &mut self.asset_tag,
            "description" => &mut self.description,
            "location" => &mut self.location,
            "acquired_on" => &mut self.acquired_on,
            "cost" => &mut self.cost,
            "depreciation" => &mut self.depreciation,
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
        .with_field(FormField::text("entity", "Entity", false))
        .with_field(FormField::text("department", "Department", false))
        .with_field(FormField::date("period_end", "Period Ending"))
        .with_field(FormField::text("custodian", "Custodian", false))
        .with_field(FormField::text("remarks", "Remarks", true))
        .with_table(
            "assets",
            "Assets",
            LineItemCollection::<AssetEntry>::seeded(1),
        )
        .with_chain(
            "approvals",
            "Verification",
            ApprovalChain::with_roles(&["Custodian", "Asset Manager", "Finance Controller"]),
        )
}

fn rules() -> ValidationRules {
    ValidationRules::new()
        .rule("entity", Rule::Required)
        .rule("department", Rule::Required)
        .rule("period_end", Rule::Required)
        .rule("period_end", Rule::IsoDate)
        .rule("assets.asset_tag", Rule::MaxLength(12))
        .rule("assets.acquired_on", Rule::IsoDate)
        .rule("assets.cost", Rule::NonNegative)
        .rule("assets.depreciation", Rule::NonNegative)
}
