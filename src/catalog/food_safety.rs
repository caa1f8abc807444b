//! Food-safety inspection checklist
//!
//! Each row is a checkpoint graded C (compliant), P (partial), NC (non
//! compliant) or NA. The score column is derived from the grade.

use super::FormDefinition;
use crate::state::{
    AggregateSpec, ApprovalChain, ColumnSpec, DynamicFieldMap, FormDocument, FormError, FormField,
    LineItem, LineItemCollection, Rule, ValidationRules,
};

pub const DEFINITION: FormDefinition = FormDefinition {
    id: "food-safety-inspection",
    title: "Food Safety Inspection",
    category: "Compliance",
    open,
    rules,
    roles_editable: false,
};

const GRADES: [&str; 4] = ["C", "P", "NC", "NA"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChecklistRow {
    pub checkpoint: String,
    pub grade: String,
    pub observation: String,
    pub corrective_action: String,
    pub due_by: String,
    pub dynamic_fields: DynamicFieldMap,
}

impl ChecklistRow {
    fn score(&self) -> Option<u8> {
        match self.grade.trim().to_ascii_uppercase().as_str() {
            "C" => Some(2),
            "P" => Some(1),
            "NC" => Some(0),
            _ => None,
        }
    }
}

const COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::text("checkpoint", "Checkpoint"),
    ColumnSpec::text("grade", "Grade"),
    ColumnSpec::derived("score", "Score"),
    ColumnSpec::text("observation", "Observation"),
    ColumnSpec::text("corrective_action", "Corrective Action"),
    ColumnSpec::date("due_by", "Due By"),
];

const AGGREGATES: &[AggregateSpec] = &[AggregateSpec {
    key: "total_score",
    label: "Total Score",
    column: "score",
}];

impl LineItem for ChecklistRow {
    fn columns() -> &'static [ColumnSpec] {
        COLUMNS
    }

    fn aggregates() -> &'static [AggregateSpec] {
        AGGREGATES
    }

    fn fixed(&self, key: &str) -> Option<String> {
        match key {
            "checkpoint" => Some(self.checkpoint.clone()),
            "grade" => Some(self.grade.clone()),
            "score" => self.score().map(|s| s.to_string()),
            "observation" => Some(self.observation.clone()),
            "corrective_action" => Some(self.corrective_action.clone()),
            "due_by" => Some(self.due_by.clone()),
            _ => None,
        }
    }

    fn set_fixed(&mut self, key: &str, value: String) -> Result<(), FormError> {
        let slot = match key {
            "checkpoint" => &mut self.checkpoint,
            "grade" => &mut self.grade,
            "observation" => &mut self.observation,
            "corrective_action" => &mut self.corrective_action,
            "due_by" => &mut self.due_by,
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
        .with_field(FormField::text("outlet", "Outlet", false))
        .with_field(FormField::text("licence_no", "FSSAI Licence No.", false))
        .with_field(FormField::date("inspected_on", "Inspection Date"))
        .with_field(FormField::text("inspector", "Inspector", false))
        .with_field(FormField::number("staff_on_duty", "Staff on Duty"))
        .with_field(FormField::text("summary", "Summary", true))
        .with_table(
            "checkpoints",
            "Checkpoints",
            LineItemCollection::<ChecklistRow>::seeded(1),
        )
        .with_chain(
            "approvals",
            "Sign-off",
            ApprovalChain::with_roles(&["Inspector", "Food Safety Supervisor", "Unit Manager"]),
        )
}

fn rules() -> ValidationRules {
    ValidationRules::new()
        .rule("outlet", Rule::Required)
        .rule("licence_no", Rule::ExactLength(14))
        .rule("inspected_on", Rule::Required)
        .rule("inspected_on", Rule::IsoDate)
        .rule("inspector", Rule::Required)
        .rule("staff_on_duty", Rule::NonNegative)
        .rule("checkpoints.checkpoint", Rule::Required)
        .rule(
            "checkpoints.grade",
            Rule::OneOf(GRADES.iter().map(|g| g.to_string()).collect()),
        )
        .rule("checkpoints.due_by", Rule::IsoDate)
}
