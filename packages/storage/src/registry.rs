// ABOUTME: Schema registry for every project-scoped content table
// ABOUTME: Declares the plan-document section tables and the named resource descriptors

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{StorageError, StorageResult};
use crate::schema::{ColumnDef, TableSchema};

const fn req(name: &'static str) -> ColumnDef {
    ColumnDef::required(name)
}

const fn opt(name: &'static str) -> ColumnDef {
    ColumnDef::optional(name)
}

/// One `(section, key, columns)` declaration of a plan-document table
#[derive(Debug, Clone, Copy)]
pub struct SectionDeclaration {
    pub section: &'static str,
    pub key: &'static str,
    pub columns: &'static [ColumnDef],
}

impl SectionDeclaration {
    /// Physical table name, a pure function of `(section, key)`
    pub fn table_name(&self) -> String {
        format!("section_{}_{}", self.section.to_ascii_lowercase(), self.key)
    }
}

pub static SECTION_DECLARATIONS: &[SectionDeclaration] = &[
    SectionDeclaration {
        section: "M4",
        key: "business_continuity",
        columns: &[
            req("sl_no"),
            opt("brief_description"),
            opt("impact_of_project_objectives"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M4",
        key: "information_security_requirements",
        columns: &[
            req("sl_no"),
            opt("phase"),
            opt("is_requirement_description"),
            opt("monitoring_control"),
            opt("tools"),
            opt("artifacts"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M5",
        key: "human_resource_and_special_training_plan",
        columns: &[
            req("sl_no"),
            opt("role"),
            opt("skill_experience_required"),
            opt("no_of_people_required"),
            opt("available"),
            opt("project_specific_training_needs"),
        ],
    },
    SectionDeclaration {
        section: "M5",
        key: "environment_and_tools",
        columns: &[
            req("sl_no"),
            opt("name_brief_description"),
            opt("no_of_licenses_required"),
            opt("source"),
            opt("status"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M5",
        key: "build_buy_reuse",
        columns: &[
            req("sl_no"),
            opt("component_product"),
            opt("build_buy_reuse"),
            opt("reuse_goals_objectives"),
            opt("vendor_project_name_version"),
            opt("responsible_person_reuse"),
            opt("quality_evaluation_criteria"),
            opt("responsible_person_qualification"),
            opt("modifications_planned"),
            opt("selected_item_operational_environment"),
            opt("known_defect_vulnerabilities_limitations"),
        ],
    },
    SectionDeclaration {
        section: "M5",
        key: "reuse_analysis",
        columns: &[
            req("sl_no"),
            opt("component_product"),
            opt("reuse"),
            opt("modifications_required"),
            opt("constraints_for_reuse"),
            opt("risk_analysis_result"),
            opt("impact_on_plan_activities"),
            opt("evaluation_to_comply_cyber_security"),
            opt("impact_on_integration_documents"),
            opt("known_defects"),
        ],
    },
    SectionDeclaration {
        section: "M5",
        key: "size_and_complexity",
        columns: &[
            req("sl_no"),
            opt("product_component_module"),
            opt("size_kloc"),
            opt("percent_reuse_estimated"),
            opt("effort_person_days_weeks_months"),
            opt("complexity"),
        ],
    },
    SectionDeclaration {
        section: "M5",
        key: "duration_effort_estimate_organization_norms",
        columns: &[
            opt("phase_milestone"),
            opt("schedule_days_weeks"),
            opt("effort_person_days_weeks"),
            opt("remarks_on_deviation"),
        ],
    },
    SectionDeclaration {
        section: "M5",
        key: "usage_of_off_the_shelf_component",
        columns: &[
            req("sl_no"),
            opt("name_of_component"),
            opt("requirements_complied"),
            opt("requirement_document_updated"),
            opt("specific_application_context"),
            opt("documentation_sufficient"),
            opt("vulnerabilities_identified"),
            opt("integration_document_updated"),
            opt("test_design_document"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M5",
        key: "cybersecurity_interface_agreement",
        columns: &[
            req("sl_no"),
            opt("phase"),
            opt("work_product"),
            opt("document_ref"),
            opt("supplier"),
            opt("customer"),
            opt("level_of_confidentiality"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M6",
        key: "project_monitoring_and_control",
        columns: &[
            req("sl_no"),
            opt("type_of_progress_reviews"),
            opt("month_phase_milestone_frequency"),
            opt("participants"),
            opt("remarks"),
            opt("mode_of_communication"),
        ],
    },
    SectionDeclaration {
        section: "M6",
        key: "quantitative_objectives_measurement_and_data_management_plan",
        columns: &[
            opt("objective"),
            opt("metric"),
            opt("priority"),
            opt("project_goal"),
            opt("organisation_norm"),
            opt("data_source"),
            opt("reason_for_deviation_from_organization_norm"),
        ],
    },
    SectionDeclaration {
        section: "M7",
        key: "standards_qm",
        columns: &[
            req("sl_no"),
            opt("name_of_standard"),
            opt("brief_description"),
            opt("source"),
        ],
    },
    SectionDeclaration {
        section: "M7",
        key: "verification_and_validation_plan",
        columns: &[
            req("sl_no"),
            opt("artifact_name"),
            opt("verification_method"),
            opt("verification_type"),
            opt("validation_method"),
            opt("validation_type"),
            opt("tools_used"),
            opt("approving_authority"),
            opt("verification_validation_evidence"),
            opt("remarks_deviation"),
        ],
    },
    SectionDeclaration {
        section: "M7",
        key: "confirmation_review_plan",
        columns: &[
            req("sl_no"),
            opt("artifact_name"),
            opt("phase"),
            opt("confirmation_measure"),
            opt("plan_schedule"),
            opt("asil"),
            opt("independence_level"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M7",
        key: "proactive_causal_analysis_plan",
        columns: &[
            req("sl_no"),
            opt("previous_similar_projects_executed"),
            opt("major_issues_defects_identified_by_customer"),
            opt("corrective_preventive_measures"),
        ],
    },
    SectionDeclaration {
        section: "M7",
        key: "reactive_causal_analysis_plan",
        columns: &[
            req("sl_no"),
            opt("phase_milestone"),
            opt("brief_description_of_instances_when_causal_analysis_needs_to_be_done"),
            opt("causal_analysis_method_tool"),
            opt("responsibility"),
        ],
    },
    SectionDeclaration {
        section: "M8",
        key: "decision_management_plan",
        columns: &[
            req("sl_no"),
            opt("phase_milestone"),
            opt("brief_description_of_major_decisions"),
            opt("decision_making_method_tool"),
            opt("responsibility"),
        ],
    },
    SectionDeclaration {
        section: "M8",
        key: "tailoring_qms",
        columns: &[
            req("sl_no"),
            opt("brief_description_of_deviation"),
            opt("reasons_justifications"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M8",
        key: "deviations",
        columns: &[
            req("sl_no"),
            opt("brief_description_of_deviation"),
            opt("reasons_justifications"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M8",
        key: "product_release_plan",
        columns: &[
            req("sl_no"),
            opt("release_type"),
            opt("objective"),
            opt("release_date_milestones"),
            opt("mode_of_delivery"),
            opt("qa_release_audit_date"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M8",
        key: "tailoring_due_to_component_out_of_context",
        columns: &[
            req("sl_no"),
            opt("name_of_the_out_of_context_component"),
            opt("name_of_the_cyber_security_requirements_impacted"),
            opt("external_interfaces_document"),
            opt("impact_on_cyber_security_claims"),
            opt("impact_on_cyber_security_assumptions"),
            opt("validations_of_requirement_assumption_and_claims_are_done"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M8",
        key: "release_cybersecurity_interface_agreement",
        columns: &[
            req("sl_no"),
            opt("phase"),
            opt("work_product"),
            opt("document_ref"),
            opt("supplier"),
            opt("customer"),
            opt("level_of_confidentiality"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M9",
        key: "risk_management_plan",
        columns: &[
            opt("risk_identification_method"),
            opt("phase_sprint_milestone"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M9",
        key: "risk_mitigation_and_contingency",
        columns: &[
            req("risk_id"),
            opt("risk_description"),
            opt("risk_category"),
            opt("risk_originator_name"),
            opt("risk_source"),
            opt("date_of_risk_identification"),
            opt("phase_of_risk_identification"),
            opt("risk_treatment_option"),
            opt("rationale_to_choose_risk_treatment_option"),
            opt("effort_required_for_risk_treatment"),
            opt("risk_treatment_schedule"),
            opt("success_criteria_for_risk_treatment_activities"),
            opt("criteria_for_cancellation_of_risk_treatment_activities"),
            opt("frequency_of_monitoring_risk_treatment_activities"),
            opt("threshold"),
            opt("trigger"),
            opt("probability"),
            opt("impact"),
            opt("risk_exposure"),
            opt("mitigation_plan"),
            opt("contingency_plan"),
            opt("verification_methods_for_mitigation_contingency_plan"),
            opt("list_of_stakeholders"),
            opt("responsibility"),
            opt("status"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M9",
        key: "risk_exposure_history",
        columns: &[opt("risk"), opt("date"), opt("exposure_value")],
    },
    SectionDeclaration {
        section: "M10",
        key: "opportunity_register",
        columns: &[
            req("opportunity_id"),
            opt("opportunity_description"),
            opt("opportunity_category"),
            opt("opportunity_source"),
            opt("date_of_identification"),
            opt("phase_of_identification"),
            opt("cost"),
            opt("benefit"),
            opt("opportunity_value"),
            opt("leverage_plan_to_maximize_opportunities_identified"),
            opt("responsibility"),
            opt("status"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M10",
        key: "opportunity_management_plan",
        columns: &[
            req("sl_no"),
            opt("opportunity_identification_method"),
            opt("phase_sprint_milestone"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M10",
        key: "opportunity_value_history",
        columns: &[opt("opportunity"), opt("date"), opt("opportunity_value")],
    },
    SectionDeclaration {
        section: "M11",
        key: "list_of_configuration_items",
        columns: &[
            req("sl_no"),
            opt("ci_name_description"),
            opt("source"),
            opt("format_type"),
            opt("description_of_level"),
            opt("branching_merging_required"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M11",
        key: "list_of_non_configurable_items",
        columns: &[
            req("sl_no"),
            opt("ci_name_description"),
            opt("source"),
            opt("format_type"),
            opt("description_of_level"),
            opt("branching_merging_required"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M11",
        key: "naming_convention",
        columns: &[
            req("sl_no"),
            opt("files_and_folders"),
            opt("naming_convention"),
            opt("name_of_ci"),
        ],
    },
    SectionDeclaration {
        section: "M11",
        key: "branching_and_merging",
        columns: &[
            req("sl_no"),
            opt("branch_convention"),
            opt("phase"),
            opt("branch_name"),
            opt("risk_associated_with_branching"),
            opt("verification"),
        ],
    },
    SectionDeclaration {
        section: "M11",
        key: "labelling_baselines",
        columns: &[
            req("sl_no"),
            opt("ci"),
            opt("planned_baseline_phase_milestone_date"),
            opt("criteria_for_baseline"),
            opt("baseline_name_label_or_tag"),
        ],
    },
    SectionDeclaration {
        section: "M11",
        key: "labelling_baselines2",
        columns: &[
            req("sl_no"),
            opt("branch_convention"),
            opt("phase"),
            opt("branch_name_tag"),
        ],
    },
    SectionDeclaration {
        section: "M11",
        key: "configuration_control",
        columns: &[
            req("sl_no"),
            opt("ci_or_folder_name_path"),
            opt("developer_role"),
            opt("team_leader_role"),
            opt("em_role"),
            opt("ed_role"),
            opt("qa_role"),
            opt("ccb_member"),
        ],
    },
    SectionDeclaration {
        section: "M11",
        key: "configuration_control_board",
        columns: &[
            req("sl_no"),
            opt("ccb_members_name"),
            opt("role"),
            opt("remarks_need_for_inclusion"),
        ],
    },
    SectionDeclaration {
        section: "M11",
        key: "configuration_status_accounting",
        columns: &[req("sl_no"), opt("phase_milestone_month")],
    },
    SectionDeclaration {
        section: "M11",
        key: "configuration_management_audit",
        columns: &[req("sl_no"), opt("phase_milestone_month")],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_assumptions",
        columns: &[
            req("sl_no"),
            opt("brief_description"),
            opt("impact_on_project_objectives"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_constraints",
        columns: &[
            req("constraint_no"),
            opt("brief_description"),
            opt("impact_on_project_objectives"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_dependencies",
        columns: &[
            req("sl_no"),
            opt("brief_description"),
            opt("impact_on_project_objectives"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_risks",
        columns: &[
            req("sl_no"),
            opt("brief_description"),
            opt("impact_of_project_objectives"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_status_reporting_and_communication_plan",
        columns: &[
            req("sl_no"),
            opt("type_of_progress_reviews"),
            opt("month_phase_milestone_frequency"),
            opt("participants"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_quantitative_objectives_measurement_and_data_management_plan",
        columns: &[
            opt("objective"),
            opt("metric"),
            opt("project_goal"),
            opt("organisation_norm"),
            opt("data_source"),
            opt("reason_for_deviation_from_organization_norm"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_verification_and_validation_plan",
        columns: &[
            req("sl_no"),
            opt("work_product"),
            opt("verification_method"),
            opt("validation_method"),
            opt("approving_authority"),
            opt("remarks_for_deviation"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "tailoring_sam",
        columns: &[
            req("sl_no"),
            opt("brief_description_of_deviation"),
            opt("reasons_justifications"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_deviations",
        columns: &[
            req("sl_no"),
            opt("brief_description_of_deviation"),
            opt("reasons_justifications"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_product_release_plan",
        columns: &[
            req("sl_no"),
            opt("release_type"),
            opt("objective"),
            opt("release_date_milestones"),
            opt("remarks"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_labelling_baselines",
        columns: &[
            req("sl_no"),
            opt("ci"),
            opt("planned_baseline_phase_milestone_date"),
            opt("criteria_for_baseline"),
            opt("baseline_name_label_or_tag"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_labelling_baselines2",
        columns: &[
            req("sl_no"),
            opt("branch_convention"),
            opt("phase"),
            opt("branch_name_tag"),
        ],
    },
    SectionDeclaration {
        section: "M13",
        key: "sam_configuration_control",
        columns: &[
            req("sl_no"),
            opt("ci_or_folder_name_path"),
            opt("developer_role"),
            opt("team_leader_role"),
            opt("pm_role"),
            opt("pgm_dh_role"),
            opt("qa_role"),
            opt("ccb_member"),
        ],
    },
];

/// Fixed-shape content families exposed under `/projects/{project_id}/{path}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedResource {
    RevisionHistory,
    TocEntries,
    DefinitionAcronyms,
    SingleEntry,
    ProjectDetails,
    Assumptions,
    Constraints,
    Dependencies,
    Stakeholders,
    Deliverables,
    MilestoneColumns,
    SamDeliverables,
    SamMilestoneColumns,
}

impl NamedResource {
    pub const ALL: [NamedResource; 13] = [
        NamedResource::RevisionHistory,
        NamedResource::TocEntries,
        NamedResource::DefinitionAcronyms,
        NamedResource::SingleEntry,
        NamedResource::ProjectDetails,
        NamedResource::Assumptions,
        NamedResource::Constraints,
        NamedResource::Dependencies,
        NamedResource::Stakeholders,
        NamedResource::Deliverables,
        NamedResource::MilestoneColumns,
        NamedResource::SamDeliverables,
        NamedResource::SamMilestoneColumns,
    ];

    /// URL segment used by the HTTP layer
    pub fn path(self) -> &'static str {
        match self {
            NamedResource::RevisionHistory => "revision-history",
            NamedResource::TocEntries => "toc-entries",
            NamedResource::DefinitionAcronyms => "definition-acronyms",
            NamedResource::SingleEntry => "single-entry",
            NamedResource::ProjectDetails => "project-details",
            NamedResource::Assumptions => "assumptions",
            NamedResource::Constraints => "constraints",
            NamedResource::Dependencies => "dependencies",
            NamedResource::Stakeholders => "stakeholders",
            NamedResource::Deliverables => "deliverables",
            NamedResource::MilestoneColumns => "milestone-columns",
            NamedResource::SamDeliverables => "sam-deliverables",
            NamedResource::SamMilestoneColumns => "sam-milestone-columns",
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            NamedResource::RevisionHistory => "revision_history",
            NamedResource::TocEntries => "toc_entries",
            NamedResource::DefinitionAcronyms => "definition_acronyms",
            NamedResource::SingleEntry => "single_entry_fields",
            NamedResource::ProjectDetails => "project_details",
            NamedResource::Assumptions => "assumptions",
            NamedResource::Constraints => "constraints",
            NamedResource::Dependencies => "dependencies",
            NamedResource::Stakeholders => "stakeholders",
            NamedResource::Deliverables => "deliverables",
            NamedResource::MilestoneColumns => "milestone_columns",
            NamedResource::SamDeliverables => "sam_deliverables",
            NamedResource::SamMilestoneColumns => "sam_milestone_columns",
        }
    }

    pub fn columns(self) -> &'static [ColumnDef] {
        match self {
            NamedResource::RevisionHistory => REVISION_HISTORY_COLUMNS,
            NamedResource::TocEntries => TOC_ENTRY_COLUMNS,
            NamedResource::DefinitionAcronyms => DEFINITION_ACRONYM_COLUMNS,
            NamedResource::SingleEntry => SINGLE_ENTRY_COLUMNS,
            NamedResource::ProjectDetails => PROJECT_DETAIL_COLUMNS,
            NamedResource::Assumptions | NamedResource::Dependencies => ASSUMPTION_COLUMNS,
            NamedResource::Constraints => CONSTRAINT_COLUMNS,
            NamedResource::Stakeholders => STAKEHOLDER_COLUMNS,
            NamedResource::Deliverables => DELIVERABLE_COLUMNS,
            NamedResource::SamDeliverables => SAM_DELIVERABLE_COLUMNS,
            NamedResource::MilestoneColumns | NamedResource::SamMilestoneColumns => {
                MILESTONE_COLUMN_COLUMNS
            }
        }
    }
}

const REVISION_HISTORY_COLUMNS: &[ColumnDef] = &[
    req("revision_no"),
    req("change_description"),
    req("reviewed_by"),
    req("approved_by"),
    req("date"),
    opt("remarks"),
];

const TOC_ENTRY_COLUMNS: &[ColumnDef] = &[req("sheet_name"), req("sections_in_sheet")];

const DEFINITION_ACRONYM_COLUMNS: &[ColumnDef] = &[req("term"), req("definition")];

const SINGLE_ENTRY_COLUMNS: &[ColumnDef] = &[req("field_name"), req("content"), opt("image_data")];

const PROJECT_DETAIL_COLUMNS: &[ColumnDef] = &[
    req("project_model"),
    req("project_type"),
    req("software_type"),
    req("standard_to_be_followed"),
    req("customer"),
    req("programming_language"),
    req("project_duration"),
    req("team_size"),
];

// Shared by assumptions and dependencies
const ASSUMPTION_COLUMNS: &[ColumnDef] = &[
    req("sl_no"),
    req("brief_description"),
    req("impact_on_project_objectives"),
    opt("remarks"),
];

const CONSTRAINT_COLUMNS: &[ColumnDef] = &[
    req("constraint_no"),
    req("brief_description"),
    req("impact_on_project_objectives"),
    opt("remarks"),
];

const STAKEHOLDER_COLUMNS: &[ColumnDef] = &[
    req("sl_no"),
    req("name"),
    req("stakeholder_type"),
    req("role"),
    req("authority_responsibility"),
    req("contact_details"),
];

const DELIVERABLE_COLUMNS: &[ColumnDef] = &[
    req("sl_no"),
    req("work_product"),
    req("owner_of_deliverable"),
    req("approving_authority"),
    req("release_to_customer"),
    ColumnDef::json_object("milestones"),
];

const SAM_DELIVERABLE_COLUMNS: &[ColumnDef] = &[
    req("sl_no"),
    req("work_product"),
    req("owner_of_deliverable"),
    req("approving_authority"),
    req("release_to_tsbj"),
    ColumnDef::json_object("milestones"),
];

const MILESTONE_COLUMN_COLUMNS: &[ColumnDef] = &[req("column_name"), ColumnDef::order("order")];

/// A registered section table with its resolved schema
#[derive(Debug, Clone)]
pub struct SectionTable {
    pub section: &'static str,
    pub key: &'static str,
    pub schema: TableSchema,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub name: &'static str,
    pub nullable: bool,
}

/// Catalogue entry describing one section table to clients
#[derive(Debug, Clone, Serialize)]
pub struct SectionInfo {
    pub section: &'static str,
    pub table_name: &'static str,
    pub columns: Vec<ColumnInfo>,
}

/// Immutable lookup of every content table, built once at startup
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    named: Vec<TableSchema>,
    sections: BTreeMap<(String, String), SectionTable>,
}

impl SchemaRegistry {
    /// Registry holding every built-in named resource and section declaration
    pub fn builtin() -> StorageResult<Self> {
        Self::from_declarations(SECTION_DECLARATIONS)
    }

    pub fn from_declarations(declarations: &[SectionDeclaration]) -> StorageResult<Self> {
        let named = NamedResource::ALL
            .iter()
            .map(|resource| TableSchema::new(resource.table_name(), resource.columns()))
            .collect::<StorageResult<Vec<_>>>()?;

        let mut sections = BTreeMap::new();
        for declaration in declarations {
            let schema = TableSchema::new(declaration.table_name(), declaration.columns)?;

            let clashes_with_named = named
                .iter()
                .any(|n| n.table_name() == schema.table_name());
            let key = (declaration.section.to_string(), declaration.key.to_string());
            if clashes_with_named || sections.contains_key(&key) {
                return Err(StorageError::InvalidSchema(format!(
                    "section table {}/{} is declared twice",
                    declaration.section, declaration.key
                )));
            }

            sections.insert(
                key,
                SectionTable {
                    section: declaration.section,
                    key: declaration.key,
                    schema,
                },
            );
        }

        Ok(Self { named, sections })
    }

    /// Schema of a named resource. `named` is built from `NamedResource::ALL` in order.
    pub fn named(&self, resource: NamedResource) -> &TableSchema {
        &self.named[resource as usize]
    }

    /// Resolve a `(section, table_name)` pair, failing with `NotFound` when undeclared
    pub fn section(&self, section: &str, table_name: &str) -> StorageResult<&SectionTable> {
        self.sections
            .get(&(section.to_string(), table_name.to_string()))
            .ok_or_else(|| StorageError::not_found("Table"))
    }

    pub fn sections(&self) -> impl Iterator<Item = &SectionTable> {
        self.sections.values()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Every project-scoped table: named resources first, then section tables
    pub fn all_tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.named
            .iter()
            .chain(self.sections.values().map(|t| &t.schema))
    }

    pub fn catalogue(&self) -> Vec<SectionInfo> {
        self.sections
            .values()
            .map(|table| SectionInfo {
                section: table.section,
                table_name: table.key,
                columns: table
                    .schema
                    .columns()
                    .iter()
                    .map(|c| ColumnInfo {
                        name: c.name,
                        nullable: c.nullable,
                    })
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnKind;

    #[test]
    fn test_builtin_registry_is_valid() {
        let registry = SchemaRegistry::builtin().expect("built-in declarations must be valid");
        assert_eq!(registry.section_count(), SECTION_DECLARATIONS.len());
        assert_eq!(registry.section_count(), 52);
        assert_eq!(registry.all_tables().count(), 52 + NamedResource::ALL.len());
    }

    #[test]
    fn test_table_names_are_deterministic() {
        let first = SchemaRegistry::builtin().unwrap();
        let second = SchemaRegistry::builtin().unwrap();
        let a: Vec<_> = first.all_tables().map(|t| t.table_name().to_string()).collect();
        let b: Vec<_> = second.all_tables().map(|t| t.table_name().to_string()).collect();
        assert_eq!(a, b);

        let table = first.section("M9", "risk_mitigation_and_contingency").unwrap();
        assert_eq!(
            table.schema.table_name(),
            "section_m9_risk_mitigation_and_contingency"
        );
    }

    #[test]
    fn test_unknown_section_is_not_found() {
        let registry = SchemaRegistry::builtin().unwrap();
        assert!(matches!(
            registry.section("M9", "no_such_table"),
            Err(StorageError::NotFound(_))
        ));
        // Table keys are only valid within their own section
        assert!(registry.section("M4", "risk_exposure_history").is_err());
    }

    #[test]
    fn test_named_lookup_matches_resource() {
        let registry = SchemaRegistry::builtin().unwrap();
        for resource in NamedResource::ALL {
            assert_eq!(registry.named(resource).table_name(), resource.table_name());
        }

        let milestones = registry.named(NamedResource::MilestoneColumns);
        assert_eq!(
            milestones.order_column().map(|c| c.kind),
            Some(ColumnKind::Order)
        );
    }

    #[test]
    fn test_named_columns_are_static() {
        fn names(resource: NamedResource) -> Vec<&'static str> {
            resource.columns().iter().map(|c| c.name).collect()
        }

        assert_eq!(names(NamedResource::SingleEntry), vec!["field_name", "content", "image_data"]);
        assert_eq!(names(NamedResource::Assumptions), names(NamedResource::Dependencies));
        assert_eq!(
            names(NamedResource::MilestoneColumns),
            names(NamedResource::SamMilestoneColumns)
        );
        assert_eq!(names(NamedResource::ProjectDetails).len(), 8);
        assert_eq!(
            NamedResource::SamDeliverables.columns().last().map(|c| c.kind),
            Some(ColumnKind::JsonObject)
        );
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let declarations = [SECTION_DECLARATIONS[0], SECTION_DECLARATIONS[0]];
        assert!(matches!(
            SchemaRegistry::from_declarations(&declarations),
            Err(StorageError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_catalogue_preserves_column_order() {
        let registry = SchemaRegistry::builtin().unwrap();
        let catalogue = registry.catalogue();
        let entry = catalogue
            .iter()
            .find(|s| s.section == "M9" && s.table_name == "risk_exposure_history")
            .unwrap();
        let names: Vec<_> = entry.columns.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["risk", "date", "exposure_value"]);
    }
}
