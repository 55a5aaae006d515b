//! Adaptive multi-tier search expansion
//!
//! Drives a contact search toward a target count by applying an ordered
//! sequence of parameter relaxations: filters are relaxed before the
//! radius grows, keeping results geographically tight as long as possible.
//!
//! Step order:
//! 1. management levels: add Director
//! 2. management levels: add VP/C-level
//! 3. employee ceiling: remove
//! 4-5. accuracy threshold: lower through the relaxed tiers
//! 6-9. radius: grow through the configured ladder
//!
//! Each step changes exactly one parameter family against the cumulative
//! params, re-runs the batch-split search, and merges newly discovered
//! contacts by stable id. After the first successful search, failures are
//! captured into the report instead of propagating, so callers keep
//! whatever was already accumulated.

use std::collections::{BTreeMap, HashMap, HashSet};

use prospectarc_domain::{
    ContactQuery, ContactRecord, ExpansionReport, ExpansionStep, ExpansionTuning, LocationMode,
    ManagementLevel, ParamFamily, Result,
};
use tracing::{debug, info, warn};

use crate::batch::BatchSplitter;

/// Expansion state machine over the batch-split contact search
pub struct ExpansionEngine {
    splitter: BatchSplitter,
    tuning: ExpansionTuning,
}

/// One planned relaxation, resolved against the cumulative params when the
/// ladder reaches it
#[derive(Debug, Clone, Copy)]
enum PlannedStep {
    AddLevel(ManagementLevel),
    DropEmployeeCeiling,
    AccuracyTier(u32),
    Radius(u32),
}

/// Running accumulation across expansion steps
#[derive(Default)]
struct RunState {
    contacts: Vec<ContactRecord>,
    index_by_id: HashMap<String, usize>,
    companies: HashSet<String>,
}

impl RunState {
    /// Merge newly found contacts; returns (new contacts, new companies).
    ///
    /// A contact already present is not re-counted, but its discovery tag
    /// is upgraded if the incoming pass outranks the recorded one —
    /// person-and-headquarters wins over person-only regardless of call
    /// order.
    fn merge(&mut self, found: Vec<ContactRecord>) -> (usize, usize) {
        let mut new_contacts = 0;
        let mut new_companies = 0;

        for contact in found {
            match self.index_by_id.get(&contact.person_id) {
                Some(&at) => {
                    let existing = &mut self.contacts[at];
                    if let (Some(incoming), Some(recorded)) =
                        (contact.discovered_by, existing.discovered_by)
                    {
                        if incoming.outranks(recorded) {
                            existing.discovered_by = Some(incoming);
                        }
                    }
                }
                None => {
                    if let Some(company_id) = &contact.company_id {
                        if self.companies.insert(company_id.clone()) {
                            new_companies += 1;
                        }
                    }
                    self.index_by_id.insert(contact.person_id.clone(), self.contacts.len());
                    self.contacts.push(contact);
                    new_contacts += 1;
                }
            }
        }

        (new_contacts, new_companies)
    }

    fn found(&self) -> usize {
        self.contacts.len()
    }
}

impl ExpansionEngine {
    #[must_use]
    pub fn new(splitter: BatchSplitter, tuning: ExpansionTuning) -> Self {
        Self { splitter, tuning }
    }

    /// Run the expansion toward `target` contacts.
    ///
    /// With `stop_early`, the ladder halts as soon as the running count
    /// meets the target; otherwise every remaining step runs (useful for
    /// full before/after comparison data).
    ///
    /// # Errors
    /// Fails only if the primary search fails. Step failures after that
    /// degrade into `ExpansionReport::error` with partial results kept.
    pub async fn run_expansion(
        &self,
        base: ContactQuery,
        target: usize,
        stop_early: bool,
    ) -> Result<ExpansionReport> {
        let mut report = ExpansionReport::new(target, base.clone());
        let mut state = RunState::default();

        // Primary search; a failure here aborts the whole run
        let (found, searches) = self.search_once(&base).await?;
        report.searches_performed += searches;
        let (new_contacts, new_companies) = state.merge(found);
        debug!(new_contacts, new_companies, "primary search merged");

        let mut current = base;

        if !(stop_early && state.found() >= target) {
            for planned in self.planned_steps() {
                let (next, family, old_value, new_value) = apply_step(planned, &current);
                debug!(family = family.as_str(), %old_value, %new_value, "applying expansion step");

                match self.search_once(&next).await {
                    Ok((found, searches)) => {
                        report.searches_performed += searches;
                        let (new_contacts, new_companies) = state.merge(found);
                        report.steps_applied.push(ExpansionStep {
                            family,
                            old_value,
                            new_value,
                            new_contacts,
                            new_companies,
                        });
                        current = next;

                        if stop_early && state.found() >= target {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "expansion step failed; returning partial results");
                        report.error = Some(err.to_string());
                        break;
                    }
                }
            }
        }

        report.found = state.found();
        report.target_met = report.found >= target;
        report.final_params = current;
        report.contacts_by_company = group_by_company(&state.contacts);
        report.contacts = state.contacts;

        info!(
            found = report.found,
            target,
            steps = report.steps_applied.len(),
            searches = report.searches_performed,
            "expansion finished"
        );
        Ok(report)
    }

    /// One logical search: either a single pass, or a person-and-HQ pass
    /// plus a person-only supplement in combined location mode. Returns the
    /// tagged records and the number of provider searches performed.
    async fn search_once(&self, query: &ContactQuery) -> Result<(Vec<ContactRecord>, usize)> {
        if !query.combined_location {
            let mut records = self.splitter.search_contacts(query).await?;
            if let Some(mode) = query.location_mode {
                for record in &mut records {
                    record.discovered_by = Some(mode);
                }
            }
            return Ok((records, 1));
        }

        let mut primary =
            self.splitter.search_contacts(&query.with_location_mode(LocationMode::PersonAndHq)).await?;
        for record in &mut primary {
            record.discovered_by = Some(LocationMode::PersonAndHq);
        }

        let mut supplement =
            self.splitter.search_contacts(&query.with_location_mode(LocationMode::PersonOnly)).await?;
        for record in &mut supplement {
            record.discovered_by = Some(LocationMode::PersonOnly);
        }

        primary.extend(supplement);
        Ok((primary, 2))
    }

    /// The fixed nine-step ladder (filters before radius)
    fn planned_steps(&self) -> Vec<PlannedStep> {
        let mut steps = vec![
            PlannedStep::AddLevel(ManagementLevel::Director),
            PlannedStep::AddLevel(ManagementLevel::VpAndCLevel),
            PlannedStep::DropEmployeeCeiling,
        ];
        steps.extend(self.tuning.accuracy_tiers.iter().map(|t| PlannedStep::AccuracyTier(*t)));
        steps.extend(self.tuning.radius_ladder_miles.iter().map(|r| PlannedStep::Radius(*r)));
        steps
    }
}

/// Resolve a planned step against the cumulative params, producing the new
/// params and the recorded old/new values. Exactly one family changes.
fn apply_step(
    planned: PlannedStep,
    current: &ContactQuery,
) -> (ContactQuery, ParamFamily, String, String) {
    match planned {
        PlannedStep::AddLevel(level) => {
            let next = current.with_management_level(level);
            (
                next.clone(),
                ParamFamily::ManagementLevels,
                describe_levels(current),
                describe_levels(&next),
            )
        }
        PlannedStep::DropEmployeeCeiling => {
            let old = match current.employee_max {
                Some(0) => "none".to_string(),
                Some(ceiling) => ceiling.to_string(),
                None => "default".to_string(),
            };
            (current.without_employee_ceiling(), ParamFamily::EmployeeCeiling, old, "none".into())
        }
        PlannedStep::AccuracyTier(tier) => {
            let old =
                current.accuracy_min.map_or_else(|| "default".to_string(), |v| v.to_string());
            (
                current.with_accuracy_min(tier),
                ParamFamily::AccuracyThreshold,
                old,
                tier.to_string(),
            )
        }
        PlannedStep::Radius(miles) => {
            let old = current.radius_miles.map_or_else(|| "none".to_string(), |v| v.to_string());
            (current.with_radius(miles), ParamFamily::Radius, old, miles.to_string())
        }
    }
}

fn describe_levels(query: &ContactQuery) -> String {
    if query.management_levels.is_empty() {
        "none".to_string()
    } else {
        query
            .management_levels
            .iter()
            .map(|l| l.wire_value())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Group contacts by company id, each group sorted by accuracy descending
fn group_by_company(contacts: &[ContactRecord]) -> BTreeMap<String, Vec<ContactRecord>> {
    let mut groups: BTreeMap<String, Vec<ContactRecord>> = BTreeMap::new();
    for contact in contacts {
        if let Some(company_id) = &contact.company_id {
            groups.entry(company_id.clone()).or_default().push(contact.clone());
        }
    }
    for group in groups.values_mut() {
        group.sort_by(|a, b| {
            b.accuracy_score.unwrap_or(0).cmp(&a.accuracy_score.unwrap_or(0))
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: &str, company: &str, accuracy: u32) -> ContactRecord {
        ContactRecord {
            person_id: id.to_string(),
            company_id: Some(company.to_string()),
            accuracy_score: Some(accuracy),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_counts_new_contacts_and_companies_once() {
        let mut state = RunState::default();

        let (c1, k1) = state.merge(vec![contact("p1", "c1", 90), contact("p2", "c1", 80)]);
        assert_eq!((c1, k1), (2, 1));

        let (c2, k2) = state.merge(vec![contact("p2", "c1", 80), contact("p3", "c2", 70)]);
        assert_eq!((c2, k2), (1, 1));
        assert_eq!(state.found(), 3);
    }

    #[test]
    fn test_merge_upgrades_person_only_tag() {
        let mut state = RunState::default();

        let mut person_only = contact("p1", "c1", 90);
        person_only.discovered_by = Some(LocationMode::PersonOnly);
        state.merge(vec![person_only]);

        let mut hq = contact("p1", "c1", 90);
        hq.discovered_by = Some(LocationMode::PersonAndHq);
        let (new_contacts, _) = state.merge(vec![hq]);

        assert_eq!(new_contacts, 0);
        assert_eq!(state.contacts[0].discovered_by, Some(LocationMode::PersonAndHq));
    }

    #[test]
    fn test_merge_keeps_authoritative_tag() {
        let mut state = RunState::default();

        let mut hq = contact("p1", "c1", 90);
        hq.discovered_by = Some(LocationMode::PersonAndHq);
        state.merge(vec![hq]);

        let mut person_only = contact("p1", "c1", 90);
        person_only.discovered_by = Some(LocationMode::PersonOnly);
        state.merge(vec![person_only]);

        assert_eq!(state.contacts[0].discovered_by, Some(LocationMode::PersonAndHq));
    }

    #[test]
    fn test_steps_touch_exactly_one_family() {
        let base = ContactQuery {
            management_levels: vec![ManagementLevel::Manager],
            employee_max: Some(1000),
            accuracy_min: Some(95),
            radius_miles: Some(10),
            ..Default::default()
        };

        let (next, family, old, new) =
            apply_step(PlannedStep::AddLevel(ManagementLevel::Director), &base);
        assert_eq!(family, ParamFamily::ManagementLevels);
        assert_eq!(old, "Manager");
        assert_eq!(new, "Manager,Director");
        assert_eq!(next.employee_max, base.employee_max);
        assert_eq!(next.accuracy_min, base.accuracy_min);
        assert_eq!(next.radius_miles, base.radius_miles);

        let (next, family, old, new) = apply_step(PlannedStep::DropEmployeeCeiling, &base);
        assert_eq!(family, ParamFamily::EmployeeCeiling);
        assert_eq!((old.as_str(), new.as_str()), ("1000", "none"));
        assert_eq!(next.employee_max, Some(0));
        assert_eq!(next.management_levels, base.management_levels);

        let (next, family, old, new) = apply_step(PlannedStep::AccuracyTier(85), &base);
        assert_eq!(family, ParamFamily::AccuracyThreshold);
        assert_eq!((old.as_str(), new.as_str()), ("95", "85"));
        assert_eq!(next.accuracy_min, Some(85));

        let (next, family, old, new) = apply_step(PlannedStep::Radius(50), &base);
        assert_eq!(family, ParamFamily::Radius);
        assert_eq!((old.as_str(), new.as_str()), ("10", "50"));
        assert_eq!(next.radius_miles, Some(50));
    }

    #[test]
    fn test_company_groups_sorted_by_accuracy_descending() {
        let contacts = vec![
            contact("p1", "c1", 70),
            contact("p2", "c1", 95),
            contact("p3", "c2", 80),
        ];

        let groups = group_by_company(&contacts);
        let c1: Vec<u32> =
            groups["c1"].iter().map(|c| c.accuracy_score.unwrap()).collect();
        assert_eq!(c1, vec![95, 70]);
        assert_eq!(groups["c2"].len(), 1);
    }
}
