//! Static tables behind each domain

use super::TermEffect;
use crate::models::agent::AgentProfile;

/// (category, count, base aggression, risk tolerance, rule following, response threshold)
type RosterRow = (&'static str, usize, f64, f64, f64, f64);

/// (label, relative weight, severity min, severity max)
type IncidentRow = (&'static str, f64, f64, f64);

pub(super) const MARITIME_ROSTER: &[RosterRow] = &[
    ("coast_guard", 2, 0.40, 0.50, 0.70, 0.30),
    ("maritime_militia", 2, 0.55, 0.70, 0.30, 0.25),
    ("naval", 1, 0.30, 0.40, 0.85, 0.40),
    ("fishing_fleet", 3, 0.25, 0.60, 0.50, 0.20),
];

pub(super) const TERRITORIAL_ROSTER: &[RosterRow] = &[
    ("border_guard", 2, 0.40, 0.45, 0.75, 0.30),
    ("irregular_force", 2, 0.60, 0.80, 0.20, 0.25),
    ("army", 1, 0.30, 0.35, 0.90, 0.45),
    ("herders", 2, 0.20, 0.50, 0.55, 0.15),
];

pub(super) const RESOURCE_ROSTER: &[RosterRow] = &[
    ("enforcement_agency", 2, 0.35, 0.45, 0.75, 0.30),
    ("survey_contractor", 1, 0.25, 0.55, 0.80, 0.20),
    ("irregular_force", 1, 0.55, 0.75, 0.25, 0.25),
    ("local_fishers", 3, 0.25, 0.60, 0.50, 0.20),
];

pub(super) const MARITIME_INCIDENTS: &[IncidentRow] = &[
    ("unsafe_approach", 0.25, 0.10, 0.40),
    ("blocking_maneuver", 0.30, 0.20, 0.50),
    ("water_cannon", 0.15, 0.30, 0.60),
    ("laser_pointing", 0.10, 0.30, 0.50),
    ("boarding_attempt", 0.10, 0.50, 0.80),
    ("ramming", 0.05, 0.60, 0.90),
    ("resupply_obstruction", 0.05, 0.40, 0.70),
];

pub(super) const TERRITORIAL_INCIDENTS: &[IncidentRow] = &[
    ("patrol_faceoff", 0.30, 0.10, 0.40),
    ("fortification_work", 0.20, 0.20, 0.50),
    ("airspace_violation", 0.15, 0.30, 0.60),
    ("detention", 0.15, 0.40, 0.70),
    ("skirmish", 0.10, 0.60, 0.90),
    ("livestock_seizure", 0.10, 0.20, 0.40),
];

pub(super) const RESOURCE_INCIDENTS: &[IncidentRow] = &[
    ("survey_interference", 0.25, 0.20, 0.50),
    ("gear_cutting", 0.20, 0.30, 0.60),
    ("vessel_seizure", 0.15, 0.50, 0.80),
    ("unauthorized_drilling", 0.10, 0.40, 0.70),
    ("harassment", 0.30, 0.10, 0.40),
];

pub(super) fn expand_roster(table: &[RosterRow]) -> Vec<AgentProfile> {
    let mut roster = Vec::new();
    for &(category, count, aggression, risk, rules, threshold) in table {
        for n in 1..=count {
            roster.push(AgentProfile {
                id: format!("{}_{}", category, n),
                category: category.to_string(),
                base_aggression: aggression,
                risk_tolerance: risk,
                rule_following: rules,
                response_threshold: threshold,
            });
        }
    }
    roster
}

fn scaled(path: &str, per_unit: f64, cap: f64) -> TermEffect {
    TermEffect::Scaled {
        path: path.to_string(),
        per_unit,
        cap,
    }
}

fn flag(path: &str, factor: f64) -> TermEffect {
    TermEffect::Flag {
        path: path.to_string(),
        factor,
    }
}

pub(super) fn maritime_effects() -> Vec<TermEffect> {
    vec![
        scaled("resupply_SOP.standoff_nm", 0.03, 10.0),
        flag("fishing_arrangement.joint_patrols", 1.1),
    ]
}

pub(super) fn territorial_effects() -> Vec<TermEffect> {
    vec![
        scaled("demilitarized_zone.width_km", 0.02, 20.0),
        flag("patrol_coordination.hotline", 1.1),
    ]
}

pub(super) fn resource_effects() -> Vec<TermEffect> {
    vec![
        scaled("joint_development.revenue_share", 0.3, 1.0),
        flag("survey_moratorium.active", 1.15),
    ]
}
