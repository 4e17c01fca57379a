//! Property tests for the conflict simulator
//!
//! Bounds hold at every observation point for arbitrary seeds, domains,
//! contexts and agreements.

use agreement_simulator_core_rs::context::{EnvironmentContext, MediaVisibility, Weather};
use agreement_simulator_core_rs::domains::Domain;
use agreement_simulator_core_rs::models::Agreement;
use agreement_simulator_core_rs::orchestrator::{ConflictSimulator, SimulationConfig};
use proptest::prelude::*;

fn domain_strategy() -> impl Strategy<Value = Domain> {
    prop_oneof![
        Just(Domain::Maritime),
        Just(Domain::Territorial),
        Just(Domain::Resource),
    ]
}

fn context_strategy() -> impl Strategy<Value = EnvironmentContext> {
    (
        any::<bool>(),
        0u8..3,
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(adverse, media, high_tension, active_monitoring)| EnvironmentContext {
            weather: if adverse { Weather::Adverse } else { Weather::Calm },
            media_visibility: match media {
                0 => MediaVisibility::None,
                1 => MediaVisibility::Low,
                _ => MediaVisibility::High,
            },
            high_tension,
            active_monitoring,
        })
}

fn agreement_strategy() -> impl Strategy<Value = Option<Agreement>> {
    prop::option::of((0.0f64..30.0, any::<bool>(), any::<bool>()).prop_map(
        |(standoff, patrols, hotline)| {
            let mut agreement = Agreement::new()
                .with_term("resupply_SOP", [("standoff_nm", standoff)])
                .with_term("fishing_arrangement", [("joint_patrols", patrols)]);
            if hotline {
                agreement = agreement.with_term("communication_protocol", [("hotline", true)]);
            }
            agreement
        },
    ))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_state_stays_in_bounds(
        seed in any::<u64>(),
        steps in 1usize..150,
        domain in domain_strategy(),
        context in context_strategy(),
        agreement in agreement_strategy(),
    ) {
        let mut config = SimulationConfig::new(steps, domain.as_str())
            .with_seed(seed)
            .with_context(context);
        config.agreement = agreement;

        let mut simulator = ConflictSimulator::new(config).unwrap();
        let mut recorded = 0;

        while let Some(result) = simulator.step() {
            prop_assert!((0.01..=0.95).contains(&result.incident_pressure));
            prop_assert!((0.0..=1.0).contains(&result.escalation_risk));

            for agent in simulator.agents() {
                prop_assert!((0.01..=0.95).contains(&agent.aggression()));
            }

            // History only grows
            let log = simulator.incident_log();
            prop_assert_eq!(log.len(), recorded + result.num_incidents);
            recorded = log.len();
        }

        let result = simulator.result();
        prop_assert_eq!(result.steps, steps);
        let mut last = 0;
        for incident in &result.incidents {
            prop_assert!((0.0..=1.0).contains(&incident.severity()));
            prop_assert!(incident.step() >= last);
            last = incident.step();
        }
    }

    #[test]
    fn prop_same_seed_same_history(
        seed in any::<u64>(),
        domain in domain_strategy(),
        context in context_strategy(),
    ) {
        let config = SimulationConfig::new(60, domain.as_str())
            .with_seed(seed)
            .with_context(context);

        let a = ConflictSimulator::new(config.clone()).unwrap().run();
        let b = ConflictSimulator::new(config).unwrap().run();
        prop_assert_eq!(a.incidents, b.incidents);
        prop_assert_eq!(a.final_pressure, b.final_pressure);
        prop_assert_eq!(a.final_risk, b.final_risk);
    }
}
