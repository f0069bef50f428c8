use super::fixture::{delhi_weather, http_500, photo, six_hours, DELHI};
use crate::error::{AppError, ErrorKind};
use crate::models::classify_types::ClassificationResult;
use crate::models::shelf_life_types::{ShelfLifeRequest, StorageCondition};
use crate::services::location::permission_denied;
use crate::services::orchestrator::core::{
    init, transition, Effect, Event, OrchestrationState, Phase,
};

fn pizza_results() -> Vec<ClassificationResult> {
    vec![
        ClassificationResult::new("Pizza", 0.9),
        ClassificationResult::new("Burger", 0.5),
        ClassificationResult::new("Apple", 0.1),
    ]
}

fn step(state: &OrchestrationState, event: Event) -> OrchestrationState {
    transition(state, event).0
}

fn results_ready() -> OrchestrationState {
    let (state, effects) = transition(&init(StorageCondition::Open), Event::ImageChosen(photo()));
    let generation = match &effects[..] {
        [Effect::Classify { generation, .. }] => *generation,
        other => panic!("unexpected effects {:?}", other),
    };
    step(
        &state,
        Event::ClassifyDone {
            generation,
            result: Ok(pizza_results()),
        },
    )
}

fn pizza_selected() -> OrchestrationState {
    step(&results_ready(), Event::ResultSelected(0))
}

fn prediction_ready() -> OrchestrationState {
    let state = step(&pizza_selected(), Event::PredictionRequested);
    let g = state.generation;
    let state = step(&state, Event::LocationDone { generation: g, result: Ok(DELHI) });
    let state = step(&state, Event::WeatherDone { generation: g, result: Ok(delhi_weather()) });
    step(&state, Event::ShelfLifeDone { generation: g, result: Ok(six_hours()) })
}

#[test]
fn test_init() {
    let state = init(StorageCondition::Airtight);
    assert_eq!(state.phase, Phase::Idle);
    assert_eq!(state.storage, StorageCondition::Airtight);
    assert!(!state.model_loading && !state.network_loading);
    assert!(state.top_results.is_empty());
}

#[test]
fn test_image_chosen_starts_classification() {
    let previous = prediction_ready();
    let (state, effects) = transition(&previous, Event::ImageChosen(photo()));

    assert_eq!(state.phase, Phase::ModelLoading);
    assert!(state.model_loading);
    assert!(state.top_results.is_empty());
    assert!(state.selected.is_none());
    assert!(state.prediction_text.is_none());
    assert!(state.weather.is_none());
    assert_eq!(state.storage, previous.storage);
    assert!(state.generation > previous.generation);
    assert_eq!(
        effects,
        vec![Effect::Classify {
            generation: state.generation,
            image: photo()
        }]
    );
}

#[test]
fn test_classification_failure_returns_to_idle_with_error() {
    let (state, _) = transition(&init(StorageCondition::Open), Event::ImageChosen(photo()));
    let state = step(
        &state,
        Event::ClassifyDone {
            generation: state.generation,
            result: Err(AppError::decode("Error loading image: bad header")),
        },
    );
    assert_eq!(state.phase, Phase::Idle);
    assert!(!state.model_loading);
    assert_eq!(state.error_message.as_deref(), Some("Error loading image: bad header"));
}

#[test]
fn test_superseded_classification_is_dropped() {
    let (first, _) = transition(&init(StorageCondition::Open), Event::ImageChosen(photo()));
    let stale_generation = first.generation;
    let (second, _) = transition(&first, Event::ImageChosen(photo()));

    let (after, effects) = transition(
        &second,
        Event::ClassifyDone {
            generation: stale_generation,
            result: Ok(pizza_results()),
        },
    );
    assert_eq!(after, second);
    assert!(effects.is_empty());
}

#[test]
fn test_selection_does_not_touch_network() {
    let (state, effects) = transition(&results_ready(), Event::ResultSelected(1));
    assert_eq!(state.phase, Phase::FoodSelected);
    assert_eq!(state.selected, Some(ClassificationResult::new("Burger", 0.5)));
    assert!(effects.is_empty());

    let (state, effects) = transition(&results_ready(), Event::ResultSelected(7));
    assert_eq!(state.phase, Phase::ResultsReady);
    assert!(state.selected.is_none());
    assert!(effects.is_empty());
}

#[test]
fn test_prediction_chain_effects_in_order() {
    let (state, effects) = transition(
        &step(&pizza_selected(), Event::StorageChanged(StorageCondition::Open)),
        Event::PredictionRequested,
    );
    let g = state.generation;
    assert_eq!(state.phase, Phase::LocationPending);
    assert!(state.network_loading);
    assert_eq!(effects, vec![Effect::RequestLocation { generation: g }]);

    let (state, effects) = transition(&state, Event::LocationDone { generation: g, result: Ok(DELHI) });
    assert_eq!(state.phase, Phase::WeatherFetching);
    assert_eq!(effects, vec![Effect::FetchWeather { generation: g, at: DELHI }]);

    let (state, effects) =
        transition(&state, Event::WeatherDone { generation: g, result: Ok(delhi_weather()) });
    assert_eq!(state.phase, Phase::ShelfLifePredicting);
    assert_eq!(state.weather, Some(delhi_weather()));
    assert_eq!(
        effects,
        vec![Effect::PredictShelfLife {
            generation: g,
            request: ShelfLifeRequest {
                dish_name: "Pizza".to_string(),
                temperature: 34.0,
                humidity: 65.0,
                storage: "Open".to_string(),
            }
        }]
    );

    let (state, effects) =
        transition(&state, Event::ShelfLifeDone { generation: g, result: Ok(six_hours()) });
    assert_eq!(state.phase, Phase::PredictionReady);
    assert!(!state.network_loading);
    assert_eq!(state.prediction_text.as_deref(), Some("6 hours 12 minutes"));
    assert!(effects.is_empty());
}

#[test]
fn test_location_denied_returns_to_food_selected() {
    let state = step(&pizza_selected(), Event::PredictionRequested);
    let (state, effects) = transition(
        &state,
        Event::LocationDone {
            generation: state.generation,
            result: Err(permission_denied()),
        },
    );
    assert_eq!(state.phase, Phase::FoodSelected);
    assert!(!state.network_loading);
    assert!(state.error_message.unwrap().contains("permission denied"));
    assert!(effects.is_empty());
}

#[test]
fn test_weather_failure_stops_before_shelf_life() {
    let state = step(&pizza_selected(), Event::PredictionRequested);
    let g = state.generation;
    let state = step(&state, Event::LocationDone { generation: g, result: Ok(DELHI) });
    let (state, effects) = transition(
        &state,
        Event::WeatherDone {
            generation: g,
            result: Err(http_500(ErrorKind::Weather, "Weather")),
        },
    );
    assert_eq!(state.phase, Phase::FoodSelected);
    assert!(effects.is_empty());
    assert!(state.prediction_text.is_none());
    assert!(state.error_message.unwrap().contains("HTTP 500"));
}

#[test]
fn test_shelf_life_failure_keeps_prediction_empty() {
    let state = step(&pizza_selected(), Event::PredictionRequested);
    let g = state.generation;
    let state = step(&state, Event::LocationDone { generation: g, result: Ok(DELHI) });
    let state = step(&state, Event::WeatherDone { generation: g, result: Ok(delhi_weather()) });
    let state = step(
        &state,
        Event::ShelfLifeDone {
            generation: g,
            result: Err(http_500(ErrorKind::ShelfLife, "Prediction")),
        },
    );
    assert_eq!(state.phase, Phase::FoodSelected);
    assert!(!state.network_loading);
    assert!(state.prediction_text.is_none());
    assert!(state.selected.is_some());
    assert!(state.error_message.is_some());
}

#[test]
fn test_cleared_always_resets_detail_fields() {
    let mid_chain = {
        let state = step(&pizza_selected(), Event::PredictionRequested);
        step(&state, Event::LocationDone { generation: state.generation, result: Ok(DELHI) })
    };
    let failed = {
        let state = step(&pizza_selected(), Event::PredictionRequested);
        step(
            &state,
            Event::LocationDone {
                generation: state.generation,
                result: Err(permission_denied()),
            },
        )
    };

    for before in [results_ready(), pizza_selected(), mid_chain, failed, prediction_ready()] {
        let after = step(&before, Event::Cleared);
        assert!(after.prediction_text.is_none());
        assert!(after.error_message.is_none());
        assert!(after.weather.is_none());
        assert!(after.selected.is_none());
        assert!(!after.network_loading);
        assert_eq!(after.phase, Phase::ResultsReady);
        assert_eq!(after.top_results, pizza_results());
    }
}

#[test]
fn test_cleared_invalidates_in_flight_chain() {
    let state = step(&pizza_selected(), Event::PredictionRequested);
    let g = state.generation;
    let state = step(&state, Event::LocationDone { generation: g, result: Ok(DELHI) });
    let cleared = step(&state, Event::Cleared);

    let (after, effects) =
        transition(&cleared, Event::WeatherDone { generation: g, result: Ok(delhi_weather()) });
    assert_eq!(after, cleared);
    assert!(effects.is_empty());
}

#[test]
fn test_cleared_during_classification_keeps_it_running() {
    let (loading, _) = transition(&init(StorageCondition::Open), Event::ImageChosen(photo()));
    let cleared = step(&loading, Event::Cleared);
    assert_eq!(cleared.phase, Phase::ModelLoading);
    assert_eq!(cleared.generation, loading.generation);
}

#[test]
fn test_storage_change_invalidates_shown_prediction() {
    let state = step(&prediction_ready(), Event::StorageChanged(StorageCondition::Frozen));
    assert_eq!(state.phase, Phase::FoodSelected);
    assert_eq!(state.storage, StorageCondition::Frozen);
    assert!(state.prediction_text.is_none());
}

#[test]
fn test_storage_locked_while_requesting() {
    let state = step(&pizza_selected(), Event::PredictionRequested);
    let after = step(&state, Event::StorageChanged(StorageCondition::Frozen));
    assert_eq!(after, state);
}

#[test]
fn test_prediction_requires_selection_and_no_chain_in_flight() {
    let (state, effects) = transition(&results_ready(), Event::PredictionRequested);
    assert_eq!(state.phase, Phase::ResultsReady);
    assert!(effects.is_empty());

    let in_flight = step(&pizza_selected(), Event::PredictionRequested);
    let (state, effects) = transition(&in_flight, Event::PredictionRequested);
    assert_eq!(state, in_flight);
    assert!(effects.is_empty());
}

#[test]
fn test_prediction_can_be_rerun() {
    let ready = prediction_ready();
    let (state, effects) = transition(&ready, Event::PredictionRequested);
    assert_eq!(state.phase, Phase::LocationPending);
    assert!(state.prediction_text.is_none());
    assert_eq!(effects, vec![Effect::RequestLocation { generation: state.generation }]);
}

#[test]
fn test_network_loading_never_coexists_with_prediction() {
    let ready = prediction_ready();
    assert!(!(ready.network_loading && ready.prediction_text.is_some()));
    let rerun = step(&ready, Event::PredictionRequested);
    assert!(!(rerun.network_loading && rerun.prediction_text.is_some()));
}

#[test]
fn test_reset_returns_to_idle() {
    let state = step(&prediction_ready(), Event::Reset);
    assert_eq!(state.phase, Phase::Idle);
    assert!(state.image.is_none());
    assert!(state.top_results.is_empty());
    assert_eq!(state.storage, StorageCondition::Open);
}
