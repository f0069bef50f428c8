use crate::error::AppError;
use crate::models::classify_types::ClassificationResult;
use crate::models::shelf_life_types::{ShelfLifeRequest, ShelfLifeResponse, StorageCondition};
use crate::models::weather_types::{Coordinates, WeatherReport};
use crate::services::classifier::preprocess::ImageSource;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Phase {
    #[default]
    Idle,
    ModelLoading,
    ResultsReady,
    FoodSelected,
    LocationPending,
    WeatherFetching,
    ShelfLifePredicting,
    PredictionReady,
}

impl Phase {
    fn awaiting_network(&self) -> bool {
        matches!(
            self,
            Phase::LocationPending | Phase::WeatherFetching | Phase::ShelfLifePredicting
        )
    }
}

/// One immutable snapshot of the classifier screen. Every transition builds
/// a new value; nothing mutates a published snapshot.
///
/// `generation` tags asynchronous work: a completion carrying any other
/// generation is stale and ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrchestrationState {
    pub generation: u64,
    pub phase: Phase,
    pub image: Option<ImageSource>,
    pub model_loading: bool,
    pub network_loading: bool,
    pub top_results: Vec<ClassificationResult>,
    pub selected: Option<ClassificationResult>,
    pub storage: StorageCondition,
    pub weather: Option<WeatherReport>,
    pub prediction_text: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug)]
pub enum Event {
    /// Gallery pick or camera capture.
    ImageChosen(ImageSource),
    ClassifyDone {
        generation: u64,
        result: Result<Vec<ClassificationResult>, AppError>,
    },
    /// Index into `top_results`.
    ResultSelected(usize),
    StorageChanged(StorageCondition),
    PredictionRequested,
    LocationDone {
        generation: u64,
        result: Result<Coordinates, AppError>,
    },
    WeatherDone {
        generation: u64,
        result: Result<WeatherReport, AppError>,
    },
    ShelfLifeDone {
        generation: u64,
        result: Result<ShelfLifeResponse, AppError>,
    },
    /// Close the detail panel; results stay.
    Cleared,
    /// Drop the image and everything derived from it.
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Classify { generation: u64, image: ImageSource },
    RequestLocation { generation: u64 },
    FetchWeather { generation: u64, at: Coordinates },
    PredictShelfLife { generation: u64, request: ShelfLifeRequest },
}

pub fn init(storage: StorageCondition) -> OrchestrationState {
    OrchestrationState {
        storage,
        ..OrchestrationState::default()
    }
}

pub fn transition(state: &OrchestrationState, event: Event) -> (OrchestrationState, Vec<Effect>) {
    let (next, effects) = match event {
        Event::ImageChosen(image) => {
            let generation = state.generation + 1;
            let next = OrchestrationState {
                generation,
                phase: Phase::ModelLoading,
                image: Some(image.clone()),
                model_loading: true,
                ..init(state.storage)
            };
            (next, vec![Effect::Classify { generation, image }])
        }

        Event::ClassifyDone { generation, result } => {
            if !is_current(state, generation, Phase::ModelLoading) {
                return (state.clone(), vec![]);
            }
            let next = match result {
                Ok(top_results) => OrchestrationState {
                    phase: Phase::ResultsReady,
                    model_loading: false,
                    top_results,
                    ..state.clone()
                },
                Err(e) => OrchestrationState {
                    phase: Phase::Idle,
                    model_loading: false,
                    error_message: Some(e.message),
                    ..state.clone()
                },
            };
            (next, vec![])
        }

        Event::ResultSelected(index) => match state.top_results.get(index) {
            Some(result) if state.phase == Phase::ResultsReady => (
                OrchestrationState {
                    phase: Phase::FoodSelected,
                    selected: Some(result.clone()),
                    error_message: None,
                    ..state.clone()
                },
                vec![],
            ),
            _ => (state.clone(), vec![]),
        },

        Event::StorageChanged(storage) => {
            if state.network_loading || storage == state.storage {
                return (state.clone(), vec![]);
            }
            // A shown prediction was made for the old storage condition.
            let phase = match state.phase {
                Phase::PredictionReady => Phase::FoodSelected,
                phase => phase,
            };
            let next = OrchestrationState {
                phase,
                storage,
                prediction_text: None,
                ..state.clone()
            };
            (next, vec![])
        }

        Event::PredictionRequested => {
            let ready = matches!(state.phase, Phase::FoodSelected | Phase::PredictionReady);
            if !ready || state.selected.is_none() || state.network_loading {
                return (state.clone(), vec![]);
            }
            let generation = state.generation + 1;
            let next = OrchestrationState {
                generation,
                phase: Phase::LocationPending,
                network_loading: true,
                weather: None,
                prediction_text: None,
                error_message: None,
                ..state.clone()
            };
            (next, vec![Effect::RequestLocation { generation }])
        }

        Event::LocationDone { generation, result } => {
            if !is_current(state, generation, Phase::LocationPending) {
                return (state.clone(), vec![]);
            }
            match result {
                Ok(at) => (
                    OrchestrationState {
                        phase: Phase::WeatherFetching,
                        ..state.clone()
                    },
                    vec![Effect::FetchWeather { generation, at }],
                ),
                Err(e) => (abort_chain(state, e), vec![]),
            }
        }

        Event::WeatherDone { generation, result } => {
            if !is_current(state, generation, Phase::WeatherFetching) {
                return (state.clone(), vec![]);
            }
            match (result, &state.selected) {
                (Ok(weather), Some(selected)) => {
                    let request = ShelfLifeRequest {
                        dish_name: selected.label.clone(),
                        temperature: weather.temp_c,
                        humidity: weather.humidity_pct as f64,
                        storage: state.storage.to_string(),
                    };
                    (
                        OrchestrationState {
                            phase: Phase::ShelfLifePredicting,
                            weather: Some(weather),
                            ..state.clone()
                        },
                        vec![Effect::PredictShelfLife { generation, request }],
                    )
                }
                (Ok(_), None) => (
                    abort_chain(state, AppError::from("No food item selected")),
                    vec![],
                ),
                (Err(e), _) => (abort_chain(state, e), vec![]),
            }
        }

        Event::ShelfLifeDone { generation, result } => {
            if !is_current(state, generation, Phase::ShelfLifePredicting) {
                return (state.clone(), vec![]);
            }
            match result {
                Ok(response) => (
                    OrchestrationState {
                        phase: Phase::PredictionReady,
                        network_loading: false,
                        prediction_text: Some(response.formatted),
                        ..state.clone()
                    },
                    vec![],
                ),
                Err(e) => (abort_chain(state, e), vec![]),
            }
        }

        Event::Cleared => {
            let cleared = OrchestrationState {
                selected: None,
                network_loading: false,
                weather: None,
                prediction_text: None,
                error_message: None,
                ..state.clone()
            };
            let next = match state.phase {
                // Nothing selected yet; keep any running classification alive.
                Phase::Idle | Phase::ModelLoading => cleared,
                _ => OrchestrationState {
                    generation: state.generation + 1,
                    phase: Phase::ResultsReady,
                    ..cleared
                },
            };
            (next, vec![])
        }

        Event::Reset => (
            OrchestrationState {
                generation: state.generation + 1,
                ..init(state.storage)
            },
            vec![],
        ),
    };

    if next.phase != state.phase {
        log::debug!("{:?} -> {:?} (generation {})", state.phase, next.phase, next.generation);
    }

    (next, effects)
}

fn is_current(state: &OrchestrationState, generation: u64, phase: Phase) -> bool {
    let current = state.generation == generation && state.phase == phase;
    if !current {
        log::debug!(
            "Dropping stale completion for generation {} (now {} in {:?})",
            generation,
            state.generation,
            state.phase
        );
    }
    current
}

/// Stops the location → weather → shelf-life chain at the failing step.
fn abort_chain(state: &OrchestrationState, error: AppError) -> OrchestrationState {
    debug_assert!(state.phase.awaiting_network());
    log::warn!("Prediction chain stopped in {:?}: {}", state.phase, error);
    OrchestrationState {
        phase: Phase::FoodSelected,
        network_loading: false,
        prediction_text: None,
        error_message: Some(error.message),
        ..state.clone()
    }
}
