use crate::models::shelf_life_types::StorageCondition;
use crate::services::classifier::model_manager::ModelManager;
use crate::services::classifier::preprocess::ImageSource;
use crate::services::location::LocationProvider;
use crate::services::orchestrator::core::{init, transition, Effect, Event, OrchestrationState};
use crate::services::shelf_life_client::ShelfLifeService;
use crate::services::weather_client::WeatherService;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;

/// Drives the classifier screen: applies events to the current snapshot and
/// performs the resulting effects one after another, feeding each outcome
/// back in as an event.
///
/// The snapshot lock is held only while a transition is computed, never
/// across an await, so several `dispatch` calls may be in flight at once.
/// Generation tags in the snapshot decide which completions still apply.
pub struct ClassifierSession {
    state: watch::Sender<OrchestrationState>,
    models: ModelManager,
    location: Arc<dyn LocationProvider>,
    weather: Arc<dyn WeatherService>,
    shelf_life: Arc<dyn ShelfLifeService>,
}

impl ClassifierSession {
    pub fn new(
        models: ModelManager,
        location: Arc<dyn LocationProvider>,
        weather: Arc<dyn WeatherService>,
        shelf_life: Arc<dyn ShelfLifeService>,
        storage: StorageCondition,
    ) -> Self {
        let (state, _) = watch::channel(init(storage));
        Self {
            state,
            models,
            location,
            weather,
            shelf_life,
        }
    }

    pub fn snapshot(&self) -> OrchestrationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OrchestrationState> {
        self.state.subscribe()
    }

    pub fn models(&self) -> &ModelManager {
        &self.models
    }

    /// Runs `event` and every effect it leads to; returns the final snapshot.
    pub async fn dispatch(&self, event: Event) -> OrchestrationState {
        let mut pending: VecDeque<Effect> = self.apply(event).into();
        while let Some(effect) = pending.pop_front() {
            let outcome = self.run_effect(effect).await;
            pending.extend(self.apply(outcome));
        }
        self.snapshot()
    }

    pub async fn choose_image(&self, image: ImageSource) -> OrchestrationState {
        self.dispatch(Event::ImageChosen(image)).await
    }

    pub async fn select(&self, index: usize) -> OrchestrationState {
        self.dispatch(Event::ResultSelected(index)).await
    }

    pub async fn set_storage(&self, storage: StorageCondition) -> OrchestrationState {
        self.dispatch(Event::StorageChanged(storage)).await
    }

    pub async fn request_prediction(&self) -> OrchestrationState {
        self.dispatch(Event::PredictionRequested).await
    }

    pub async fn clear(&self) -> OrchestrationState {
        self.dispatch(Event::Cleared).await
    }

    pub async fn reset(&self) -> OrchestrationState {
        self.dispatch(Event::Reset).await
    }

    fn apply(&self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.state.send_modify(|state| {
            let (next, produced) = transition(state, event);
            *state = next;
            effects = produced;
        });
        effects
    }

    async fn run_effect(&self, effect: Effect) -> Event {
        match effect {
            Effect::Classify { generation, image } => {
                log::info!("Classifying {}", image.describe());
                let result = self.models.classify(image).await;
                if let Err(e) = &result {
                    log::error!("Classification failed: {}", e);
                }
                Event::ClassifyDone { generation, result }
            }
            Effect::RequestLocation { generation } => Event::LocationDone {
                generation,
                result: self.location.current_location().await,
            },
            Effect::FetchWeather { generation, at } => Event::WeatherDone {
                generation,
                result: self.weather.current_weather(at).await,
            },
            Effect::PredictShelfLife { generation, request } => Event::ShelfLifeDone {
                generation,
                result: self.shelf_life.predict(&request).await,
            },
        }
    }
}
