//! Behavior models: Markov chains over services
//!
//! A [`BehaviorModel`] describes one class of synthetic user as a Markov
//! chain whose states are services. Each transition carries a probability
//! and the think time spent before taking it. A [`BehaviorMix`] weights
//! several models against each other.

use crate::{ModelError, ModelResult, Service, ServiceId};
use crate::target::{target_repr, TargetRepr};
use serde::{Deserialize, Serialize};

/// Tolerance for floating point probability sums
pub const PROBABILITY_EPSILON: f64 = 1e-9;

// ── Identifiers ──────────────────────────────────────────────────────

/// Index of a state inside one behavior model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkovStateId(pub usize);

impl MarkovStateId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for MarkovStateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "markov:{}", self.0)
    }
}

// ── Behavior Mix ─────────────────────────────────────────────────────

/// Weighted set of behavior models
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BehaviorMix {
    #[serde(default)]
    pub models: Vec<WeightedBehaviorModel>,
}

impl BehaviorMix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a model with its relative frequency
    pub fn add(&mut self, relative_frequency: f64, model: BehaviorModel) {
        self.models.push(WeightedBehaviorModel {
            relative_frequency,
            model,
        });
    }

    pub fn with_model(mut self, relative_frequency: f64, model: BehaviorModel) -> Self {
        self.add(relative_frequency, model);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeightedBehaviorModel> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// A behavior model and its weight in the mix
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeightedBehaviorModel {
    /// Weight relative to the other models; need not sum to 1
    pub relative_frequency: f64,
    pub model: BehaviorModel,
}

// ── Behavior Model ───────────────────────────────────────────────────

/// A named Markov chain over services
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BehaviorModel {
    pub name: String,
    /// File the matrix of this model is written to
    pub filename: String,
    /// Arena of states, indexed by [`MarkovStateId`]
    #[serde(default)]
    pub states: Vec<MarkovState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<MarkovStateId>,
}

impl BehaviorModel {
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            states: Vec::new(),
            initial: None,
        }
    }

    /// Add a state for a service. The first state becomes initial.
    pub fn add_state(&mut self, service: ServiceId) -> MarkovStateId {
        let id = MarkovStateId(self.states.len());
        self.states.push(MarkovState {
            service,
            transitions: Vec::new(),
        });
        if self.initial.is_none() {
            self.initial = Some(id);
        }
        id
    }

    pub fn add_transition(&mut self, from: MarkovStateId, transition: MarkovTransition) -> ModelResult<()> {
        if let MarkovTarget::State(to) = transition.target {
            if self.state(to).is_none() {
                return Err(self.missing_state(to));
            }
        }
        let missing = self.missing_state(from);
        let state = self.states.get_mut(from.index()).ok_or(missing)?;
        state.transitions.push(transition);
        Ok(())
    }

    pub fn state(&self, id: MarkovStateId) -> Option<&MarkovState> {
        self.states.get(id.index())
    }

    pub fn initial_state(&self) -> Option<&MarkovState> {
        self.initial.and_then(|id| self.state(id))
    }

    /// The state modelling `service`, if the model visits it at all
    pub fn state_for_service(&self, service: &ServiceId) -> Option<&MarkovState> {
        self.states.iter().find(|s| &s.service == service)
    }

    /// The service a transition target stands for; `None` for exit
    pub fn target_service(&self, target: MarkovTarget) -> Option<&ServiceId> {
        match target {
            MarkovTarget::State(id) => self.state(id).map(|s| &s.service),
            MarkovTarget::Exit => None,
        }
    }

    /// Check the matrix file name, references, probability ranges and
    /// per-state probability sums
    pub fn validate(&self, services: &[Service]) -> ModelResult<()> {
        let filename = std::path::Path::new(&self.filename);
        let contained = !self.filename.is_empty()
            && filename
                .components()
                .all(|c| matches!(c, std::path::Component::Normal(_)));
        if !contained {
            return Err(ModelError::InvalidMatrixFilename {
                model: self.name.clone(),
                filename: self.filename.clone(),
            });
        }

        let initial = self.initial.ok_or_else(|| ModelError::NoMarkovInitialState {
            model: self.name.clone(),
        })?;
        if self.state(initial).is_none() {
            return Err(self.missing_state(initial));
        }

        for state in &self.states {
            if !services.iter().any(|s| s.id == state.service) {
                return Err(ModelError::UnknownMarkovService {
                    model: self.name.clone(),
                    service: state.service.clone(),
                });
            }

            let mut sum = 0.0;
            for transition in &state.transitions {
                if let MarkovTarget::State(to) = transition.target {
                    if self.state(to).is_none() {
                        return Err(self.missing_state(to));
                    }
                }
                let p = transition.probability;
                if !(0.0..=1.0).contains(&p) {
                    return Err(ModelError::InvalidProbability {
                        model: self.name.clone(),
                        probability: p,
                    });
                }
                sum += p;
            }
            if sum > 1.0 + PROBABILITY_EPSILON {
                return Err(ModelError::ProbabilityOverflow {
                    model: self.name.clone(),
                    service: state.service.clone(),
                    sum,
                });
            }
        }

        Ok(())
    }

    fn missing_state(&self, state: MarkovStateId) -> ModelError {
        ModelError::MarkovStateNotFound {
            model: self.name.clone(),
            state,
        }
    }
}

/// A state of a behavior model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarkovState {
    pub service: ServiceId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<MarkovTransition>,
}

/// A probability-weighted transition of a behavior model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkovTransition {
    pub probability: f64,
    pub target: MarkovTarget,
    pub think_time: ThinkTime,
}

impl MarkovTransition {
    pub fn to_state(target: MarkovStateId, probability: f64, think_time: ThinkTime) -> Self {
        Self {
            probability,
            target: MarkovTarget::State(target),
            think_time,
        }
    }

    pub fn to_exit(probability: f64, think_time: ThinkTime) -> Self {
        Self {
            probability,
            target: MarkovTarget::Exit,
            think_time,
        }
    }
}

/// Where a Markov transition leads
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TargetRepr<MarkovStateId>", into = "TargetRepr<MarkovStateId>")]
pub enum MarkovTarget {
    State(MarkovStateId),
    Exit,
}

target_repr!(MarkovTarget, MarkovStateId);

// ── Think Time ───────────────────────────────────────────────────────

/// Delay distribution applied before taking a transition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ThinkTime {
    /// Normally distributed, in milliseconds
    Normal { mean: f64, deviation: f64 },
    /// Uniformly distributed, in milliseconds
    Uniform { min: f64, max: f64 },
    /// A distribution only known to a custom formatter
    Extension { type_name: String },
}

impl ThinkTime {
    pub fn normal(mean: f64, deviation: f64) -> Self {
        Self::Normal { mean, deviation }
    }

    pub fn uniform(min: f64, max: f64) -> Self {
        Self::Uniform { min, max }
    }

    pub fn kind(&self) -> ThinkTimeKind {
        match self {
            Self::Normal { .. } => ThinkTimeKind::Normal,
            Self::Uniform { .. } => ThinkTimeKind::Uniform,
            Self::Extension { type_name } => ThinkTimeKind::Extension(type_name.clone()),
        }
    }
}

/// Discriminant of [`ThinkTime`], used as a formatter registry key
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThinkTimeKind {
    Normal,
    Uniform,
    Extension(String),
}

impl std::fmt::Display for ThinkTimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Uniform => write!(f, "uniform"),
            Self::Extension(name) => write!(f, "extension:{}", name),
        }
    }
}
