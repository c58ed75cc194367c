//! Declarative cascade table.
//!
//! # Responsibilities
//! - Hold one rule per source endpoint: (range k, trigger value, target)
//! - Decide per invocation whether the source cascades
//!
//! # Design Decisions
//! - One uniform draw in `[0, k)` per decision, compared to the trigger
//! - The randomness source is a trait so decisions are testable with a script
//! - The default table is a cycle (root → … → trace-test → root) with no
//!   depth limit; `max_depth` in the dispatcher is the optional guard

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::routing::EndpointId;

/// Source of uniform draws for cascade decisions.
pub trait CascadeRng {
    /// Uniform integer in `[0, upper)`. `upper` is never zero.
    fn draw_below(&mut self, upper: u32) -> u32;
}

impl CascadeRng for rand::rngs::ThreadRng {
    fn draw_below(&mut self, upper: u32) -> u32 {
        self.gen_range(0..upper)
    }
}

impl CascadeRng for rand::rngs::StdRng {
    fn draw_below(&mut self, upper: u32) -> u32 {
        self.gen_range(0..upper)
    }
}

/// Errors in a cascade rule or table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CascadeError {
    #[error("range must be greater than 0")]
    EmptyRange,
    #[error("trigger {trigger} is outside the draw range [0, {range})")]
    TriggerOutOfRange { trigger: u32, range: u32 },
    #[error("'{0}' cannot cascade to itself")]
    SelfLoop(EndpointId),
    #[error("'{0}' never cascades")]
    NotCascading(EndpointId),
    #[error("duplicate rule for source '{0}'")]
    Duplicate(EndpointId),
}

/// One row of the cascade table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CascadeRule {
    /// Endpoint whose handler makes the decision.
    pub source: EndpointId,
    /// Size of the draw space.
    pub range: u32,
    /// Draw value that triggers the cascade.
    pub trigger: u32,
    /// Endpoint called when triggered.
    pub target: EndpointId,
}

impl CascadeRule {
    pub const fn new(source: EndpointId, range: u32, trigger: u32, target: EndpointId) -> Self {
        Self {
            source,
            range,
            trigger,
            target,
        }
    }

    /// The default demo graph: 1/2, 1/3, 1/4, 1/3, 1/5, 1/6 around the cycle.
    pub fn defaults() -> Vec<CascadeRule> {
        vec![
            CascadeRule::new(EndpointId::Root, 2, 1, EndpointId::Health),
            CascadeRule::new(EndpointId::Health, 3, 1, EndpointId::TestLogs),
            CascadeRule::new(EndpointId::TestLogs, 4, 1, EndpointId::LokiTest),
            CascadeRule::new(EndpointId::LokiTest, 3, 1, EndpointId::ForceLogs),
            CascadeRule::new(EndpointId::ForceLogs, 5, 1, EndpointId::TraceTest),
            CascadeRule::new(EndpointId::TraceTest, 6, 1, EndpointId::Root),
        ]
    }

    pub fn validate(&self) -> Result<(), CascadeError> {
        if self.range == 0 {
            return Err(CascadeError::EmptyRange);
        }
        if self.trigger >= self.range {
            return Err(CascadeError::TriggerOutOfRange {
                trigger: self.trigger,
                range: self.range,
            });
        }
        if self.source == self.target {
            return Err(CascadeError::SelfLoop(self.source));
        }
        // These handlers return before any cascade point.
        if matches!(self.source, EndpointId::Error | EndpointId::Metrics) {
            return Err(CascadeError::NotCascading(self.source));
        }
        Ok(())
    }

    /// Probability that this rule triggers on a single draw.
    pub fn probability(&self) -> f64 {
        1.0 / f64::from(self.range)
    }

    /// Draw once and report whether the cascade fires.
    pub fn fires<R: CascadeRng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.draw_below(self.range) == self.trigger
    }
}

/// Immutable lookup from source endpoint to its rule.
#[derive(Debug, Clone, Default)]
pub struct CascadeTable {
    rules: HashMap<EndpointId, CascadeRule>,
}

impl CascadeTable {
    pub fn new(rules: impl IntoIterator<Item = CascadeRule>) -> Result<Self, CascadeError> {
        let mut map = HashMap::new();
        for rule in rules {
            rule.validate()?;
            if map.insert(rule.source, rule).is_some() {
                return Err(CascadeError::Duplicate(rule.source));
            }
        }
        Ok(Self { rules: map })
    }

    /// A table with no rules: nothing ever cascades.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rule(&self, source: EndpointId) -> Option<&CascadeRule> {
        self.rules.get(&source)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Decide whether `source` cascades on this invocation.
    pub fn maybe_cascade<R: CascadeRng + ?Sized>(
        &self,
        source: EndpointId,
        rng: &mut R,
    ) -> Option<EndpointId> {
        let rule = self.rules.get(&source)?;
        rule.fires(rng).then_some(rule.target)
    }
}
