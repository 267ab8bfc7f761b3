//! `SimulationReport` — a run's result annotated with fired insight rules.
//!
//! # Insight conditions
//!
//! | Condition          | Fires when                                                  |
//! |--------------------|-------------------------------------------------------------|
//! | `above_threshold`  | observed > threshold                                        |
//! | `below_target`     | observed < the metric's `target_value` (declared metrics), or < threshold (`<resource>_utilization`) |
//!
//! `observed` is the metric's headline number: the count, or the aggregated
//! value.

use serde::Serialize;

use pf_config::{InsightCondition, InsightRule, ValidatedConfig};
use pf_core::Tick;
use pf_sim::SimulationResult;

/// One insight rule that fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub metric:         String,
    pub condition:      InsightCondition,
    pub threshold:      f64,
    pub observed:       f64,
    pub recommendation: String,
}

/// Serialized as the result's own fields plus the configuration's narrative
/// fields and the fired `insights`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub title:            String,
    pub description:      String,
    pub business_context: String,
    #[serde(flatten)]
    pub result:           SimulationResult,
    pub insights:         Vec<Insight>,
}

impl SimulationReport {
    pub fn new(result: SimulationResult, config: &ValidatedConfig) -> Self {
        let insights = evaluate_insights(&result, config);
        Self {
            title:            config.title.clone(),
            description:      config.description.clone(),
            business_context: config.business_context.clone(),
            result,
            insights,
        }
    }

    #[inline]
    pub fn simulation_time(&self) -> Tick {
        self.result.simulation_time
    }
}

/// Every configured insight rule that fires against `result`, in rule order.
pub fn evaluate_insights(result: &SimulationResult, config: &ValidatedConfig) -> Vec<Insight> {
    config
        .insight_rules
        .iter()
        .filter_map(|rule| evaluate(rule, result, config))
        .collect()
}

fn evaluate(rule: &InsightRule, result: &SimulationResult, config: &ValidatedConfig) -> Option<Insight> {
    let Some(observed) = result.metric(&rule.metric).map(|m| m.value()) else {
        tracing::warn!(metric = %rule.metric, "insight rule names a metric absent from the result");
        return None;
    };

    let fired = match &rule.condition {
        InsightCondition::AboveThreshold => observed > rule.threshold,
        InsightCondition::BelowTarget => {
            let target = config.metric(&rule.metric).map_or(rule.threshold, |m| m.target_value);
            observed < target
        }
        InsightCondition::Other(_) => false,
    };
    if !fired {
        return None;
    }

    tracing::debug!(metric = %rule.metric, condition = %rule.condition, observed, "insight fired");
    Some(Insight {
        metric:         rule.metric.clone(),
        condition:      rule.condition.clone(),
        threshold:      rule.threshold,
        observed,
        recommendation: rule.recommendation.clone(),
    })
}
