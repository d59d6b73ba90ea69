//! Recursive evaluation of an expression against an event, with optional memoization.

use crate::{
    ast::Node, config::Config, evaluation::EvaluationResult, events::Event, events::AttributeTable,
};

/// Counters tracking how much of an evaluation was served from the memo table, for callers that
/// want visibility without instrumenting the evaluator themselves.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Top-level `match` calls whose root node was already memoized.
    pub expressions_memoized: u64,
    /// Every node (leaf or compound) served from the memo table across all evaluations counted.
    pub sub_expressions_memoized: u64,
}

/// Evaluates `expression` against `event`.
///
/// Leaves over an attribute absent from the event return `false` when the attribute allows
/// `UNDEFINED`; an absent attribute that does not is a fatal caller-contract violation
/// ([`crate::predicates::Predicate::evaluate`] asserts this). `AND`/`OR` short-circuit
/// left-to-right, so the right side's attributes need not be defined once the left side decides
/// the outcome.
///
/// If `memo` is supplied, every node's `predicate_id` (already assigned by
/// [`Node::assign_pred_id`]) is consulted before evaluating: a hit returns the cached bit without
/// visiting the node's children again, a miss evaluates and records exactly one of pass/fail. This
/// bounds the cost of evaluating a rule set with shared subexpressions to one evaluation per
/// distinct predicate per event, regardless of how many compound expressions reference it.
pub fn matches(
    expression: &Node,
    event: &Event,
    attributes: &AttributeTable,
    config: &Config,
    now: i64,
    memo: Option<&mut EvaluationResult>,
    mut report: Option<&mut Report>,
) -> bool {
    match memo {
        Some(memo) => {
            let top_level_hit = memo.is_evaluated(expression.predicate_id().index());
            let result =
                evaluate_memoized(expression, event, attributes, config, now, memo, report.as_deref_mut());
            if top_level_hit {
                if let Some(report) = report.as_deref_mut() {
                    report.expressions_memoized += 1;
                }
            }
            result
        }
        None => evaluate(expression, event, attributes, config, now),
    }
}

fn evaluate(expression: &Node, event: &Event, attributes: &AttributeTable, config: &Config, now: i64) -> bool {
    match expression {
        Node::And(left, right, _) => {
            evaluate(left, event, attributes, config, now) && evaluate(right, event, attributes, config, now)
        }
        Node::Or(left, right, _) => {
            evaluate(left, event, attributes, config, now) || evaluate(right, event, attributes, config, now)
        }
        Node::Not(child, _) => !evaluate(child, event, attributes, config, now),
        Node::Value(predicate, _) => predicate.evaluate(event, attributes, config, now),
    }
}

fn evaluate_memoized(
    expression: &Node,
    event: &Event,
    attributes: &AttributeTable,
    config: &Config,
    now: i64,
    memo: &mut EvaluationResult,
    mut report: Option<&mut Report>,
) -> bool {
    let id = expression.predicate_id().index();
    if memo.is_evaluated(id) {
        if let Some(report) = report.as_deref_mut() {
            report.sub_expressions_memoized += 1;
        }
        tracing::trace!(predicate_id = id, "memo hit");
        return memo
            .get_result(id)
            .expect("evaluated predicate id always carries a result");
    }
    tracing::trace!(predicate_id = id, "memo miss");

    let result = match expression {
        Node::And(left, right, _) => {
            evaluate_memoized(left, event, attributes, config, now, memo, report.as_deref_mut())
                && evaluate_memoized(right, event, attributes, config, now, memo, report.as_deref_mut())
        }
        Node::Or(left, right, _) => {
            evaluate_memoized(left, event, attributes, config, now, memo, report.as_deref_mut())
                || evaluate_memoized(right, event, attributes, config, now, memo, report.as_deref_mut())
        }
        Node::Not(child, _) => !evaluate_memoized(child, event, attributes, config, now, memo, report.as_deref_mut()),
        Node::Value(predicate, _) => predicate.evaluate(event, attributes, config, now),
    };

    memo.set_result(id, Some(result));
    result
}
