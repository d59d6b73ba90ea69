//! Bound derivation: computing the tightest interval of an attribute's domain that any event
//! satisfying an expression must lie within. This is what lets an outer index partition rules by
//! attribute without evaluating every expression against every event.

use crate::{
    ast::Node,
    config::Config,
    error::BoundError,
    events::{AttributeId, AttributeTable, Bounds},
    predicates::{ComparisonOperator, ComparisonValue, EqualityOperator, PredicateKind, PrimitiveLiteral},
};

/// Computes the tightest interval of `attribute`'s declared domain that any event satisfying
/// `expression` must lie within.
///
/// Only `Comparison`/`Equality` leaves over a bounded numeric domain narrow the result; `Set`,
/// `List`, `Special`, `Null` and `StringOp` leaves contribute nothing (they are not the kind of
/// predicate this derivation reasons about) and the traversal passes straight through them. `NOT`
/// flips the sense in which every leaf beneath it is read (implemented as a `reversed` flag
/// threaded down the recursion, rather than rewriting the tree). `AND` and `OR` recurse into both
/// children with the same flag and the same running bound: the result is a sound
/// over-approximation (a union across the whole expression) regardless of the boolean structure,
/// which is all an index needs to prune non-intersecting rules.
///
/// Requesting a bound for an attribute whose domain declares no bounds (lists, segments,
/// frequency caps, or an unbounded string) is a caller error.
pub fn bound(
    attributes: &AttributeTable,
    attribute: AttributeId,
    expression: &Node,
    config: &Config,
) -> Result<Bounds, BoundError> {
    let domain = attributes
        .bounds(attribute)
        .ok_or_else(|| BoundError::UnboundedDomain(attributes.name_of(attribute).to_string()))?;

    match domain {
        Bounds::Boolean => Ok(Bounds::Boolean),
        Bounds::String { min, max } => Ok(Bounds::String {
            min: *min,
            max: *max,
        }),
        Bounds::Integer { min, max } => {
            let (min, max) = (*min, *max);
            let mut touched = false;
            let mut lo = max;
            let mut hi = min;
            walk_integer(expression, attribute, false, min, max, &mut lo, &mut hi, &mut touched);
            if !touched {
                return Ok(Bounds::Integer { min, max });
            }
            Ok(Bounds::Integer { min: lo, max: hi })
        }
        Bounds::Float { min, max } => {
            let (min, max) = (*min, *max);
            let mut touched = false;
            let mut lo = max;
            let mut hi = min;
            walk_float(
                expression,
                attribute,
                false,
                min,
                max,
                config.bound_epsilon,
                &mut lo,
                &mut hi,
                &mut touched,
            );
            if !touched {
                return Ok(Bounds::Float { min, max });
            }
            Ok(Bounds::Float { min: lo, max: hi })
        }
    }
}

fn flip_comparison(operator: &ComparisonOperator, reversed: bool) -> ComparisonOperator {
    use ComparisonOperator::*;
    if !reversed {
        return operator.clone();
    }
    match operator {
        LessThan => GreaterThanEqual,
        LessThanEqual => GreaterThan,
        GreaterThan => LessThanEqual,
        GreaterThanEqual => LessThan,
    }
}

fn flip_equality(operator: &EqualityOperator, reversed: bool) -> EqualityOperator {
    if !reversed {
        return operator.clone();
    }
    match operator {
        EqualityOperator::Equal => EqualityOperator::NotEqual,
        EqualityOperator::NotEqual => EqualityOperator::Equal,
    }
}

fn integer_leaf_range(
    kind: &PredicateKind,
    reversed: bool,
    domain_min: i64,
    domain_max: i64,
) -> Option<(i64, i64)> {
    match kind {
        PredicateKind::Comparison(operator, ComparisonValue::Integer(literal)) => {
            let literal = *literal;
            Some(match flip_comparison(operator, reversed) {
                ComparisonOperator::LessThan => (domain_min, literal - 1),
                ComparisonOperator::LessThanEqual => (domain_min, literal),
                ComparisonOperator::GreaterThan => (literal + 1, domain_max),
                ComparisonOperator::GreaterThanEqual => (literal, domain_max),
            })
        }
        PredicateKind::Equality(operator, PrimitiveLiteral::Integer(literal)) => {
            let literal = *literal;
            Some(match flip_equality(operator, reversed) {
                EqualityOperator::Equal => (literal, literal),
                EqualityOperator::NotEqual => (domain_min, domain_max),
            })
        }
        _ => None,
    }
}

fn float_leaf_range(
    kind: &PredicateKind,
    reversed: bool,
    domain_min: f64,
    domain_max: f64,
    epsilon: f64,
) -> Option<(f64, f64)> {
    match kind {
        PredicateKind::Comparison(operator, ComparisonValue::Float(literal)) => {
            let literal = literal.0;
            Some(match flip_comparison(operator, reversed) {
                ComparisonOperator::LessThan => (domain_min, literal - epsilon),
                ComparisonOperator::LessThanEqual => (domain_min, literal),
                ComparisonOperator::GreaterThan => (literal + epsilon, domain_max),
                ComparisonOperator::GreaterThanEqual => (literal, domain_max),
            })
        }
        PredicateKind::Equality(operator, PrimitiveLiteral::Float(literal)) => {
            let literal = literal.0;
            Some(match flip_equality(operator, reversed) {
                EqualityOperator::Equal => (literal, literal),
                EqualityOperator::NotEqual => (domain_min, domain_max),
            })
        }
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_integer(
    node: &Node,
    attribute: AttributeId,
    reversed: bool,
    domain_min: i64,
    domain_max: i64,
    lo: &mut i64,
    hi: &mut i64,
    touched: &mut bool,
) {
    match node {
        Node::And(left, right, _) | Node::Or(left, right, _) => {
            walk_integer(left, attribute, reversed, domain_min, domain_max, lo, hi, touched);
            walk_integer(right, attribute, reversed, domain_min, domain_max, lo, hi, touched);
        }
        Node::Not(child, _) => {
            walk_integer(child, attribute, !reversed, domain_min, domain_max, lo, hi, touched);
        }
        Node::Value(predicate, _) => {
            if predicate.attribute() != attribute {
                return;
            }
            if let Some((leaf_lo, leaf_hi)) =
                integer_leaf_range(predicate.kind(), reversed, domain_min, domain_max)
            {
                *touched = true;
                *lo = (*lo).min(leaf_lo);
                *hi = (*hi).max(leaf_hi);
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn walk_float(
    node: &Node,
    attribute: AttributeId,
    reversed: bool,
    domain_min: f64,
    domain_max: f64,
    epsilon: f64,
    lo: &mut f64,
    hi: &mut f64,
    touched: &mut bool,
) {
    match node {
        Node::And(left, right, _) | Node::Or(left, right, _) => {
            walk_float(
                left, attribute, reversed, domain_min, domain_max, epsilon, lo, hi, touched,
            );
            walk_float(
                right, attribute, reversed, domain_min, domain_max, epsilon, lo, hi, touched,
            );
        }
        Node::Not(child, _) => {
            walk_float(
                child, attribute, !reversed, domain_min, domain_max, epsilon, lo, hi, touched,
            );
        }
        Node::Value(predicate, _) => {
            if predicate.attribute() != attribute {
                return;
            }
            if let Some((leaf_lo, leaf_hi)) =
                float_leaf_range(predicate.kind(), reversed, domain_min, domain_max, epsilon)
            {
                *touched = true;
                *lo = lo.min(leaf_lo);
                *hi = hi.max(leaf_hi);
            }
        }
    }
}
