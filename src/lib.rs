//! A typed predicate-expression matching engine for real-time event filtering.
//!
//! This crate is the evaluation core of a BE-tree-style boolean expression index: given a rule
//! set of typed expressions built once over an [`events::AttributeTable`], and a stream of
//! [`events::Event`]s built many times against it, it answers whether a given expression matches
//! a given event. The tree/partitioning index that decides *which* expressions to even attempt
//! against an event, and the textual parser that produces expressions from rule text, are outer
//! collaborators; this crate only specifies their interfaces.
//!
//! # Examples
//!
//! ```
//! use predicate_matcher::{
//!     matches, AttributeDefinition, AttributeTable, ComparisonOperator, ComparisonValue, Config,
//!     EventBuilder, Node, Predicate, PredicateKind, StringInterner,
//! };
//!
//! let attributes = AttributeTable::new(&[
//!     AttributeDefinition::integer("age"),
//!     AttributeDefinition::string("country"),
//! ])
//! .unwrap();
//! let strings = StringInterner::new();
//!
//! let age_at_least_18 = Predicate::new(
//!     &attributes,
//!     "age",
//!     PredicateKind::Comparison(ComparisonOperator::GreaterThanEqual, ComparisonValue::Integer(18)),
//! )
//! .unwrap();
//! let expression = Node::value(age_at_least_18);
//!
//! let mut builder = EventBuilder::new(&attributes, &strings);
//! builder.with_integer("age", 25).unwrap();
//! builder.with_undefined("country").unwrap();
//! let event = builder.build().unwrap();
//!
//! let config = Config::default();
//! assert!(matches(&expression, &event, &attributes, &config, 0, None, None));
//! ```
//!
//! # Value model
//!
//! Attributes are typed scalars (`bool`, `integer`, `float`, `string`) or collections
//! (`integer_list`, `string_list`, `segments`, `frequency_caps`). Lists carry no ordering or
//! uniqueness guarantee. Attribute lookup in an event is three-valued: defined, allowed-undefined
//! (every leaf over it evaluates to `false`), or missing-and-disallowed (a fatal assertion, since
//! this can only happen if the rule set and the event disagree about what's required).
//!
//! # Build pipeline
//!
//! 1. Declare attributes ([`events::AttributeTable::new`]).
//! 2. Build [`predicates::Predicate`]s against that table ([`predicates::Predicate::new`]),
//!    resolving attribute names and, via [`strings::StringInterner`], string literals eagerly.
//! 3. Compose them into an [`ast::Node`] tree.
//! 4. Hash-cons the tree with a [`predicates::PredicateInterner`]
//!    ([`ast::Node::assign_pred_id`]), assigning every structurally-equal leaf and compound node a
//!    dense [`predicates::PredicateId`] (the domain of the memo bitsets in
//!    [`evaluation::EvaluationResult`]).
//!
//! # Query-time
//!
//! [`evaluator::matches`] evaluates a tree against an [`events::Event`], optionally memoized.
//! [`bound::bound`] derives the tightest interval an expression implies for a given attribute, the
//! primitive an outer index needs to decide which rules an event's value for that attribute can
//! skip.
mod ast;
mod bound;
mod config;
mod error;
mod evaluation;
mod evaluator;
mod events;
mod predicates;
mod strings;
#[cfg(test)]
mod test_utils;

pub use crate::{
    ast::{Node, TreeNode},
    bound::bound,
    config::{Config, FrequencyType},
    error::{BoundError, BuildError},
    evaluation::{memo_new, memo_reset, EvaluationResult},
    evaluator::{matches, Report},
    events::{
        AttributeDefinition, AttributeId, AttributeKind, AttributeTable, AttributeValue, Bounds,
        Event, EventBuilder, EventError, FrequencyCap, RawFrequencyCap, Segment,
    },
    predicates::{
        ComparisonOperator, ComparisonValue, EqualityOperator, ListLiteral, ListOperator,
        NullOperator, Predicate, PredicateId, PredicateInterner, PredicateKind, PrimitiveLiteral,
        RawPattern, SetLiteral, SetOperator, SpecialPredicate, StringOperator,
    },
    strings::{StringId, StringInterner},
};
