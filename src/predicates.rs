use crate::{
    config::{Config, FrequencyType},
    error::BuildError,
    events::{AttributeId, AttributeKind, AttributeTable, AttributeValue, Event},
    strings::{StringId, StringInterner},
};
use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    ops::Not,
};

/// A dense id assigned to a structurally-equal leaf or compound predicate by
/// [`PredicateInterner`]. Stable for the lifetime of the rule set; the domain of the memoization
/// bitsets in [`crate::evaluation::EvaluationResult`].
#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Debug, Hash)]
pub struct PredicateId(usize);

impl PredicateId {
    /// Placeholder carried by a node before `assign_pred_id` has run. Reading it (e.g. indexing
    /// into a memo bitset) before resolution is a caller-contract violation.
    pub const UNRESOLVED: PredicateId = PredicateId(usize::MAX);

    #[inline]
    pub fn index(self) -> usize {
        debug_assert!(self != Self::UNRESOLVED, "predicate id was never resolved");
        self.0
    }
}

impl Display for PredicateId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "predicate({})", self.0)
    }
}

/// Structural hash-cons of leaf and compound predicates: `assign_pred_id` walks an expression and
/// every node either joins an existing id (structurally equal to one already seen) or is given a
/// fresh dense one. Ids form a single counter shared by leaves and compound boolean nodes so they
/// can size one memo bitset ([`PredicateInterner::predicate_count`]).
#[derive(Debug, Default)]
pub struct PredicateInterner {
    leaves: HashMap<Predicate, PredicateId>,
    compounds: HashMap<CompoundKey, PredicateId>,
    counter: usize,
}

#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
enum CompoundKey {
    And(PredicateId, PredicateId),
    Or(PredicateId, PredicateId),
    Not(PredicateId),
}

impl PredicateInterner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern_leaf(&mut self, predicate: Predicate) -> PredicateId {
        if let Some(id) = self.leaves.get(&predicate) {
            return *id;
        }
        let id = self.next_id();
        tracing::debug!(predicate = %predicate, id = %id, "interned new leaf predicate");
        self.leaves.insert(predicate, id);
        id
    }

    fn intern_compound(&mut self, key: CompoundKey) -> PredicateId {
        if let Some(id) = self.compounds.get(&key) {
            return *id;
        }
        let id = self.next_id();
        self.compounds.insert(key, id);
        id
    }

    pub fn intern_and(&mut self, left: PredicateId, right: PredicateId) -> PredicateId {
        self.intern_compound(CompoundKey::And(left, right))
    }

    pub fn intern_or(&mut self, left: PredicateId, right: PredicateId) -> PredicateId {
        self.intern_compound(CompoundKey::Or(left, right))
    }

    pub fn intern_not(&mut self, child: PredicateId) -> PredicateId {
        self.intern_compound(CompoundKey::Not(child))
    }

    /// Number of distinct predicate ids assigned so far; sizes a [`crate::evaluation::EvaluationResult`].
    pub fn predicate_count(&self) -> usize {
        self.counter
    }

    fn next_id(&mut self) -> PredicateId {
        let id = PredicateId(self.counter);
        self.counter += 1;
        id
    }
}

#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Predicate {
    attribute: AttributeId,
    kind: PredicateKind,
}

impl Predicate {
    pub fn new(
        attributes: &AttributeTable,
        name: &str,
        kind: PredicateKind,
    ) -> Result<Self, BuildError> {
        let id = attributes.resolve(name)?;
        validate_predicate(name, &kind, &attributes.kind_of(id))?;
        Ok(Predicate { attribute: id, kind })
    }

    /// Construct a predicate bound to an already-resolved attribute, bypassing name lookup. Used
    /// for the implicit `frequency_caps`/`segments_with_timestamp`/geo attributes that special
    /// predicates bind to regardless of what the caller named them.
    fn bound(attribute: AttributeId, kind: PredicateKind) -> Self {
        Predicate { attribute, kind }
    }

    /// Builds a frequency-cap predicate (§4.7). Bound to the `frequency_caps`-kind attribute
    /// regardless of what `attributes` calls it, per the implicit-attribute binding special
    /// predicates use; `namespace` is interned under that attribute's string scope, extending the
    /// dictionary if it is not already known.
    pub fn frequency_cap(
        attributes: &AttributeTable,
        strings: &mut StringInterner,
        freq_type: FrequencyType,
        id: i64,
        namespace: &str,
        value: u32,
        length_seconds: i64,
    ) -> Result<Self, BuildError> {
        let frequency_caps_attr =
            Self::implicit_attribute(attributes, "frequency_caps", AttributeKind::FrequencyCaps)?;
        let namespace = strings.get_or_update(frequency_caps_attr, namespace);
        Ok(Self::bound(
            frequency_caps_attr,
            PredicateKind::Special(SpecialPredicate::FrequencyCap {
                frequency_caps_attr,
                freq_type,
                id,
                namespace,
                value,
                length_seconds,
            }),
        ))
    }

    /// Builds a `segment WITHIN` predicate (§4.7). `attribute_name` selects the `segments`-kind
    /// attribute to read; `None` defaults to the implicit `segments_with_timestamp` attribute the
    /// spec names.
    pub fn segment_within(
        attributes: &AttributeTable,
        attribute_name: Option<&str>,
        segment_id: i64,
        after_seconds: i64,
    ) -> Result<Self, BuildError> {
        let segments_attr = Self::implicit_attribute(
            attributes,
            attribute_name.unwrap_or("segments_with_timestamp"),
            AttributeKind::Segments,
        )?;
        Ok(Self::bound(
            segments_attr,
            PredicateKind::Special(SpecialPredicate::SegmentWithin {
                segments_attr,
                segment_id,
                after_seconds,
            }),
        ))
    }

    /// Builds a `segment BEFORE` predicate (§4.7). See [`Self::segment_within`] for `attribute_name`.
    pub fn segment_before(
        attributes: &AttributeTable,
        attribute_name: Option<&str>,
        segment_id: i64,
        before_seconds: i64,
    ) -> Result<Self, BuildError> {
        let segments_attr = Self::implicit_attribute(
            attributes,
            attribute_name.unwrap_or("segments_with_timestamp"),
            AttributeKind::Segments,
        )?;
        Ok(Self::bound(
            segments_attr,
            PredicateKind::Special(SpecialPredicate::SegmentBefore {
                segments_attr,
                segment_id,
                before_seconds,
            }),
        ))
    }

    /// Builds a geo within-radius predicate (§4.7), reading the implicit `latitude`/`longitude`
    /// attributes regardless of what the caller names the rest of the registry.
    pub fn geo_within_radius(
        attributes: &AttributeTable,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Self, BuildError> {
        let latitude_attr = Self::implicit_attribute(attributes, "latitude", AttributeKind::Float)?;
        let longitude_attr = Self::implicit_attribute(attributes, "longitude", AttributeKind::Float)?;
        Ok(Self::bound(
            latitude_attr,
            PredicateKind::Special(SpecialPredicate::GeoWithinRadius {
                latitude_attr,
                longitude_attr,
                latitude: FloatBits(latitude),
                longitude: FloatBits(longitude),
                radius_km: FloatBits(radius_km),
            }),
        ))
    }

    fn implicit_attribute(
        attributes: &AttributeTable,
        name: &str,
        expected: AttributeKind,
    ) -> Result<AttributeId, BuildError> {
        let id = attributes.resolve(name)?;
        let actual = attributes.kind_of(id);
        if actual != expected {
            return Err(BuildError::MismatchingKind {
                name: name.to_string(),
                expected,
                actual,
            });
        }
        Ok(id)
    }

    #[inline]
    pub fn attribute(&self) -> AttributeId {
        self.attribute
    }

    #[inline]
    pub fn kind(&self) -> &PredicateKind {
        &self.kind
    }

    pub fn evaluate(&self, event: &Event, attributes: &AttributeTable, config: &Config, now: i64) -> bool {
        if let PredicateKind::Special(special) = &self.kind {
            return special.evaluate(event, now, config);
        }
        if let PredicateKind::Null(operator) = &self.kind {
            return operator.evaluate(&event[self.attribute]);
        }

        let value = &event[self.attribute];
        if let AttributeValue::Undefined = value {
            assert!(
                attributes.allow_undefined(self.attribute),
                "{} is required but missing from the event",
                attributes.name_of(self.attribute)
            );
            return false;
        }

        match (&self.kind, value) {
            (PredicateKind::Variable, AttributeValue::Boolean(value)) => *value,
            (PredicateKind::NegatedVariable, AttributeValue::Boolean(value)) => !*value,
            (PredicateKind::Set(operator, haystack), needle) => operator.evaluate(haystack, needle),
            (PredicateKind::Comparison(operator, a), b) => operator.evaluate(a, b, config),
            (PredicateKind::Equality(operator, a), b) => operator.evaluate(a, b, config),
            (PredicateKind::List(operator, a), b) => operator.evaluate(a, b),
            (PredicateKind::StringOp(operator, pattern), AttributeValue::String(_, text)) => {
                operator.evaluate(text, &pattern.0)
            }
            (kind, value) => {
                unreachable!("invalid predicate/value pairing: {kind:?} with {value:?}")
            }
        }
    }
}

impl Not for Predicate {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self {
            attribute: self.attribute,
            kind: !self.kind,
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        write!(formatter, "⟨{}, {}⟩", self.attribute, self.kind)
    }
}

fn validate_predicate(
    name: &str,
    kind: &PredicateKind,
    attribute_kind: &AttributeKind,
) -> Result<(), BuildError> {
    let ok = matches!(
        (kind, attribute_kind),
        (PredicateKind::Set(_, SetLiteral::StringList(_)), AttributeKind::String)
            | (PredicateKind::Set(_, SetLiteral::IntegerList(_)), AttributeKind::Integer)
            | (PredicateKind::Set(_, SetLiteral::String(_)), AttributeKind::StringList)
            | (PredicateKind::Set(_, SetLiteral::Integer(_)), AttributeKind::IntegerList)
            | (PredicateKind::Comparison(_, ComparisonValue::Integer(_)), AttributeKind::Integer)
            | (PredicateKind::Comparison(_, ComparisonValue::Float(_)), AttributeKind::Float)
            | (PredicateKind::Equality(_, PrimitiveLiteral::Integer(_)), AttributeKind::Integer)
            | (PredicateKind::Equality(_, PrimitiveLiteral::Float(_)), AttributeKind::Float)
            | (PredicateKind::Equality(_, PrimitiveLiteral::String(_)), AttributeKind::String)
            | (PredicateKind::List(_, ListLiteral::IntegerList(_)), AttributeKind::IntegerList)
            | (PredicateKind::List(_, ListLiteral::StringList(_)), AttributeKind::StringList)
            | (PredicateKind::Variable, AttributeKind::Boolean)
            | (PredicateKind::NegatedVariable, AttributeKind::Boolean)
            | (PredicateKind::StringOp(_, _), AttributeKind::String)
            | (
                PredicateKind::Null(NullOperator::IsEmpty | NullOperator::IsNotEmpty),
                AttributeKind::StringList | AttributeKind::IntegerList
            )
            | (
                PredicateKind::Null(NullOperator::IsNull | NullOperator::IsNotNull),
                AttributeKind::Integer
                    | AttributeKind::Float
                    | AttributeKind::String
                    | AttributeKind::Boolean
            )
    );
    if ok {
        return Ok(());
    }
    Err(BuildError::MismatchingKind {
        name: name.to_string(),
        expected: attribute_kind.clone(),
        actual: kind.attribute_kind_hint(),
    })
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum PredicateKind {
    Variable,
    NegatedVariable,
    Set(SetOperator, SetLiteral),
    Comparison(ComparisonOperator, ComparisonValue),
    Equality(EqualityOperator, PrimitiveLiteral),
    List(ListOperator, ListLiteral),
    Null(NullOperator),
    StringOp(StringOperator, RawPattern),
    Special(SpecialPredicate),
}

impl PredicateKind {
    /// Best-effort attribute kind this predicate kind is expected to be evaluated against, used
    /// only to build a useful [`BuildError::MismatchingKind`] diagnostic.
    fn attribute_kind_hint(&self) -> AttributeKind {
        match self {
            Self::Variable | Self::NegatedVariable => AttributeKind::Boolean,
            Self::Set(_, SetLiteral::StringList(_)) => AttributeKind::String,
            Self::Set(_, SetLiteral::IntegerList(_)) => AttributeKind::Integer,
            Self::Set(_, SetLiteral::String(_)) => AttributeKind::StringList,
            Self::Set(_, SetLiteral::Integer(_)) => AttributeKind::IntegerList,
            Self::Comparison(_, ComparisonValue::Integer(_)) => AttributeKind::Integer,
            Self::Comparison(_, ComparisonValue::Float(_)) => AttributeKind::Float,
            Self::Equality(_, PrimitiveLiteral::Integer(_)) => AttributeKind::Integer,
            Self::Equality(_, PrimitiveLiteral::Float(_)) => AttributeKind::Float,
            Self::Equality(_, PrimitiveLiteral::String(_)) => AttributeKind::String,
            Self::List(_, ListLiteral::IntegerList(_)) => AttributeKind::IntegerList,
            Self::List(_, ListLiteral::StringList(_)) => AttributeKind::StringList,
            Self::StringOp(_, _) => AttributeKind::String,
            Self::Null(_) => AttributeKind::Boolean,
            Self::Special(_) => AttributeKind::FrequencyCaps,
        }
    }
}

impl Not for PredicateKind {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Set(SetOperator::In, value) => Self::Set(SetOperator::NotIn, value),
            Self::Set(SetOperator::NotIn, value) => Self::Set(SetOperator::In, value),
            Self::Comparison(ComparisonOperator::LessThan, value) => {
                Self::Comparison(ComparisonOperator::GreaterThanEqual, value)
            }
            Self::Comparison(ComparisonOperator::LessThanEqual, value) => {
                Self::Comparison(ComparisonOperator::GreaterThan, value)
            }
            Self::Comparison(ComparisonOperator::GreaterThan, value) => {
                Self::Comparison(ComparisonOperator::LessThanEqual, value)
            }
            Self::Comparison(ComparisonOperator::GreaterThanEqual, value) => {
                Self::Comparison(ComparisonOperator::LessThan, value)
            }
            Self::Null(NullOperator::IsNull) => Self::Null(NullOperator::IsNotNull),
            Self::Null(NullOperator::IsNotNull) => Self::Null(NullOperator::IsNull),
            Self::Null(NullOperator::IsEmpty) => Self::Null(NullOperator::IsNotEmpty),
            Self::Null(NullOperator::IsNotEmpty) => Self::Null(NullOperator::IsEmpty),
            Self::Equality(EqualityOperator::Equal, value) => {
                Self::Equality(EqualityOperator::NotEqual, value)
            }
            Self::Equality(EqualityOperator::NotEqual, value) => {
                Self::Equality(EqualityOperator::Equal, value)
            }
            Self::List(ListOperator::OneOf, value) => Self::List(ListOperator::NoneOf, value),
            Self::List(ListOperator::AllOf, value) => Self::List(ListOperator::NotAllOf, value),
            Self::List(ListOperator::NotAllOf, value) => Self::List(ListOperator::AllOf, value),
            Self::List(ListOperator::NoneOf, value) => Self::List(ListOperator::OneOf, value),
            Self::Variable => Self::NegatedVariable,
            Self::NegatedVariable => Self::Variable,
            // Special predicates and raw string ops have no algebraic negation available to the
            // interner; `Not` wraps them at the AST level instead.
            other @ (Self::StringOp(_, _) | Self::Special(_)) => other,
        }
    }
}

impl Display for PredicateKind {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Variable => write!(formatter, "id, variable"),
            Self::NegatedVariable => write!(formatter, "not, variable"),
            Self::Set(operator, values) => write!(formatter, "{operator}, {values}"),
            Self::Comparison(operator, values) => write!(formatter, "{operator}, {values}"),
            Self::List(operator, values) => write!(formatter, "{operator}, {values}"),
            Self::Null(operator) => write!(formatter, "{operator}, variable"),
            Self::Equality(operator, values) => write!(formatter, "{operator}, {values}"),
            Self::StringOp(operator, pattern) => write!(formatter, "{operator}, {pattern:?}"),
            Self::Special(special) => write!(formatter, "{special:?}"),
        }
    }
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum SetOperator {
    NotIn,
    In,
}

/// Either side of a `Set` predicate may be the variable: a scalar attribute tested against a
/// literal list (`country in ["US", "CA"]`) or a list attribute tested against a literal scalar
/// (`5 in segment_ids`). Exactly one of the two shapes below is built for a given predicate,
/// matching whichever side the parser resolved as the variable.
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum SetLiteral {
    IntegerList(Vec<i64>),
    StringList(Vec<StringId>),
    Integer(i64),
    String(StringId),
}

impl Display for SetLiteral {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::IntegerList(values) => write!(formatter, "{values:?}"),
            Self::StringList(values) => write!(formatter, "{values:?}"),
            Self::Integer(value) => write!(formatter, "{value}"),
            Self::String(value) => write!(formatter, "{value:?}"),
        }
    }
}

impl SetOperator {
    /// Membership is a plain linear scan: the value model makes no sortedness or uniqueness
    /// guarantee about either a literal list or an event's list-valued attribute.
    fn evaluate(&self, literal: &SetLiteral, value: &AttributeValue) -> bool {
        let found = match (literal, value) {
            (SetLiteral::IntegerList(list), AttributeValue::Integer(needle)) => {
                list.contains(needle)
            }
            (SetLiteral::StringList(list), AttributeValue::String(needle, _)) => {
                list.contains(needle)
            }
            (SetLiteral::Integer(needle), AttributeValue::IntegerList(list)) => {
                list.contains(needle)
            }
            (SetLiteral::String(needle), AttributeValue::StringList(list)) => {
                list.contains(needle)
            }
            (a, b) => {
                unreachable!("set operation ({self:?}) between {a:?} and {b:?} is a bug")
            }
        };
        match self {
            Self::In => found,
            Self::NotIn => !found,
        }
    }
}

impl Display for SetOperator {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::In => write!(formatter, "in"),
            Self::NotIn => write!(formatter, "not in"),
        }
    }
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum ComparisonOperator {
    LessThan,
    LessThanEqual,
    GreaterThanEqual,
    GreaterThan,
}

impl ComparisonOperator {
    fn evaluate(&self, literal: &ComparisonValue, value: &AttributeValue, config: &Config) -> bool {
        match (literal, value) {
            (ComparisonValue::Float(literal), AttributeValue::Float(value)) => {
                self.apply_float(*value, literal.0, config)
            }
            (ComparisonValue::Integer(literal), AttributeValue::Integer(value)) => {
                self.apply(value, literal)
            }
            (a, b) => {
                unreachable!("comparison ({self:?}) between {a:?} and {b:?} is a bug")
            }
        }
    }

    fn apply<T: PartialOrd>(&self, a: &T, b: &T) -> bool {
        match self {
            Self::LessThan => *a < *b,
            Self::LessThanEqual => *a <= *b,
            Self::GreaterThan => *a > *b,
            Self::GreaterThanEqual => *a >= *b,
        }
    }

    fn apply_float(&self, a: f64, b: f64, config: &Config) -> bool {
        match self {
            Self::LessThan => a < b && config.fne(a, b),
            Self::LessThanEqual => a < b || config.feq(a, b),
            Self::GreaterThan => a > b && config.fne(a, b),
            Self::GreaterThanEqual => a > b || config.feq(a, b),
        }
    }
}

impl Display for ComparisonOperator {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::GreaterThanEqual => write!(formatter, ">="),
            Self::GreaterThan => write!(formatter, ">"),
            Self::LessThan => write!(formatter, "<"),
            Self::LessThanEqual => write!(formatter, "<="),
        }
    }
}

/// A float newtype whose `Eq`/`Hash` use exact bit equality (`to_bits`), never epsilon tolerance.
/// Hash-consing (`PredicateInterner`) needs a genuine equivalence relation; `feq` is not
/// transitive and would let predicates alias. Evaluation-time numeric comparisons use
/// [`Config::feq`]/[`Config::fne`] against the raw `f64`, never this wrapper's equality.
#[derive(Clone, Copy, Debug)]
pub struct FloatBits(pub f64);

impl PartialEq for FloatBits {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatBits {}

impl std::hash::Hash for FloatBits {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Display for FloatBits {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum ComparisonValue {
    Integer(i64),
    Float(FloatBits),
}

impl ComparisonValue {
    pub fn float(value: f64) -> Self {
        Self::Float(FloatBits(value))
    }
}

impl Display for ComparisonValue {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(formatter, "{value}"),
            Self::Float(value) => write!(formatter, "{value}"),
        }
    }
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum EqualityOperator {
    Equal,
    NotEqual,
}

impl EqualityOperator {
    fn evaluate(&self, literal: &PrimitiveLiteral, value: &AttributeValue, config: &Config) -> bool {
        match (literal, value) {
            (PrimitiveLiteral::Float(literal), AttributeValue::Float(value)) => {
                let equal = config.feq(*value, literal.0);
                matches!(self, Self::Equal) == equal
            }
            (PrimitiveLiteral::Integer(literal), AttributeValue::Integer(value)) => {
                self.apply(value, literal)
            }
            (PrimitiveLiteral::String(literal), AttributeValue::String(value, _)) => {
                self.apply(value, literal)
            }
            (a, b) => {
                unreachable!("equality ({self:?}) between {a:?} and {b:?} is a bug")
            }
        }
    }

    fn apply<T: PartialEq>(&self, a: &T, b: &T) -> bool {
        match self {
            Self::Equal => *a == *b,
            Self::NotEqual => *a != *b,
        }
    }
}

impl Display for EqualityOperator {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Equal => write!(formatter, "="),
            Self::NotEqual => write!(formatter, "<>"),
        }
    }
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ListOperator {
    OneOf,
    NoneOf,
    AllOf,
    // Internal only, kept for symmetry with `all_of` under negation.
    NotAllOf,
}

impl ListOperator {
    fn evaluate(&self, a: &ListLiteral, b: &AttributeValue) -> bool {
        match (a, b) {
            (ListLiteral::StringList(right), AttributeValue::StringList(left)) => {
                self.apply(left, right)
            }
            (ListLiteral::IntegerList(right), AttributeValue::IntegerList(left)) => {
                self.apply(left, right)
            }
            (a, b) => {
                unreachable!("list operation ({self:?}) between {a:?} and {b:?} is a bug")
            }
        }
    }

    /// `event` is the event's list-kind attribute value; `literal` is the list written in the
    /// predicate. Event lists carry no ordering or uniqueness guarantee, so membership is always
    /// tested via a set, never via a sorted-merge.
    fn apply<T: Eq + std::hash::Hash>(&self, event: &[T], literal: &[T]) -> bool {
        match self {
            Self::OneOf => one_of(event, literal),
            Self::NoneOf => none_of(event, literal),
            Self::AllOf => all_of(event, literal),
            Self::NotAllOf => not_all_of(event, literal),
        }
    }
}

impl Display for ListOperator {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::AllOf => write!(formatter, "all of"),
            Self::OneOf => write!(formatter, "one of"),
            Self::NoneOf => write!(formatter, "none of"),
            Self::NotAllOf => write!(formatter, "not all of"),
        }
    }
}

#[inline]
fn none_of<T: Eq + std::hash::Hash>(event: &[T], literal: &[T]) -> bool {
    !one_of(event, literal)
}

/// True if at least one element of `literal` occurs (possibly more than once) in `event`.
fn one_of<T: Eq + std::hash::Hash>(event: &[T], literal: &[T]) -> bool {
    if event.is_empty() || literal.is_empty() {
        return false;
    }

    let event: std::collections::HashSet<&T> = event.iter().collect();
    literal.iter().any(|item| event.contains(item))
}

#[inline]
fn not_all_of<T: Eq + std::hash::Hash>(event: &[T], literal: &[T]) -> bool {
    !all_of(event, literal)
}

/// True if every element of `literal` occurs in `event`: the literal is a subset of the event's
/// list, not the other way around.
fn all_of<T: Eq + std::hash::Hash>(event: &[T], literal: &[T]) -> bool {
    if literal.is_empty() {
        return true;
    }
    if literal.len() > event.len() {
        return false;
    }

    let event: std::collections::HashSet<&T> = event.iter().collect();
    literal.iter().all(|item| event.contains(item))
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum NullOperator {
    IsNull,
    IsNotNull,
    IsEmpty,
    IsNotEmpty,
}

impl NullOperator {
    fn evaluate(&self, value: &AttributeValue) -> bool {
        match (self, value) {
            (Self::IsNull, AttributeValue::Undefined) => true,
            (Self::IsNull, _) => false,
            (Self::IsNotNull, AttributeValue::Undefined) => false,
            (Self::IsNotNull, _) => true,
            (Self::IsEmpty, AttributeValue::StringList(list)) => list.is_empty(),
            (Self::IsEmpty, AttributeValue::IntegerList(list)) => list.is_empty(),
            (Self::IsNotEmpty, AttributeValue::StringList(list)) => !list.is_empty(),
            (Self::IsNotEmpty, AttributeValue::IntegerList(list)) => !list.is_empty(),
            (_, value) => {
                unreachable!("null check ({self:?}) for {value:?} is a bug")
            }
        }
    }
}

impl Display for NullOperator {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::IsNull => write!(formatter, "is null"),
            Self::IsNotNull => write!(formatter, "is not null"),
            Self::IsEmpty => write!(formatter, "is empty"),
            Self::IsNotEmpty => write!(formatter, "is not empty"),
        }
    }
}

/// Operates on an event's raw string text rather than interned ids: substring containment and
/// prefix/suffix checks are not meaningfully reducible to integer compares.
#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub enum StringOperator {
    Contains,
    StartsWith,
    EndsWith,
}

impl StringOperator {
    fn evaluate(&self, haystack: &str, pattern: &str) -> bool {
        match self {
            Self::Contains => haystack.contains(pattern),
            Self::StartsWith => haystack.starts_with(pattern),
            Self::EndsWith => haystack.ends_with(pattern),
        }
    }
}

impl Display for StringOperator {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Contains => write!(formatter, "contains"),
            Self::StartsWith => write!(formatter, "starts with"),
            Self::EndsWith => write!(formatter, "ends with"),
        }
    }
}

/// The raw text a [`StringOperator`] matches against. String predicates compare text directly
/// (not via the string interner), so the pattern is carried verbatim rather than resolved to a
/// [`StringId`].
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub struct RawPattern(pub String);

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum ListLiteral {
    IntegerList(Vec<i64>),
    StringList(Vec<StringId>),
}

impl Display for ListLiteral {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::IntegerList(values) => write!(formatter, "{values:?}"),
            Self::StringList(values) => write!(formatter, "{values:?}"),
        }
    }
}

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum PrimitiveLiteral {
    Integer(i64),
    Float(FloatBits),
    String(StringId),
}

impl PrimitiveLiteral {
    pub fn float(value: f64) -> Self {
        Self::Float(FloatBits(value))
    }
}

impl Display for PrimitiveLiteral {
    fn fmt(&self, formatter: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Integer(values) => write!(formatter, "{values}"),
            Self::Float(values) => write!(formatter, "{values}"),
            Self::String(values) => write!(formatter, "{values:?}"),
        }
    }
}

/// The three domain-specific predicates (frequency cap, segment before/within, geo radius). Each
/// binds implicit attributes (`frequency_caps`, `segments_with_timestamp`, `latitude`/`longitude`)
/// regardless of what the caller's attribute registry names them, and each is relative to a
/// caller-supplied `now` rather than a build-time constant.
#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum SpecialPredicate {
    FrequencyCap {
        frequency_caps_attr: AttributeId,
        freq_type: FrequencyType,
        id: i64,
        namespace: StringId,
        value: u32,
        length_seconds: i64,
    },
    SegmentWithin {
        segments_attr: AttributeId,
        segment_id: i64,
        after_seconds: i64,
    },
    SegmentBefore {
        segments_attr: AttributeId,
        segment_id: i64,
        before_seconds: i64,
    },
    GeoWithinRadius {
        latitude_attr: AttributeId,
        longitude_attr: AttributeId,
        latitude: FloatBits,
        longitude: FloatBits,
        radius_km: FloatBits,
    },
}

impl SpecialPredicate {
    fn evaluate(&self, event: &Event, now: i64, config: &Config) -> bool {
        match self {
            Self::FrequencyCap {
                frequency_caps_attr,
                freq_type,
                id,
                namespace,
                value,
                length_seconds,
            } => match &event[*frequency_caps_attr] {
                AttributeValue::FrequencyCaps(caps) => within_frequency_caps(
                    caps, *freq_type, *id, *namespace, *value, *length_seconds, now,
                ),
                AttributeValue::Undefined => true,
                other => unreachable!("frequency cap attribute holds {other:?}"),
            },
            Self::SegmentWithin {
                segments_attr,
                segment_id,
                after_seconds,
            } => match &event[*segments_attr] {
                AttributeValue::Segments(segments) => {
                    segment_within(*segment_id, *after_seconds, segments, now)
                }
                AttributeValue::Undefined => false,
                other => unreachable!("segments attribute holds {other:?}"),
            },
            Self::SegmentBefore {
                segments_attr,
                segment_id,
                before_seconds,
            } => match &event[*segments_attr] {
                AttributeValue::Segments(segments) => {
                    segment_before(*segment_id, *before_seconds, segments, now)
                }
                AttributeValue::Undefined => false,
                other => unreachable!("segments attribute holds {other:?}"),
            },
            Self::GeoWithinRadius {
                latitude_attr,
                longitude_attr,
                latitude,
                longitude,
                radius_km,
            } => {
                match (&event[*latitude_attr], &event[*longitude_attr]) {
                    (AttributeValue::Float(event_lat), AttributeValue::Float(event_lon)) => {
                        geo_within_radius(
                            latitude.0,
                            longitude.0,
                            *event_lat,
                            *event_lon,
                            radius_km.0,
                            config.earth_radius_km,
                        )
                    }
                    (AttributeValue::Undefined, _) | (_, AttributeValue::Undefined) => false,
                    other => unreachable!("geo attributes hold {other:?}"),
                }
            }
        }
    }
}

/// §4.7: a rule passes unless a matching cap entry exists, is still within its window, and the
/// rule's requested `value` would exceed it.
pub fn within_frequency_caps(
    caps: &[crate::events::FrequencyCap],
    freq_type: FrequencyType,
    id: i64,
    namespace: StringId,
    value: u32,
    length_seconds: i64,
    now: i64,
) -> bool {
    let matched = caps
        .iter()
        .find(|cap| cap.freq_type == freq_type && cap.id == id && cap.namespace == namespace);

    let Some(cap) = matched else {
        return true;
    };

    if length_seconds <= 0 {
        return value > cap.value;
    }

    let Some(timestamp_micros) = cap.timestamp_micros else {
        return true;
    };

    if now - (timestamp_micros / 1_000_000) > length_seconds {
        return true;
    }

    value > cap.value
}

/// §4.7: segments are sorted by id ascending; a linear scan stops as soon as it passes the id.
pub fn segment_within(
    segment_id: i64,
    after_seconds: i64,
    segments: &[crate::events::Segment],
    now: i64,
) -> bool {
    for segment in segments {
        if segment.segment_id == segment_id {
            return (now - after_seconds) <= (segment.timestamp_micros / 1_000_000);
        }
        if segment.segment_id > segment_id {
            break;
        }
    }
    false
}

pub fn segment_before(
    segment_id: i64,
    before_seconds: i64,
    segments: &[crate::events::Segment],
    now: i64,
) -> bool {
    for segment in segments {
        if segment.segment_id == segment_id {
            return (now - before_seconds) > (segment.timestamp_micros / 1_000_000);
        }
        if segment.segment_id > segment_id {
            break;
        }
    }
    false
}

/// §4.7: great-circle distance via the chord-to-arc conversion, `R = 6372.8` km by default.
pub fn geo_within_radius(
    rule_lat: f64,
    rule_lon: f64,
    event_lat: f64,
    event_lon: f64,
    radius_km: f64,
    earth_radius_km: f64,
) -> bool {
    let dlon = (rule_lon - event_lon).to_radians();
    let lat1 = rule_lat.to_radians();
    let lat2 = event_lat.to_radians();
    let dz = lat1.sin() - lat2.sin();
    let dx = dlon.cos() * lat1.cos() - lat2.cos();
    let dy = dlon.sin() * lat1.cos();
    let chord = (dx * dx + dy * dy + dz * dz).sqrt() / 2.0;
    let distance = 2.0 * earth_radius_km * chord.asin();
    distance <= radius_km
}
