use crate::{
    config::FrequencyType,
    error::BuildError,
    strings::{StringId, StringInterner},
};
use std::{
    collections::HashMap,
    fmt::{Display, Formatter},
    ops::Index,
};
use thiserror::Error;

#[derive(Error, PartialEq, Debug)]
pub enum EventError {
    #[error("ABE refers to non-existing attribute '{0:?}'")]
    NonExistingAttribute(String),
    #[error("{name:?}: wrong types => expected: {expected:?}, found: {actual:?}")]
    WrongType {
        name: String,
        expected: AttributeKind,
        actual: AttributeKind,
    },
}

/// An [`Event`] builder.
///
/// During construction every attribute starts `undefined`. Attributes that are never assigned
/// stay `undefined`, which the evaluator treats as an allowed absence or a fatal error depending
/// on the attribute's `allow_undefined` declaration.
#[derive(Debug)]
pub struct EventBuilder<'rules> {
    by_ids: Vec<AttributeValue>,
    attributes: &'rules AttributeTable,
    strings: &'rules StringInterner,
}

impl<'rules> EventBuilder<'rules> {
    pub fn new(attributes: &'rules AttributeTable, strings: &'rules StringInterner) -> Self {
        Self {
            attributes,
            strings,
            by_ids: vec![AttributeValue::Undefined; attributes.len()],
        }
    }

    /// Build the corresponding [`Event`]. Non-assigned attributes remain `undefined`.
    pub fn build(self) -> Result<Event, EventError> {
        Ok(Event(self.by_ids))
    }

    pub fn with_boolean(&mut self, name: &str, value: bool) -> Result<(), EventError> {
        self.add_value(name, AttributeKind::Boolean, || {
            AttributeValue::Boolean(value)
        })
    }

    pub fn with_integer(&mut self, name: &str, value: i64) -> Result<(), EventError> {
        self.add_value(name, AttributeKind::Integer, || {
            AttributeValue::Integer(value)
        })
    }

    pub fn with_float(&mut self, name: &str, value: f64) -> Result<(), EventError> {
        self.add_value(name, AttributeKind::Float, || AttributeValue::Float(value))
    }

    /// A string value carries its raw text alongside the id resolved against the interner's
    /// closed domain: equality/set/list predicates compare by id, but `contains`/`starts_with`/
    /// `ends_with` need the text itself, and a string outside the known domain (id is the
    /// sentinel) should still be comparable by those operators.
    pub fn with_string(&mut self, name: &str, value: &str) -> Result<(), EventError> {
        let id = self
            .attributes
            .by_name(name)
            .ok_or_else(|| EventError::NonExistingAttribute(name.to_string()))?;
        self.add_value(name, AttributeKind::String, || {
            AttributeValue::String(self.strings.get(id, value), value.into())
        })
    }

    /// Binds an `integer_list`-kind attribute. Kept exactly as supplied: per the value model,
    /// event lists are unordered and may carry duplicates, so no sort/dedup is applied here.
    pub fn with_integer_list(&mut self, name: &str, value: &[i64]) -> Result<(), EventError> {
        self.add_value(name, AttributeKind::IntegerList, || {
            AttributeValue::IntegerList(value.to_vec())
        })
    }

    /// Binds a `string_list`-kind attribute. Kept exactly as supplied, see [`Self::with_integer_list`].
    pub fn with_string_list(&mut self, name: &str, values: &[&str]) -> Result<(), EventError> {
        let id = self
            .attributes
            .by_name(name)
            .ok_or_else(|| EventError::NonExistingAttribute(name.to_string()))?;
        self.add_value(name, AttributeKind::StringList, || {
            let values = values.iter().map(|v| self.strings.get(id, v)).collect();
            AttributeValue::StringList(values)
        })
    }

    /// Bind a `segments`-kind attribute. The sequence is sorted by `segment_id` ascending, as
    /// required by the linear scan used by `segment_within`/`segment_before`.
    pub fn with_segments(&mut self, name: &str, segments: &[Segment]) -> Result<(), EventError> {
        self.add_value(name, AttributeKind::Segments, || {
            let mut segments = segments.to_vec();
            segments.sort_by_key(|segment| segment.segment_id);
            AttributeValue::Segments(segments)
        })
    }

    /// Bind a `frequency_caps`-kind attribute.
    pub fn with_frequency_caps(
        &mut self,
        name: &str,
        caps: &[RawFrequencyCap],
    ) -> Result<(), EventError> {
        let id = self
            .attributes
            .by_name(name)
            .ok_or_else(|| EventError::NonExistingAttribute(name.to_string()))?;
        self.add_value(name, AttributeKind::FrequencyCaps, || {
            let caps = caps
                .iter()
                .map(|cap| FrequencyCap {
                    freq_type: cap.freq_type,
                    id: cap.id,
                    namespace: self.strings.get(id, &cap.namespace),
                    value: cap.value,
                    timestamp_micros: cap.timestamp_micros,
                })
                .collect();
            AttributeValue::FrequencyCaps(caps)
        })
    }

    pub fn with_undefined(&mut self, name: &str) -> Result<(), EventError> {
        let index = self
            .attributes
            .by_name(name)
            .ok_or_else(|| EventError::NonExistingAttribute(name.to_string()))?;
        self.by_ids[index.0] = AttributeValue::Undefined;
        Ok(())
    }

    fn add_value<F>(&mut self, name: &str, actual: AttributeKind, f: F) -> Result<(), EventError>
    where
        F: FnOnce() -> AttributeValue,
    {
        let index = self
            .attributes
            .by_name(name)
            .ok_or_else(|| EventError::NonExistingAttribute(name.to_string()))?;
        let expected = self.attributes.kind_of(index);
        if expected != actual {
            return Err(EventError::WrongType {
                name: name.to_owned(),
                expected,
                actual,
            });
        }
        self.by_ids[index.0] = f();
        Ok(())
    }
}

/// An event: a dense, per-attribute array of values used to evaluate expressions against.
#[derive(Clone, Debug)]
pub struct Event(Vec<AttributeValue>);

impl Index<AttributeId> for Event {
    type Output = AttributeValue;

    #[inline]
    fn index(&self, index: AttributeId) -> &Self::Output {
        &self.0[index.0]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// Interned id (for equality/set comparisons) paired with the raw text (for
    /// `contains`/`starts_with`/`ends_with`, which compare text the interner never needs to know).
    String(StringId, Box<str>),
    IntegerList(Vec<i64>),
    StringList(Vec<StringId>),
    Segments(Vec<Segment>),
    FrequencyCaps(Vec<FrequencyCap>),
    Undefined,
}

/// A timestamped segment membership, sorted by `segment_id` ascending within an event's
/// `segments`-kind attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub segment_id: i64,
    pub timestamp_micros: i64,
}

/// A frequency cap entry, already resolved against the event's string scope. Constructed from
/// [`RawFrequencyCap`] by [`EventBuilder::with_frequency_caps`].
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyCap {
    pub freq_type: FrequencyType,
    pub id: i64,
    pub namespace: StringId,
    pub value: u32,
    pub timestamp_micros: Option<i64>,
}

/// A frequency cap entry as supplied by the caller, prior to namespace interning.
#[derive(Clone, Debug)]
pub struct RawFrequencyCap {
    pub freq_type: FrequencyType,
    pub id: i64,
    pub namespace: String,
    pub value: u32,
    pub timestamp_micros: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct AttributeTable {
    by_names: HashMap<String, AttributeId>,
    names: Vec<String>,
    by_ids: Vec<AttributeKind>,
    allow_undefined: Vec<bool>,
    bounds: Vec<Option<Bounds>>,
}

#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Debug, Hash)]
pub struct AttributeId(usize);

impl AttributeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for AttributeId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "attribute({})", self.0)
    }
}

impl AttributeTable {
    pub fn new(definitions: &[AttributeDefinition]) -> Result<Self, BuildError> {
        let size = definitions.len();
        let mut by_names = HashMap::with_capacity(size);
        let mut names = Vec::with_capacity(size);
        let mut by_ids = Vec::with_capacity(size);
        let mut allow_undefined = Vec::with_capacity(size);
        let mut bounds = Vec::with_capacity(size);
        for (i, definition) in definitions.iter().enumerate() {
            let name = definition.name.to_owned();
            if by_names.contains_key(&name) {
                return Err(BuildError::DuplicateAttribute(name));
            }

            by_names.insert(name.clone(), AttributeId(i));
            names.push(name);
            by_ids.push(definition.kind.clone());
            allow_undefined.push(definition.allow_undefined);
            bounds.push(definition.bounds.clone());
        }

        Ok(Self {
            by_names,
            names,
            by_ids,
            allow_undefined,
            bounds,
        })
    }

    #[inline]
    pub fn by_name(&self, name: &str) -> Option<AttributeId> {
        self.by_names.get(name).copied()
    }

    /// Resolves a name to an id, or a [`BuildError::UnknownAttribute`] (the `assign_variable_id`
    /// pass used by build-time callers).
    pub fn resolve(&self, name: &str) -> Result<AttributeId, BuildError> {
        self.by_name(name)
            .ok_or_else(|| BuildError::UnknownAttribute(name.to_string()))
    }

    #[inline]
    pub fn name_of(&self, id: AttributeId) -> &str {
        &self.names[id.0]
    }

    #[inline]
    pub fn kind_of(&self, id: AttributeId) -> AttributeKind {
        self.by_ids[id.0].clone()
    }

    #[inline]
    pub fn allow_undefined(&self, id: AttributeId) -> bool {
        self.allow_undefined[id.0]
    }

    #[inline]
    pub fn bounds(&self, id: AttributeId) -> Option<&Bounds> {
        self.bounds[id.0].as_ref()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_ids.is_empty()
    }
}

/// The definition of an attribute usable within a rule set.
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    name: String,
    kind: AttributeKind,
    allow_undefined: bool,
    bounds: Option<Bounds>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum AttributeKind {
    Boolean,
    Integer,
    Float,
    String,
    IntegerList,
    StringList,
    Segments,
    FrequencyCaps,
}

/// The permitted interval for a scalar attribute's domain, used by bound derivation (`bound`).
#[derive(Debug, Clone, PartialEq)]
pub enum Bounds {
    Boolean,
    Integer { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    String { min: StringId, max: StringId },
}

impl AttributeDefinition {
    fn new(name: &str, kind: AttributeKind) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            allow_undefined: true,
            bounds: None,
        }
    }

    /// Attributes default to `allow_undefined = true`; mark one as required instead, so its
    /// absence from an event is a fatal programming error rather than an in-band `false`.
    pub fn required(mut self) -> Self {
        self.allow_undefined = false;
        self
    }

    /// Declare the permitted interval for a scalar attribute, enabling `bound()` derivation.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, AttributeKind::Boolean)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, AttributeKind::Integer)
    }

    pub fn float(name: &str) -> Self {
        Self::new(name, AttributeKind::Float)
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, AttributeKind::String)
    }

    pub fn integer_list(name: &str) -> Self {
        Self::new(name, AttributeKind::IntegerList)
    }

    pub fn string_list(name: &str) -> Self {
        Self::new(name, AttributeKind::StringList)
    }

    pub fn segments(name: &str) -> Self {
        Self::new(name, AttributeKind::Segments)
    }

    pub fn frequency_caps(name: &str) -> Self {
        Self::new(name, AttributeKind::FrequencyCaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_create_an_attribute_table_with_no_attributes() {
        assert!(AttributeTable::new(&[]).is_ok())
    }

    #[test]
    fn can_create_an_attribute_table_with_some_attributes() {
        let definitions = [
            AttributeDefinition::boolean("private"),
            AttributeDefinition::string_list("deals"),
            AttributeDefinition::integer("exchange_id"),
            AttributeDefinition::float("bidfloor"),
            AttributeDefinition::string("country"),
            AttributeDefinition::integer_list("segment_ids"),
        ];

        assert!(AttributeTable::new(&definitions).is_ok());
    }

    #[test]
    fn return_an_error_on_duplicate_definitions() {
        let definitions = [
            AttributeDefinition::boolean("private"),
            AttributeDefinition::integer("private"),
        ];

        assert!(matches!(
            AttributeTable::new(&definitions),
            Err(BuildError::DuplicateAttribute(_))
        ));
    }

    #[test]
    fn attributes_allow_undefined_by_default() {
        let attributes =
            AttributeTable::new(&[AttributeDefinition::boolean("private")]).unwrap();
        let id = attributes.by_name("private").unwrap();

        assert!(attributes.allow_undefined(id));
    }

    #[test]
    fn required_attributes_disallow_undefined() {
        let attributes =
            AttributeTable::new(&[AttributeDefinition::boolean("private").required()]).unwrap();
        let id = attributes.by_name("private").unwrap();

        assert!(!attributes.allow_undefined(id));
    }

    #[test]
    fn can_add_a_boolean_attribute_value() {
        let attributes = AttributeTable::new(&[AttributeDefinition::boolean("private")]).unwrap();
        let strings = StringInterner::new();
        let mut event_builder = EventBuilder::new(&attributes, &strings);

        assert!(event_builder.with_boolean("private", true).is_ok());
    }

    #[test]
    fn can_add_a_float_attribute_value() {
        let attributes = AttributeTable::new(&[AttributeDefinition::float("bidfloor")]).unwrap();
        let strings = StringInterner::new();
        let mut event_builder = EventBuilder::new(&attributes, &strings);

        assert!(event_builder.with_float("bidfloor", 1.5).is_ok());
    }

    #[test]
    fn can_add_segments_sorted_by_id() {
        let attributes =
            AttributeTable::new(&[AttributeDefinition::segments("segments_with_timestamp")])
                .unwrap();
        let strings = StringInterner::new();
        let mut builder = EventBuilder::new(&attributes, &strings);
        let segments = [
            Segment {
                segment_id: 42,
                timestamp_micros: 2,
            },
            Segment {
                segment_id: 1,
                timestamp_micros: 1,
            },
        ];

        builder
            .with_segments("segments_with_timestamp", &segments)
            .unwrap();
        let event = builder.build().unwrap();
        let id = attributes.by_name("segments_with_timestamp").unwrap();

        match &event[id] {
            AttributeValue::Segments(sorted) => {
                assert_eq!(sorted[0].segment_id, 1);
                assert_eq!(sorted[1].segment_id, 42);
            }
            other => panic!("expected Segments, got {other:?}"),
        }
    }

    #[test]
    fn return_an_error_when_adding_a_non_existing_attribute() {
        let attributes =
            AttributeTable::new(&[AttributeDefinition::string_list("deal_ids")]).unwrap();
        let strings = StringInterner::new();
        let mut event_builder = EventBuilder::new(&attributes, &strings);

        let result = event_builder.with_boolean("non_existing", true);

        assert!(matches!(result, Err(EventError::NonExistingAttribute(_))));
    }

    #[test]
    fn return_an_error_when_trying_to_add_an_attribute_with_mismatched_type() {
        let attributes = AttributeTable::new(&[AttributeDefinition::boolean("private")]).unwrap();
        let strings = StringInterner::new();
        let mut event_builder = EventBuilder::new(&attributes, &strings);

        let result = event_builder.with_integer("private", 1);

        assert!(result.is_err());
    }

    #[test]
    fn can_create_an_event_with_a_missing_attribute() {
        let attributes = AttributeTable::new(&[AttributeDefinition::boolean("private")]).unwrap();
        let strings = StringInterner::new();
        let event_builder = EventBuilder::new(&attributes, &strings);

        assert!(event_builder.build().is_ok());
    }
}
