use std::collections::HashMap;

use crate::events::AttributeId;

/// Interns `(attribute, string)` pairs to dense ids so string equality, set membership and list
/// operations reduce to integer compares.
///
/// Ids are scoped *per attribute*, not globally: the id returned for `"CA"` under `country` and
/// the id returned for `"CA"` under `region` are independent counters and may coincide by
/// accident. Callers must never compare [`StringId`]s across attributes; the evaluator enforces
/// this by always comparing ids alongside the attribute the predicate is bound to.
#[derive(Clone, Debug, Default)]
pub struct StringInterner {
    scopes: HashMap<AttributeId, ScopedTable>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a string's id without interning it. Returns the sentinel id if the attribute has
    /// no scope yet or the string was never interned under it.
    pub fn get(&self, attribute: AttributeId, value: &str) -> StringId {
        self.scopes
            .get(&attribute)
            .map(|scope| scope.get(value))
            .unwrap_or(StringId(ScopedTable::SENTINEL_ID))
    }

    /// Intern `value` under `attribute`'s scope, returning its id. Returns the same id on repeat
    /// calls with the same `(attribute, value)` pair.
    pub fn get_or_update(&mut self, attribute: AttributeId, value: &str) -> StringId {
        self.scopes
            .entry(attribute)
            .or_insert_with(ScopedTable::new)
            .get_or_update(value)
    }

    /// Number of distinct strings interned under `attribute`.
    pub fn scope_len(&self, attribute: AttributeId) -> usize {
        self.scopes.get(&attribute).map_or(0, ScopedTable::len)
    }

    /// Recover the raw text behind an id. Used by string predicates (`contains`/`starts_with`/
    /// `ends_with`) that must compare against actual text rather than an opaque id.
    pub fn resolve(&self, attribute: AttributeId, id: StringId) -> Option<&str> {
        self.scopes.get(&attribute).and_then(|scope| scope.resolve(id))
    }
}

#[derive(Clone, Debug)]
struct ScopedTable {
    by_values: HashMap<String, usize>,
    by_ids: Vec<String>,
}

impl ScopedTable {
    const SENTINEL_ID: usize = 0;

    fn new() -> Self {
        Self {
            by_values: HashMap::new(),
            by_ids: vec![String::new()],
        }
    }

    fn get(&self, value: &str) -> StringId {
        let index = self
            .by_values
            .get(value)
            .copied()
            .unwrap_or(Self::SENTINEL_ID);
        StringId(index)
    }

    fn get_or_update(&mut self, value: &str) -> StringId {
        let by_ids = &mut self.by_ids;
        let counter = self.by_values.entry(value.to_string()).or_insert_with(|| {
            let counter = by_ids.len();
            by_ids.push(value.to_string());
            counter
        });

        StringId(*counter)
    }

    fn resolve(&self, id: StringId) -> Option<&str> {
        self.by_ids.get(id.0).map(String::as_str)
    }

    fn len(&self) -> usize {
        self.by_values.len()
    }
}

#[derive(Clone, Copy, Eq, Ord, PartialEq, PartialOrd, Debug, Hash)]
pub struct StringId(usize);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AttributeDefinition, AttributeTable};

    const A_KEY: &str = "test";
    const ANOTHER_KEY: &str = "test_2";

    fn two_attributes() -> (AttributeId, AttributeId) {
        let table = AttributeTable::new(&[
            AttributeDefinition::string("country"),
            AttributeDefinition::string("region"),
        ])
        .unwrap();
        (
            table.by_name("country").unwrap(),
            table.by_name("region").unwrap(),
        )
    }

    #[test]
    fn can_get_a_non_existing_string() {
        let (country, _) = two_attributes();
        let interner = StringInterner::new();

        let id = interner.get(country, A_KEY);

        assert_eq!(id, interner.get(country, ANOTHER_KEY));
    }

    #[test]
    fn update_the_table_with_the_new_string_when_it_is_not_present() {
        let (country, _) = two_attributes();
        let mut interner = StringInterner::new();

        let id = interner.get_or_update(country, A_KEY);

        assert_eq!(id, interner.get(country, A_KEY));
    }

    #[test]
    fn return_the_same_id_when_the_same_string_is_given() {
        let (country, _) = two_attributes();
        let mut interner = StringInterner::new();

        let id = interner.get_or_update(country, A_KEY);

        assert_eq!(id, interner.get_or_update(country, A_KEY));
    }

    #[test]
    fn can_add_multiple_strings() {
        let (country, _) = two_attributes();
        let mut interner = StringInterner::new();

        let id = interner.get_or_update(country, A_KEY);
        let another_id = interner.get_or_update(country, ANOTHER_KEY);

        assert_eq!(id, interner.get_or_update(country, A_KEY));
        assert_eq!(another_id, interner.get_or_update(country, ANOTHER_KEY));
    }

    #[test]
    fn scopes_are_independent_across_attributes() {
        let (country, region) = two_attributes();
        let mut interner = StringInterner::new();

        let country_id = interner.get_or_update(country, A_KEY);
        let region_id = interner.get_or_update(region, A_KEY);

        // Both scopes start their counter at 1, so the raw ids coincide...
        assert_eq!(country_id, region_id);
        // ...but a string interned under one attribute is unknown to the other.
        assert_eq!(interner.get(region, ANOTHER_KEY), interner.get(country, "unrelated"));
        assert_eq!(interner.scope_len(country), 1);
        assert_eq!(interner.scope_len(region), 1);
    }

    #[test]
    fn resolve_recovers_the_original_text() {
        let (country, _) = two_attributes();
        let mut interner = StringInterner::new();
        let id = interner.get_or_update(country, A_KEY);

        assert_eq!(interner.resolve(country, id), Some(A_KEY));
    }

    #[test]
    fn resolve_returns_none_for_an_unknown_id() {
        let (country, _) = two_attributes();
        let interner = StringInterner::new();

        assert_eq!(interner.resolve(country, StringId(7)), None);
    }
}
