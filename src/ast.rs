use crate::{
    events::AttributeTable,
    predicates::{Predicate, PredicateId, PredicateInterner, PredicateKind, PrimitiveLiteral, SetLiteral},
    strings::StringId,
};
use std::cell::Cell;

pub type TreeNode = Box<Node>;

/// A boolean expression tree over leaf [`Predicate`]s.
///
/// Every variant carries a `predicate_id` slot, filled exactly once by [`Node::assign_pred_id`]
/// after the tree is fully built. Reading the slot before it is resolved (e.g. to index a memo
/// bitset) is a caller-contract violation, enforced by [`PredicateId::index`]'s assertion.
#[derive(Clone, Debug)]
pub enum Node {
    And(TreeNode, TreeNode, Cell<PredicateId>),
    Or(TreeNode, TreeNode, Cell<PredicateId>),
    Not(TreeNode, Cell<PredicateId>),
    Value(Predicate, Cell<PredicateId>),
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::And(l1, r1, _), Self::And(l2, r2, _)) => l1 == l2 && r1 == r2,
            (Self::Or(l1, r1, _), Self::Or(l2, r2, _)) => l1 == l2 && r1 == r2,
            (Self::Not(c1, _), Self::Not(c2, _)) => c1 == c2,
            (Self::Value(p1, _), Self::Value(p2, _)) => p1 == p2,
            _ => false,
        }
    }
}

impl Node {
    pub fn and(left: Node, right: Node) -> Self {
        Self::And(Box::new(left), Box::new(right), unresolved())
    }

    pub fn or(left: Node, right: Node) -> Self {
        Self::Or(Box::new(left), Box::new(right), unresolved())
    }

    pub fn not(child: Node) -> Self {
        Self::Not(Box::new(child), unresolved())
    }

    pub fn value(predicate: Predicate) -> Self {
        Self::Value(predicate, unresolved())
    }

    /// The id assigned by [`Self::assign_pred_id`], or [`PredicateId::UNRESOLVED`] if it has not
    /// run yet.
    #[inline]
    pub fn predicate_id(&self) -> PredicateId {
        match self {
            Self::And(_, _, id) | Self::Or(_, _, id) | Self::Not(_, id) | Self::Value(_, id) => {
                id.get()
            }
        }
    }

    fn set_predicate_id(&self, id: PredicateId) {
        match self {
            Self::And(_, _, cell) | Self::Or(_, _, cell) | Self::Not(_, cell) | Self::Value(_, cell) => {
                cell.set(id)
            }
        }
    }

    /// Hash-conses every node bottom-up through `interner`, assigning each a dense
    /// [`PredicateId`]. Structurally-equal leaves share an id; compound nodes are hash-consed by
    /// their children's ids, so structural sharing composes up the tree.
    ///
    /// Idempotent (Property 6): a node whose slot is already resolved returns it unchanged rather
    /// than re-interning, so running this twice over the same tree is a no-op the second time.
    pub fn assign_pred_id(&self, interner: &mut PredicateInterner) -> PredicateId {
        let existing = self.predicate_id();
        if existing != PredicateId::UNRESOLVED {
            return existing;
        }

        let id = match self {
            Self::And(left, right, _) => {
                let left = left.assign_pred_id(interner);
                let right = right.assign_pred_id(interner);
                interner.intern_and(left, right)
            }
            Self::Or(left, right, _) => {
                let left = left.assign_pred_id(interner);
                let right = right.assign_pred_id(interner);
                interner.intern_or(left, right)
            }
            Self::Not(child, _) => {
                let child = child.assign_pred_id(interner);
                interner.intern_not(child)
            }
            Self::Value(predicate, _) => interner.intern_leaf(predicate.clone()),
        };
        self.set_predicate_id(id);
        id
    }

    /// Every [`Predicate`] leaf's attribute belongs to `attributes`.
    ///
    /// Predicates are already resolved against a specific [`AttributeTable`] at construction time
    /// (`Predicate::new` takes the table and fails on an unknown name), so this mostly guards
    /// against an expression built from one rule set being validated against another.
    pub fn all_variables_in_config(&self, attributes: &AttributeTable) -> bool {
        match self {
            Self::And(left, right, _) | Self::Or(left, right, _) => {
                left.all_variables_in_config(attributes) && right.all_variables_in_config(attributes)
            }
            Self::Not(child, _) => child.all_variables_in_config(attributes),
            Self::Value(predicate, _) => predicate.attribute().index() < attributes.len(),
        }
    }

    /// Every interned string literal referenced by the expression falls within its attribute's
    /// declared string domain, for attributes that declare one.
    ///
    /// Attributes without a bounded string domain admit any interned string, so this only rejects
    /// literals under attributes that explicitly declared `min`/`max` bounds.
    pub fn all_bounded_strings_valid(&self, attributes: &AttributeTable) -> bool {
        match self {
            Self::And(left, right, _) | Self::Or(left, right, _) => {
                left.all_bounded_strings_valid(attributes) && right.all_bounded_strings_valid(attributes)
            }
            Self::Not(child, _) => child.all_bounded_strings_valid(attributes),
            Self::Value(predicate, _) => {
                let Some(crate::events::Bounds::String { min, max }) = attributes.bounds(predicate.attribute())
                else {
                    return true;
                };
                leaf_strings(predicate.kind()).into_iter().all(|id| {
                    let valid = id >= *min && id <= *max;
                    if !valid {
                        tracing::warn!(
                            attribute = attributes.name_of(predicate.attribute()),
                            string_id = ?id,
                            "string literal falls outside the attribute's bounded domain"
                        );
                    }
                    valid
                })
            }
        }
    }
}

fn leaf_strings(kind: &PredicateKind) -> Vec<StringId> {
    match kind {
        PredicateKind::Equality(_, PrimitiveLiteral::String(id)) => vec![*id],
        PredicateKind::Set(_, SetLiteral::String(id)) => vec![*id],
        PredicateKind::Set(_, SetLiteral::StringList(ids)) => ids.clone(),
        _ => Vec::new(),
    }
}

#[inline]
fn unresolved() -> Cell<PredicateId> {
    Cell::new(PredicateId::UNRESOLVED)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::{
        events::{AttributeDefinition, AttributeTable, Bounds},
        predicates::PredicateKind,
        strings::StringInterner,
        test_utils::predicates::*,
    };

    fn define_attributes() -> AttributeTable {
        let definitions = vec![
            AttributeDefinition::string_list("deals"),
            AttributeDefinition::string("deal"),
            AttributeDefinition::integer("price"),
            AttributeDefinition::integer("exchange_id"),
            AttributeDefinition::boolean("private"),
        ];
        AttributeTable::new(&definitions).unwrap()
    }

    #[test]
    fn a_leaf_keeps_its_own_predicate_id() {
        let attributes = define_attributes();
        let a = variable!(&attributes, "private");
        let mut interner = PredicateInterner::new();

        let node = Node::value(a);
        let id = node.assign_pred_id(&mut interner);

        assert_eq!(id, node.predicate_id());
    }

    #[test]
    fn structurally_equal_leaves_share_an_id_through_compound_nodes() {
        let attributes = define_attributes();
        let a = variable!(&attributes, "private");
        let mut interner = PredicateInterner::new();

        let left = Node::and(Node::value(a.clone()), Node::value(a.clone()));
        let right = Node::or(Node::value(a.clone()), Node::value(a));

        left.assign_pred_id(&mut interner);
        right.assign_pred_id(&mut interner);

        // `left` is `AND(x, x)`; both children share a single leaf id.
        let Node::And(l, r, _) = &left else { unreachable!() };
        assert_eq!(l.predicate_id(), r.predicate_id());
        // `right` reuses that same leaf id for its own children, but is a distinct `OR` node.
        assert_ne!(left.predicate_id(), right.predicate_id());
    }

    #[test]
    fn assigning_pred_id_twice_is_a_no_op() {
        let attributes = define_attributes();
        let a = variable!(&attributes, "private");
        let mut interner = PredicateInterner::new();

        let node = Node::not(Node::value(a));
        let first = node.assign_pred_id(&mut interner);
        let count_after_first = interner.predicate_count();
        let second = node.assign_pred_id(&mut interner);

        assert_eq!(first, second);
        assert_eq!(count_after_first, interner.predicate_count());
    }

    #[test]
    fn all_variables_in_config_rejects_a_foreign_table() {
        let attributes = define_attributes();
        let other = AttributeTable::new(&[AttributeDefinition::boolean("private")]).unwrap();
        let a = variable!(&attributes, "private");

        let node = Node::value(a);

        assert!(node.all_variables_in_config(&attributes));
        assert!(!node.all_variables_in_config(&other));
    }

    #[test]
    fn node_equality_ignores_predicate_id_slots() {
        let attributes = define_attributes();
        let a = variable!(&attributes, "private");
        let mut interner = PredicateInterner::new();

        let resolved = Node::value(a.clone());
        resolved.assign_pred_id(&mut interner);
        let unresolved = Node::value(a);

        assert_eq!(resolved, unresolved);
    }

    #[test]
    fn bounded_string_outside_the_domain_is_rejected() {
        let mut strings = StringInterner::new();
        let attributes = AttributeTable::new(&[AttributeDefinition::string("deal")]).unwrap();
        let deal = attributes.by_name("deal").unwrap();
        let in_bounds = strings.get_or_update(deal, "deal-1");
        let out_of_bounds = strings.get_or_update(deal, "deal-2");
        let bounded = AttributeTable::new(&[AttributeDefinition::string("deal").with_bounds(
            Bounds::String {
                min: in_bounds,
                max: in_bounds,
            },
        )])
        .unwrap();

        let accepted = Node::value(equal!(&bounded, "deal", primitive_string!(in_bounds)));
        let rejected = Node::value(equal!(&bounded, "deal", primitive_string!(out_of_bounds)));

        assert!(accepted.all_bounded_strings_valid(&bounded));
        assert!(!rejected.all_bounded_strings_valid(&bounded));
    }
}
