//! Tunables the evaluator and bound derivation need but the expression language itself does not
//! fix: floating point tolerance and the handful of constants the domain-specific predicates rely
//! on. Rule-set-scoped, passed explicitly by the caller building a rule set.

/// Epsilon values and physical constants used while evaluating expressions and deriving bounds.
///
/// Built once alongside a rule set and threaded explicitly through evaluation; never read from
/// the environment or a file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Tolerance used by `feq`/`fne` when comparing a `Float` literal against an event value.
    pub eval_epsilon: f64,
    /// Tolerance used when widening a bound past a strict `<`/`>` float literal.
    pub bound_epsilon: f64,
    /// Mean earth radius, in kilometers, used by the great-circle `geo_within_radius` predicate.
    pub earth_radius_km: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eval_epsilon: 1e-9,
            bound_epsilon: 1e-12,
            earth_radius_km: 6372.8,
        }
    }
}

impl Config {
    #[inline]
    pub fn feq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eval_epsilon
    }

    #[inline]
    pub fn fne(&self, a: f64, b: f64) -> bool {
        !self.feq(a, b)
    }
}

/// The entity kind a frequency cap applies to (advertiser, campaign, flight, product, ...).
///
/// The source system this engine is modeled after hard-codes these as numeric constants; this
/// crate surfaces the mapping as configuration instead so a deployment can add types without a
/// code change. The four well-known ids are kept as associated constants for convenience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrequencyType(pub u32);

impl FrequencyType {
    pub const ADVERTISER: FrequencyType = FrequencyType(20);
    pub const CAMPAIGN: FrequencyType = FrequencyType(30);
    pub const FLIGHT: FrequencyType = FrequencyType(10);
    pub const PRODUCT: FrequencyType = FrequencyType(40);
}
