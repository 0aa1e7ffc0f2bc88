use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

/// A named marker which controls how a component is adapted. Component
/// factories look for the characteristics they understand and consume them
/// while building an adapter.
///
/// ## Example
///
/// ```
/// use pico_container::{characteristics::*, Properties};
///
/// let properties = Properties::from([CACHE, LOCK]);
/// assert!(properties.is_present(&CACHE));
/// assert!(!properties.is_present(&NO_CACHE));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Characteristic {
    name: &'static str,
    value: Cow<'static, str>,
}

impl Characteristic {
    /// Creates a new characteristic.
    #[must_use]
    pub const fn new(name: &'static str, value: &'static str) -> Self {
        Characteristic {
            name,
            value: Cow::Borrowed(value),
        }
    }

    /// The property name of this characteristic.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The property value of this characteristic.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for Characteristic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

const TRUE: &str = "true";
const FALSE: &str = "false";

/// Property name of the guard characteristic.
pub const GUARD_NAME: &str = "guard";

/// Cache the component after its first creation.
pub const CACHE: Characteristic = Characteristic::new("cache", TRUE);
/// Create a new instance of the component on every request.
pub const NO_CACHE: Characteristic = Characteristic::new("cache", FALSE);
/// Same as [`CACHE`].
pub const SINGLE: Characteristic = CACHE;
/// Same as [`NO_CACHE`].
pub const NO_SINGLE: Characteristic = NO_CACHE;
/// Cache one instance of the component per thread.
pub const THREAD_CACHE: Characteristic =
    Characteristic::new("thread-cache", TRUE);
/// Disable per-thread caching.
pub const NO_THREAD_CACHE: Characteristic =
    Characteristic::new("thread-cache", FALSE);
/// Serialize instance creation with a re-entrant lock.
pub const SYNCHRONIZE: Characteristic = Characteristic::new("synchronize", TRUE);
/// Disable synchronized instance creation.
pub const NO_SYNCHRONIZE: Characteristic =
    Characteristic::new("synchronize", FALSE);
/// Serialize instance creation with a lock.
pub const LOCK: Characteristic = Characteristic::new("lock", TRUE);
/// Disable locked instance creation.
pub const NO_LOCK: Characteristic = Characteristic::new("lock", FALSE);
/// Only expose the component through its key and interfaces.
pub const HIDE_IMPL: Characteristic = Characteristic::new("hide-impl", TRUE);
/// Expose the component through its concrete type as well.
pub const NO_HIDE_IMPL: Characteristic =
    Characteristic::new("hide-impl", FALSE);
/// Allow the instance of the component to be swapped at runtime.
pub const HOT_SWAP: Characteristic = Characteristic::new("hot-swap", TRUE);
/// Disable hot swapping.
pub const NO_HOT_SWAP: Characteristic = Characteristic::new("hot-swap", FALSE);
/// Hand out instances from a bounded pool.
pub const POOL: Characteristic = Characteristic::new("pool", TRUE);
/// Disable pooling.
pub const NO_POOL: Characteristic = Characteristic::new("pool", FALSE);
/// Instantiate the component when the container starts.
pub const AUTOMATIC: Characteristic = Characteristic::new("automatic", TRUE);
/// Explicitly request no characteristics.
pub const NONE: Characteristic = Characteristic::new("none", TRUE);
/// Guard the component with the component keyed `"guard"`.
pub const GUARD: Characteristic = Characteristic::new(GUARD_NAME, GUARD_NAME);

/// Guard the component with the component registered under the given name.
/// If the guard resolves to `false`, the component cannot be created.
#[must_use]
pub fn guard(with: impl Into<String>) -> Characteristic {
    Characteristic {
        name: GUARD_NAME,
        value: Cow::Owned(with.into()),
    }
}

/// An ordered set of characteristics attached to a container or a
/// registration.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Properties {
    entries: BTreeMap<&'static str, Cow<'static, str>>,
}

impl Properties {
    /// Creates an empty set of properties.
    #[must_use]
    pub fn new() -> Self {
        Properties::default()
    }

    /// Adds a characteristic, replacing any value with the same name.
    #[must_use]
    pub fn with(mut self, characteristic: Characteristic) -> Self {
        self.insert(characteristic);
        self
    }

    /// Adds a characteristic, returning the value it replaced.
    pub fn insert(
        &mut self,
        characteristic: Characteristic,
    ) -> Option<Cow<'static, str>> {
        self.entries.insert(characteristic.name, characteristic.value)
    }

    /// Copies every entry of `other` into this set. Entries of `other` win.
    pub fn merge(&mut self, other: &Properties) {
        for (name, value) in &other.entries {
            self.entries.insert(name, value.clone());
        }
    }

    /// Whether the characteristic is present with the same value.
    #[must_use]
    pub fn is_present(&self, characteristic: &Characteristic) -> bool {
        self.entries
            .get(characteristic.name)
            .map_or(false, |value| *value == characteristic.value)
    }

    /// Whether any value is set under the given name.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Gets the value set under the given name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(AsRef::as_ref)
    }

    /// Removes the characteristic if it is present with the same value. A
    /// characteristic with the same name but a different value is left in
    /// place.
    pub fn remove_if_present(&mut self, characteristic: &Characteristic) -> bool {
        if self.is_present(characteristic) {
            self.entries.remove(characteristic.name);
            true
        } else {
            false
        }
    }

    /// Removes whatever value is set under the given name.
    pub fn remove(&mut self, name: &str) -> Option<Cow<'static, str>> {
        self.entries.remove(name)
    }

    /// Whether this set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number of characteristics in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates over the names and values in this set.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (*name, value.as_ref()))
    }
}

impl Display for Properties {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (index, (name, value)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str("}")
    }
}

impl From<Characteristic> for Properties {
    fn from(characteristic: Characteristic) -> Self {
        Properties::new().with(characteristic)
    }
}

impl<const N: usize> From<[Characteristic; N]> for Properties {
    fn from(characteristics: [Characteristic; N]) -> Self {
        characteristics.into_iter().collect()
    }
}

impl FromIterator<Characteristic> for Properties {
    fn from_iter<I: IntoIterator<Item = Characteristic>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for characteristic in iter {
            properties.insert(characteristic);
        }
        properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn remove_if_present_only_removes_matching_values() {
        let mut properties = Properties::from(NO_CACHE);
        assert!(!properties.remove_if_present(&CACHE));
        assert!(properties.contains_name("cache"));

        assert!(properties.remove_if_present(&NO_CACHE));
        assert!(properties.is_empty());
    }

    #[test]
    fn later_characteristics_replace_earlier_ones() {
        let properties = Properties::from([CACHE, LOCK, NO_CACHE]);
        assert_eq!(2, properties.len());
        assert!(properties.is_present(&NO_CACHE));
    }

    #[test]
    fn custom_guard_carries_its_key() {
        let properties = Properties::from(guard("my_guard"));
        assert_eq!(Some("my_guard"), properties.value(GUARD_NAME));
        assert!(!properties.is_present(&GUARD));
    }

    #[test]
    fn display_lists_entries_in_order() {
        let properties = Properties::from([LOCK, CACHE]);
        assert_eq!("{cache=true, lock=true}", properties.to_string());
    }

    #[test]
    fn merge_prefers_other() {
        let mut properties = Properties::from([CACHE, HIDE_IMPL]);
        properties.merge(&Properties::from(NO_CACHE));
        assert!(properties.is_present(&NO_CACHE));
        assert!(properties.is_present(&HIDE_IMPL));
    }
}
