//! The domain model: `Location`, `Order`, `Vehicle`, `Visit`, and the
//! `Model` container that owns them.
//!
//! Cross-references (Order↔Vehicle, Visit↔Location) are stored as ids and
//! resolved through the maps below rather than shared pointers, so the
//! model serializes trivially and has a single owner.

pub mod location;
pub mod order;
pub mod sim_model;
pub mod vehicle;
pub mod visit;

pub use location::{Location, LocationId};
pub use order::{Order, OrderId, OrderStatus};
pub use sim_model::Model;
pub use vehicle::{LoadingRule, Vehicle, VehicleId, VehicleStatus};
pub use visit::Visit;

use std::collections::BTreeMap;
use std::fmt;

pub type MapType<K, V> = BTreeMap<K, V>;

/// Panicking accessors for maps keyed by model ids, for call sites that
/// have already validated the key exists.
pub trait MapExt<K, V> {
    fn gets(&self, key: &K) -> &V;
    fn gets_mut(&mut self, key: &K) -> &mut V;
}

impl<K: Ord + fmt::Debug, V> MapExt<K, V> for MapType<K, V> {
    fn gets(&self, key: &K) -> &V {
        self.get(key)
            .unwrap_or_else(|| panic!("unchecked get failed for key {key:?}"))
    }

    fn gets_mut(&mut self, key: &K) -> &mut V {
        self.get_mut(key)
            .unwrap_or_else(|| panic!("unchecked get_mut failed for key {key:?}"))
    }
}

/// Declares a newtype string id with the trait impls every id in this
/// model needs (`Display`, ordering, `serde`, cheap `From<&str>`/`From<String>`).
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

pub(crate) use define_id;
