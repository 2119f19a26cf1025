//! Flat input records and the entity kinds they describe

use crate::graph::{NodeKind, PropertyValue, RelKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One flat input row: column name to scalar value, in source column order
pub type Record = IndexMap<String, PropertyValue>;

/// Build a record from `(column, value)` pairs
pub fn record<K, V, I>(pairs: I) -> Record
where
    K: Into<String>,
    V: Into<PropertyValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Which side of the relationship the record's own node sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The record's node is the relationship source
    Source,
    /// The record's node is the relationship target
    Target,
}

/// A foreign-key column and the relationship it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub column: &'static str,
    pub rel: RelKind,
    pub target: NodeKind,
    pub side: Side,
    /// Null in a required column rejects the record; in an optional column it
    /// suppresses the relationship.
    pub required: bool,
}

const fn reference(
    column: &'static str,
    rel: RelKind,
    target: NodeKind,
    side: Side,
    required: bool,
) -> Reference {
    Reference {
        column,
        rel,
        target,
        side,
        required,
    }
}

const ACCOUNT_REFS: &[Reference] = &[reference(
    "user_id",
    RelKind::Owns,
    NodeKind::User,
    Side::Target,
    true,
)];

const DEVICE_REFS: &[Reference] = &[reference(
    "user_id",
    RelKind::UsesDevice,
    NodeKind::User,
    Side::Target,
    false,
)];

const IP_REFS: &[Reference] = &[reference(
    "location_id",
    RelKind::AssociatedWith,
    NodeKind::Location,
    Side::Source,
    true,
)];

const TRANSACTION_REFS: &[Reference] = &[
    reference("from_account", RelKind::Initiated, NodeKind::Account, Side::Target, false),
    reference("to_account", RelKind::Completed, NodeKind::Account, Side::Source, false),
    reference("merchant_id", RelKind::At, NodeKind::Merchant, Side::Source, false),
    reference("device_id", RelKind::UsingDevice, NodeKind::Device, Side::Source, false),
    reference("location_id", RelKind::FromLocation, NodeKind::Location, Side::Source, false),
    reference("ip_address_id", RelKind::UsingIp, NodeKind::IPAddress, Side::Source, false),
];

/// Columns of a `Connections` record: `user_id` KNOWS `knows_user_id`
pub const CONNECTION_SOURCE: &str = "user_id";
pub const CONNECTION_TARGET: &str = "knows_user_id";

/// The kind of entity a record set describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Users,
    Accounts,
    Devices,
    Locations,
    IPAddresses,
    Merchants,
    Transactions,
    /// Relationship-only rows feeding the KNOWS social graph
    Connections,
}

impl EntityKind {
    /// Dependency order: every kind only references kinds listed before it
    pub const INGEST_ORDER: [EntityKind; 8] = [
        EntityKind::Users,
        EntityKind::Locations,
        EntityKind::Merchants,
        EntityKind::Accounts,
        EntityKind::Devices,
        EntityKind::IPAddresses,
        EntityKind::Transactions,
        EntityKind::Connections,
    ];

    /// Node kind written by records of this kind; `None` for `Connections`
    pub fn node_kind(&self) -> Option<NodeKind> {
        match self {
            EntityKind::Users => Some(NodeKind::User),
            EntityKind::Accounts => Some(NodeKind::Account),
            EntityKind::Devices => Some(NodeKind::Device),
            EntityKind::Locations => Some(NodeKind::Location),
            EntityKind::IPAddresses => Some(NodeKind::IPAddress),
            EntityKind::Merchants => Some(NodeKind::Merchant),
            EntityKind::Transactions => Some(NodeKind::Transaction),
            EntityKind::Connections => None,
        }
    }

    /// Foreign-key columns, in the order relationships are written
    pub fn references(&self) -> &'static [Reference] {
        match self {
            EntityKind::Accounts => ACCOUNT_REFS,
            EntityKind::Devices => DEVICE_REFS,
            EntityKind::IPAddresses => IP_REFS,
            EntityKind::Transactions => TRANSACTION_REFS,
            EntityKind::Users
            | EntityKind::Locations
            | EntityKind::Merchants
            | EntityKind::Connections => &[],
        }
    }

    /// File stem used by the dataset loader
    pub fn file_stem(&self) -> &'static str {
        match self {
            EntityKind::Users => "users",
            EntityKind::Accounts => "accounts",
            EntityKind::Devices => "devices",
            EntityKind::Locations => "locations",
            EntityKind::IPAddresses => "ip_addresses",
            EntityKind::Merchants => "merchants",
            EntityKind::Transactions => "transactions",
            EntityKind::Connections => "connections",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Users => "Users",
            EntityKind::Accounts => "Accounts",
            EntityKind::Devices => "Devices",
            EntityKind::Locations => "Locations",
            EntityKind::IPAddresses => "IPAddresses",
            EntityKind::Merchants => "Merchants",
            EntityKind::Transactions => "Transactions",
            EntityKind::Connections => "Connections",
        };
        f.write_str(name)
    }
}
