//! Fraud graph schema
//!
//! The set of node kinds and relationship types is closed: every operation in
//! the crate names them through [`NodeKind`] and [`RelKind`], so an undeclared
//! type cannot be expressed at all.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node kinds (labels) of the fraud graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    User,
    Account,
    Device,
    Location,
    IPAddress,
    Merchant,
    Transaction,
}

impl NodeKind {
    pub const ALL: [NodeKind; 7] = [
        NodeKind::User,
        NodeKind::Account,
        NodeKind::Device,
        NodeKind::Location,
        NodeKind::IPAddress,
        NodeKind::Merchant,
        NodeKind::Transaction,
    ];

    /// Label as stored and reported in path results
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::User => "User",
            NodeKind::Account => "Account",
            NodeKind::Device => "Device",
            NodeKind::Location => "Location",
            NodeKind::IPAddress => "IPAddress",
            NodeKind::Merchant => "Merchant",
            NodeKind::Transaction => "Transaction",
        }
    }

    /// The single identity attribute of this kind
    pub fn key_attribute(&self) -> &'static str {
        match self {
            NodeKind::User => "user_id",
            NodeKind::Account => "account_id",
            NodeKind::Device => "device_id",
            NodeKind::Location => "location_id",
            NodeKind::IPAddress => "ip_address_id",
            NodeKind::Merchant => "merchant_id",
            NodeKind::Transaction => "transaction_id",
        }
    }

    /// Non-key attributes, written on every upsert
    pub fn attributes(&self) -> &'static [&'static str] {
        match self {
            NodeKind::User => &["name", "age", "location", "email", "phone"],
            NodeKind::Account => &["account_type", "creation_date", "status"],
            NodeKind::Device => &["device_type", "os"],
            NodeKind::Location => &["country", "city"],
            NodeKind::IPAddress => &["ip_address"],
            NodeKind::Merchant => &["name", "industry"],
            NodeKind::Transaction => &["amount", "date", "transaction_type", "status"],
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which endpoint of a relationship may hold at most one edge of that type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Many-to-many; only endpoint-pair uniqueness applies
    Many,
    /// The source node has at most one outgoing edge of this type
    OneFromSource,
    /// The target node has at most one incoming edge of this type
    OneToTarget,
}

/// Relationship types of the fraud graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelKind {
    Owns,
    UsesDevice,
    AssociatedWith,
    Initiated,
    Completed,
    UsingDevice,
    FromLocation,
    UsingIp,
    At,
    Knows,
}

impl RelKind {
    pub const ALL: [RelKind; 10] = [
        RelKind::Owns,
        RelKind::UsesDevice,
        RelKind::AssociatedWith,
        RelKind::Initiated,
        RelKind::Completed,
        RelKind::UsingDevice,
        RelKind::FromLocation,
        RelKind::UsingIp,
        RelKind::At,
        RelKind::Knows,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelKind::Owns => "OWNS",
            RelKind::UsesDevice => "USES_DEVICE",
            RelKind::AssociatedWith => "ASSOCIATED_WITH",
            RelKind::Initiated => "INITIATED",
            RelKind::Completed => "COMPLETED",
            RelKind::UsingDevice => "USING_DEVICE",
            RelKind::FromLocation => "FROM_LOCATION",
            RelKind::UsingIp => "USING_IP",
            RelKind::At => "AT",
            RelKind::Knows => "KNOWS",
        }
    }

    /// Required kind of the edge's source node
    pub fn source_kind(&self) -> NodeKind {
        match self {
            RelKind::Owns | RelKind::UsesDevice | RelKind::Knows => NodeKind::User,
            RelKind::AssociatedWith => NodeKind::IPAddress,
            RelKind::Initiated => NodeKind::Account,
            RelKind::Completed
            | RelKind::UsingDevice
            | RelKind::FromLocation
            | RelKind::UsingIp
            | RelKind::At => NodeKind::Transaction,
        }
    }

    /// Required kind of the edge's target node
    pub fn target_kind(&self) -> NodeKind {
        match self {
            RelKind::Owns | RelKind::Completed => NodeKind::Account,
            RelKind::UsesDevice | RelKind::UsingDevice => NodeKind::Device,
            RelKind::AssociatedWith | RelKind::FromLocation => NodeKind::Location,
            RelKind::Initiated => NodeKind::Transaction,
            RelKind::UsingIp => NodeKind::IPAddress,
            RelKind::At => NodeKind::Merchant,
            RelKind::Knows => NodeKind::User,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            RelKind::UsesDevice | RelKind::Knows => Cardinality::Many,
            RelKind::Owns | RelKind::Initiated => Cardinality::OneToTarget,
            RelKind::AssociatedWith
            | RelKind::Completed
            | RelKind::UsingDevice
            | RelKind::FromLocation
            | RelKind::UsingIp
            | RelKind::At => Cardinality::OneFromSource,
        }
    }

    /// Whether `source -> target` matches the declared endpoint kinds
    pub fn accepts(&self, source: NodeKind, target: NodeKind) -> bool {
        self.source_kind() == source && self.target_kind() == target
    }
}

impl fmt::Display for RelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
