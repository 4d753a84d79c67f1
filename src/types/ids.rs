//! Persistent identifiers.
//!
//! Nodes, connections and diagrams are addressed by UUID v4 newtypes that survive
//! serialization. In-memory arenas use SlotMap keys instead (see [`Topology`](crate::Topology));
//! these ids are what callers and saved workspaces see.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a device placed in a diagram.
    NodeId
);
uuid_id!(
    /// Identifier of a fiber or Ethernet cable between two ports.
    ConnectionId
);
uuid_id!(
    /// Identifier of a diagram inside a workspace.
    DiagramId
);
