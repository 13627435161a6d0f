use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A remote operation exposed by the modeler backend.
///
/// The numeric slot returned by [`Capability::fn_index`] must mirror the
/// order in which the backend registers its handlers. Slot 1 is reserved
/// and never dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ChatToCode,
    ParseParameters,
    GenerateMesh,
    ExportStl,
    GetComponentTemplate,
    ValidateCode,
    AutoFixCode,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::ChatToCode,
        Capability::ParseParameters,
        Capability::GenerateMesh,
        Capability::ExportStl,
        Capability::GetComponentTemplate,
        Capability::ValidateCode,
        Capability::AutoFixCode,
    ];

    /// Backend handler slot.
    pub fn fn_index(self) -> u32 {
        match self {
            Capability::ChatToCode => 0,
            Capability::ParseParameters => 2,
            Capability::GenerateMesh => 3,
            Capability::ExportStl => 4,
            Capability::GetComponentTemplate => 5,
            Capability::ValidateCode => 6,
            Capability::AutoFixCode => 7,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ChatToCode => "chat_to_code",
            Capability::ParseParameters => "parse_parameters",
            Capability::GenerateMesh => "generate_mesh",
            Capability::ExportStl => "export_stl",
            Capability::GetComponentTemplate => "get_component_template",
            Capability::ValidateCode => "validate_code",
            Capability::AutoFixCode => "auto_fix_code",
        }
    }

    /// Resolve a capability name straight to its slot.
    ///
    /// Unknown names are rejected rather than dispatched to slot 0.
    pub fn resolve_index(name: &str) -> Result<u32, Error> {
        name.parse::<Capability>().map(Capability::fn_index)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::UnknownCapability(s.to_owned()))
    }
}
