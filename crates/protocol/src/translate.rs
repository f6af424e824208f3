//! Record field renaming between wire and uniform shapes
//!
//! # Purpose
//! 1.1.8 names the user reference of ACL rules, player records and registration
//! records `playerid`, the suppression flag `suppressed`, and the user list of a
//! channel tree `players`. Everything later uses `userid` / `suppress` / `users`,
//! which is also the uniform shape the decoders read.
//! Renaming is applied once on the way in and once on the way out; every other
//! field passes through untouched.

use crate::wire::Fields;

/// Record families that carry renamed fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Acl,
    User,
    Registration,
    Tree,
}

/// Field rename table for one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureTranslator {
    /// `(record, wire name, uniform name)`
    renames: &'static [(RecordKind, &'static str, &'static str)],
}

impl StructureTranslator {
    /// Wire names already match the uniform shape
    pub const IDENTITY: StructureTranslator = StructureTranslator { renames: &[] };

    /// 1.1.8 field names
    pub const LEGACY: StructureTranslator = StructureTranslator {
        renames: &[
            (RecordKind::Acl, "playerid", "userid"),
            (RecordKind::User, "playerid", "userid"),
            (RecordKind::User, "suppressed", "suppress"),
            (RecordKind::Registration, "playerid", "userid"),
            (RecordKind::Tree, "players", "users"),
        ],
    };

    pub fn is_identity(&self) -> bool {
        self.renames.is_empty()
    }

    /// Wire record → uniform record
    pub fn to_uniform(&self, kind: RecordKind, fields: Fields) -> Fields {
        self.rename(kind, fields, |&(_, wire, uniform)| (wire, uniform))
    }

    /// Uniform record → wire record
    pub fn to_wire(&self, kind: RecordKind, fields: Fields) -> Fields {
        self.rename(kind, fields, |&(_, wire, uniform)| (uniform, wire))
    }

    /// Name this generation uses on the wire for a uniform field
    pub fn wire_name(&self, kind: RecordKind, uniform: &'static str) -> &'static str {
        self.renames
            .iter()
            .find(|(k, _, u)| *k == kind && *u == uniform)
            .map(|(_, wire, _)| *wire)
            .unwrap_or(uniform)
    }

    fn rename<F>(&self, kind: RecordKind, mut fields: Fields, direction: F) -> Fields
    where
        F: Fn(&(RecordKind, &'static str, &'static str)) -> (&'static str, &'static str),
    {
        for entry in self.renames.iter().filter(|(k, _, _)| *k == kind) {
            let (from, to) = direction(entry);
            if let Some(value) = fields.remove(from) {
                fields.insert(to.to_string(), value);
            }
        }
        fields
    }
}
