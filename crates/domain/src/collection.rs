//! Managed collection kinds and their field schema.
//!
//! Each row field is tagged with an explicit [`FieldRole`]. Rebinding and
//! view preparation look fields up by role, so reordering the row layout
//! never changes which key a value is filed under.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A dynamically-sized, name-keyed collection inside the sheet document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Skill,
    Weapon,
    Ability,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Skill,
        CollectionKind::Weapon,
        CollectionKind::Ability,
    ];

    /// Path segment under the form root (`skills`, `weapons`, `abilities`).
    pub fn segment(self) -> &'static str {
        match self {
            CollectionKind::Skill => "skills",
            CollectionKind::Weapon => "weapons",
            CollectionKind::Ability => "abilities",
        }
    }

    /// Control name; rows of this kind carry it as their scope marker.
    pub fn control_name(self) -> &'static str {
        match self {
            CollectionKind::Skill => "skill",
            CollectionKind::Weapon => "weapon",
            CollectionKind::Ability => "ability",
        }
    }

    /// Field roles in their default layout order. `Name` is always first.
    pub fn roles(self) -> &'static [FieldRole] {
        match self {
            CollectionKind::Skill => &[
                FieldRole::Name,
                FieldRole::Stat,
                FieldRole::Inability,
                FieldRole::Trained,
                FieldRole::Specialized,
            ],
            CollectionKind::Weapon => &[
                FieldRole::Name,
                FieldRole::Damage,
                FieldRole::Range,
                FieldRole::Notes,
            ],
            CollectionKind::Ability => &[
                FieldRole::Name,
                FieldRole::CostAmount,
                FieldRole::CostPool,
                FieldRole::Description,
            ],
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.control_name())
    }
}

impl FromStr for CollectionKind {
    type Err = DomainError;

    /// Accepts the control name or the collection segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skill" | "skills" => Ok(CollectionKind::Skill),
            "weapon" | "weapons" => Ok(CollectionKind::Weapon),
            "ability" | "abilities" => Ok(CollectionKind::Ability),
            _ => Err(DomainError::parse(format!("Unknown collection kind: {}", s))),
        }
    }
}

/// Role of one field within an entity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    Name,
    // Skills
    Stat,
    Inability,
    Trained,
    Specialized,
    // Weapons
    Damage,
    Range,
    Notes,
    // Abilities
    CostAmount,
    CostPool,
    Description,
}

impl FieldRole {
    /// Path suffix relative to the entity key.
    pub fn suffix(self) -> &'static str {
        match self {
            FieldRole::Name => "name",
            FieldRole::Stat => "stat",
            FieldRole::Inability => "inability",
            FieldRole::Trained => "trained",
            FieldRole::Specialized => "specialized",
            FieldRole::Damage => "damage",
            FieldRole::Range => "range",
            FieldRole::Notes => "notes",
            FieldRole::CostAmount => "cost.amount",
            FieldRole::CostPool => "cost.pool",
            FieldRole::Description => "description",
        }
    }

    pub fn is_name(self) -> bool {
        self == FieldRole::Name
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for FieldRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(FieldRole::Name),
            "stat" => Ok(FieldRole::Stat),
            "inability" => Ok(FieldRole::Inability),
            "trained" => Ok(FieldRole::Trained),
            "specialized" => Ok(FieldRole::Specialized),
            "damage" => Ok(FieldRole::Damage),
            "range" => Ok(FieldRole::Range),
            "notes" => Ok(FieldRole::Notes),
            "cost.amount" => Ok(FieldRole::CostAmount),
            "cost.pool" => Ok(FieldRole::CostPool),
            "description" => Ok(FieldRole::Description),
            _ => Err(DomainError::parse(format!("Unknown field role: {}", s))),
        }
    }
}
