//! Team organization - the hierarchy of teams and team members in a scenario
//!
//! Teams own their child units. Teams and members share a single name space,
//! since conditions and strategies reference either by name.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::TeamUnitId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: TeamUnitId,
    pub name: String,
    /// Marking of the simulated entity this member controls
    pub entity_marking: Option<String>,
    pub playable: bool,
}

impl TeamMember {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TeamUnitId::new(),
            name: name.into(),
            entity_marking: None,
            playable: false,
        }
    }

    pub fn with_entity_marking(mut self, marking: impl Into<String>) -> Self {
        self.entity_marking = Some(marking.into());
        self
    }

    pub fn playable(mut self) -> Self {
        self.playable = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamUnitId,
    pub name: String,
    pub echelon: Option<String>,
    pub units: Vec<TeamUnit>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TeamUnitId::new(),
            name: name.into(),
            echelon: None,
            units: Vec::new(),
        }
    }

    pub fn with_unit(mut self, unit: impl Into<TeamUnit>) -> Self {
        self.units.push(unit.into());
        self
    }

    /// All units below this team, depth first.
    pub fn descendants(&self) -> Vec<&TeamUnit> {
        let mut out = Vec::new();
        for unit in &self.units {
            out.push(unit);
            if let TeamUnit::Team(child) = unit {
                out.extend(child.descendants());
            }
        }
        out
    }

    fn contains(&self, id: TeamUnitId) -> bool {
        self.units.iter().any(|unit| {
            unit.id() == id
                || matches!(unit, TeamUnit::Team(team) if team.contains(id))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", rename_all = "snake_case")]
pub enum TeamUnit {
    Team(Team),
    Member(TeamMember),
}

impl TeamUnit {
    pub fn id(&self) -> TeamUnitId {
        match self {
            Self::Team(t) => t.id,
            Self::Member(m) => m.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Team(t) => &t.name,
            Self::Member(m) => &m.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Self::Team(t) => t.name = name,
            Self::Member(m) => m.name = name,
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, Self::Team(_))
    }
}

impl From<Team> for TeamUnit {
    fn from(value: Team) -> Self {
        Self::Team(value)
    }
}

impl From<TeamMember> for TeamUnit {
    fn from(value: TeamMember) -> Self {
        Self::Member(value)
    }
}

// ============================================================================
// TeamOrganization
// ============================================================================

/// The root of the team hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamOrganization {
    pub root: Team,
}

impl Default for TeamOrganization {
    fn default() -> Self {
        Self {
            root: Team::new("Team Organization"),
        }
    }
}

impl TeamOrganization {
    pub fn new(root: Team) -> Self {
        Self { root }
    }

    /// All units below the root, depth first.
    pub fn units(&self) -> Vec<&TeamUnit> {
        self.root.descendants()
    }

    /// Names of the root team and every unit below it.
    pub fn names(&self) -> Vec<(TeamUnitId, &str)> {
        let mut names = vec![(self.root.id, self.root.name.as_str())];
        names.extend(self.units().into_iter().map(|u| (u.id(), u.name())));
        names
    }

    pub fn find(&self, id: TeamUnitId) -> Option<&TeamUnit> {
        self.units().into_iter().find(|u| u.id() == id)
    }

    /// Rename the root team or any unit below it. Returns false if the id is unknown.
    pub fn rename(&mut self, id: TeamUnitId, name: impl Into<String>) -> bool {
        if self.root.id == id {
            self.root.name = name.into();
            return true;
        }
        match find_unit_mut(&mut self.root, id) {
            Some(unit) => {
                unit.set_name(name);
                true
            }
            None => false,
        }
    }

    /// Add a unit to the end of a team.
    pub fn add_unit(&mut self, parent: TeamUnitId, unit: TeamUnit) -> Result<(), DomainError> {
        let team = self.team_mut(parent)?;
        team.units.push(unit);
        Ok(())
    }

    /// Detach a unit (and its subtree) from the hierarchy.
    pub fn remove_unit(&mut self, id: TeamUnitId) -> Result<TeamUnit, DomainError> {
        if self.root.id == id {
            return Err(DomainError::constraint(
                "The root of the team organization cannot be removed",
            ));
        }
        remove_from(&mut self.root, id)
            .ok_or_else(|| DomainError::not_found("TeamUnit", id.to_string()))
    }

    /// Move a unit under `new_parent` at `index` (clamped to the end).
    ///
    /// A team cannot be moved into itself or one of its descendants.
    pub fn move_unit(
        &mut self,
        id: TeamUnitId,
        new_parent: TeamUnitId,
        index: usize,
    ) -> Result<(), DomainError> {
        if id == new_parent {
            return Err(DomainError::constraint("A team cannot contain itself"));
        }
        if let Some(TeamUnit::Team(team)) = self.find(id) {
            if team.contains(new_parent) {
                return Err(DomainError::constraint(
                    "A team cannot be moved into one of its own sub-teams",
                ));
            }
        }
        // Check the destination before detaching so a failed move leaves the tree intact
        self.team_mut(new_parent)?;

        let unit = self.remove_unit(id)?;
        let team = self.team_mut(new_parent)?;
        let index = index.min(team.units.len());
        team.units.insert(index, unit);
        Ok(())
    }

    fn team_mut(&mut self, id: TeamUnitId) -> Result<&mut Team, DomainError> {
        if self.root.id == id {
            return Ok(&mut self.root);
        }
        match find_unit_mut(&mut self.root, id) {
            Some(TeamUnit::Team(team)) => Ok(team),
            Some(TeamUnit::Member(_)) => Err(DomainError::constraint(
                "Team members cannot contain other units",
            )),
            None => Err(DomainError::not_found("Team", id.to_string())),
        }
    }
}

fn find_unit_mut(team: &mut Team, id: TeamUnitId) -> Option<&mut TeamUnit> {
    for unit in team.units.iter_mut() {
        if unit.id() == id {
            return Some(unit);
        }
        if let TeamUnit::Team(child) = unit {
            if let Some(found) = find_unit_mut(child, id) {
                return Some(found);
            }
        }
    }
    None
}

fn remove_from(team: &mut Team, id: TeamUnitId) -> Option<TeamUnit> {
    if let Some(pos) = team.units.iter().position(|u| u.id() == id) {
        return Some(team.units.remove(pos));
    }
    team.units.iter_mut().find_map(|unit| match unit {
        TeamUnit::Team(child) => remove_from(child, id),
        TeamUnit::Member(_) => None,
    })
}
