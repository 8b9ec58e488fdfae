//! Citizenship registry: citizen records and the population breakdown.
//!
//! The stats counters are bookkeeping for the whole colony, not a count
//! of the records held here: the registry tracks a handful of named
//! citizens while the counters describe all 20,000 colonists. Adding a
//! citizen or changing a status moves the counters by one.

use crate::types::{EntityId, Mutation};
use serde::{Deserialize, Serialize};

/// Years of service after which military service counts as completed.
pub const SERVICE_YEARS_REQUIRED: u32 = 2;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CitizenshipStatus {
    Civilian,
    Trainee,
    Citizen,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CitizenshipRequirement {
    pub id:          EntityId,
    pub name:        String,
    pub description: String,
    pub completed:   bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MilitaryService {
    pub started:      bool,
    pub completed:    bool,
    pub years_served: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Contributions {
    pub military: f64,
    pub civil:    f64,
    pub research: f64,
}

/// A citizen record before it has been assigned an id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCitizen {
    pub name:             String,
    pub status:           CitizenshipStatus,
    #[serde(default)]
    pub military_service: MilitaryService,
    #[serde(default)]
    pub requirements:     Vec<CitizenshipRequirement>,
    #[serde(default)]
    pub voting_rights:    bool,
    #[serde(default)]
    pub contributions:    Contributions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citizen {
    pub id:               EntityId,
    pub name:             String,
    pub status:           CitizenshipStatus,
    pub military_service: MilitaryService,
    pub requirements:     Vec<CitizenshipRequirement>,
    pub voting_rights:    bool,
    pub contributions:    Contributions,
}

impl Citizen {
    pub fn from_new(id: EntityId, new: NewCitizen) -> Self {
        Self {
            id,
            name: new.name,
            status: new.status,
            military_service: new.military_service,
            requirements: new.requirements,
            voting_rights: new.voting_rights,
            contributions: new.contributions,
        }
    }

    pub fn requirements_met(&self) -> bool {
        self.requirements.iter().all(|r| r.completed)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CitizenshipStats {
    pub total_population: u64,
    pub citizens:         u64,
    pub trainees:         u64,
    pub civilians:        u64,
}

impl CitizenshipStats {
    fn bucket(&mut self, status: CitizenshipStatus) -> &mut u64 {
        match status {
            CitizenshipStatus::Civilian => &mut self.civilians,
            CitizenshipStatus::Trainee => &mut self.trainees,
            CitizenshipStatus::Citizen => &mut self.citizens,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitizenRegistry {
    citizens: Vec<Citizen>,
    stats:    CitizenshipStats,
}

impl CitizenRegistry {
    pub fn new(citizens: Vec<Citizen>, stats: CitizenshipStats) -> Self {
        Self { citizens, stats }
    }

    pub fn citizens(&self) -> &[Citizen] {
        &self.citizens
    }

    pub fn stats(&self) -> &CitizenshipStats {
        &self.stats
    }

    pub fn get(&self, citizen_id: &str) -> Option<&Citizen> {
        self.citizens.iter().find(|c| c.id == citizen_id)
    }

    fn get_mut(&mut self, citizen_id: &str) -> Option<&mut Citizen> {
        self.citizens.iter_mut().find(|c| c.id == citizen_id)
    }

    /// Register a citizen under a fresh UUID. Returns the new id.
    pub fn add_citizen(&mut self, new: NewCitizen) -> EntityId {
        let id = uuid::Uuid::new_v4().to_string();
        *self.stats.bucket(new.status) += 1;
        self.stats.total_population += 1;
        log::debug!("citizenship: added '{}' as {:?}", new.name, new.status);
        self.citizens.push(Citizen::from_new(id.clone(), new));
        id
    }

    pub fn update_status(&mut self, citizen_id: &str, status: CitizenshipStatus) -> Mutation {
        let Some(citizen) = self.get_mut(citizen_id) else {
            log::debug!("citizenship: status update for unknown citizen '{citizen_id}'");
            return Mutation::UnknownId;
        };
        let old = citizen.status;
        if old == status {
            return Mutation::Unchanged;
        }
        citizen.status = status;
        let old_bucket = self.stats.bucket(old);
        *old_bucket = old_bucket.saturating_sub(1);
        *self.stats.bucket(status) += 1;
        log::debug!("citizenship: '{citizen_id}' {old:?} -> {status:?}");
        Mutation::Applied
    }

    /// Record years served; service counts as completed at two years.
    pub fn update_military_service(&mut self, citizen_id: &str, years_served: u32) -> Mutation {
        let Some(citizen) = self.get_mut(citizen_id) else {
            log::debug!("citizenship: service update for unknown citizen '{citizen_id}'");
            return Mutation::UnknownId;
        };
        let service = &mut citizen.military_service;
        service.years_served = years_served;
        service.started = service.started || years_served > 0;
        service.completed = years_served >= SERVICE_YEARS_REQUIRED;
        Mutation::Applied
    }

    pub fn update_requirement(
        &mut self,
        citizen_id:     &str,
        requirement_id: &str,
        completed:      bool,
    ) -> Mutation {
        let Some(citizen) = self.get_mut(citizen_id) else {
            log::debug!("citizenship: requirement update for unknown citizen '{citizen_id}'");
            return Mutation::UnknownId;
        };
        match citizen.requirements.iter_mut().find(|r| r.id == requirement_id) {
            Some(requirement) => {
                requirement.completed = completed;
                Mutation::Applied
            }
            None => Mutation::UnknownId,
        }
    }

    /// Case-insensitive name match, optionally restricted to one status.
    pub fn search(&self, name: &str, status: Option<CitizenshipStatus>) -> Vec<&Citizen> {
        let needle = name.to_lowercase();
        self.citizens
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .filter(|c| status.map_or(true, |s| c.status == s))
            .collect()
    }
}
