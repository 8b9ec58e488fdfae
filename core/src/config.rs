//! Session configuration: every compiled-in starting value.

use crate::{
    catalog::EventCatalog,
    citizenship::{
        Citizen, CitizenshipRequirement, CitizenshipStats, CitizenshipStatus, Contributions,
        MilitaryService,
    },
    clock::GameDate,
    economics_subsystem::{
        EconomyConfig, ExpenseCategories, ExpenseCategory, IncomeSource, IncomeSources, TaxRate,
        TaxRateId, TaxRates,
    },
    error::SimResult,
    ledger::{ResourceKind, ResourceSpec},
    military::{TrainingCourse, TrainingLevel, TrainingType},
};

pub const START_YEAR: i32 = 2157;
pub const START_MONTH: u32 = 3;
pub const ACTIONS_PER_TURN: u32 = 3;

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub resources:         Vec<ResourceSpec>,
    pub economy:           EconomyConfig,
    pub catalog:           EventCatalog,
    pub start_date:        GameDate,
    pub actions_per_turn:  u32,
    pub citizens:          Vec<Citizen>,
    pub citizenship_stats: CitizenshipStats,
    pub courses:           Vec<TrainingCourse>,
}

impl SimConfig {
    /// The compiled-in defaults, including the embedded event catalog.
    pub fn standard() -> SimResult<Self> {
        Ok(Self::with_catalog(EventCatalog::standard()?))
    }

    /// Compiled-in defaults with the event catalog read from
    /// `{data_dir}/events/random_events.json`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/events/random_events.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let catalog = EventCatalog::from_json(&content)
            .map_err(|e| anyhow::anyhow!("Cannot load {path}: {e}"))?;
        log::info!("config: loaded {} events from {path}", catalog.len());
        Ok(Self::with_catalog(catalog))
    }

    /// Compiled-in defaults around the given catalog. Tests use this with
    /// hand-built catalogs to control which events can fire.
    pub fn with_catalog(catalog: EventCatalog) -> Self {
        Self {
            resources: standard_resources(),
            economy: standard_economy(),
            catalog,
            start_date: GameDate::new(START_YEAR, START_MONTH),
            actions_per_turn: ACTIONS_PER_TURN,
            citizens: standard_citizens(),
            citizenship_stats: CitizenshipStats {
                total_population: 20_000,
                citizens: 5_420,
                trainees: 2_180,
                civilians: 12_400,
            },
            courses: standard_courses(),
        }
    }

    pub fn resource_spec_mut(&mut self, kind: ResourceKind) -> Option<&mut ResourceSpec> {
        self.resources.iter_mut().find(|r| r.kind == kind)
    }
}

#[allow(clippy::too_many_arguments)]
fn resource(
    kind: ResourceKind,
    name: &str,
    initial: f64,
    max: f64,
    min: f64,
    critical: f64,
    warning: f64,
    unit: &str,
    decay_rate: f64,
    grace_turns: Option<u32>,
) -> ResourceSpec {
    ResourceSpec {
        kind,
        name: name.into(),
        initial,
        max,
        min,
        critical_threshold: critical,
        warning_threshold: warning,
        unit: unit.into(),
        decay_rate,
        grace_turns,
    }
}

fn standard_resources() -> Vec<ResourceSpec> {
    use ResourceKind::*;
    vec![
        // Negative minimum: the colony may run into debt.
        resource(Credits,    "Credits",    100_000.0, 1_000_000.0, -50_000.0, 1_000.0, 10_000.0, "Cr",     0.02, None),
        resource(Population, "Population",  20_000.0,    25_000.0,       0.0, 1_000.0,  5_000.0, "people", 0.01, None),
        resource(Food,       "Food",        10_000.0,    15_000.0,       0.0, 1_000.0,  3_000.0, "t",      0.05, Some(3)),
        resource(Energy,     "Energy",       8_000.0,    10_000.0,       0.0, 1_000.0,  2_000.0, "MW",     0.03, Some(2)),
        resource(Military,   "Military",     5_000.0,     8_000.0,       0.0,   500.0,  1_000.0, "units",  0.02, None),
        resource(Support,    "Support",        100.0,       100.0,       0.0,    20.0,     40.0, "%",      0.01, Some(5)),
    ]
}

fn income(id: &str, name: &str, base_amount: f64, description: &str) -> IncomeSource {
    IncomeSource {
        id: id.into(),
        name: name.into(),
        base_amount,
        multiplier: 1.0,
        description: description.into(),
    }
}

fn expense(id: &str, name: &str, base_amount: f64, required: bool, description: &str) -> ExpenseCategory {
    ExpenseCategory {
        id: id.into(),
        name: name.into(),
        base_amount,
        multiplier: 1.0,
        required,
        description: description.into(),
    }
}

fn standard_economy() -> EconomyConfig {
    EconomyConfig {
        income: IncomeSources {
            citizen_tax: income("citizen_tax", "Citizen tax", 10.0, "Base tax per colonist"),
            corporate_tax: income("corporate_tax", "Corporate tax", 1_000.0, "Tax on companies and facilities"),
            trade: income("trade", "Trade income", 5_000.0, "Revenue from trade with other colonies"),
        },
        expenses: ExpenseCategories {
            maintenance: expense("maintenance", "Facility maintenance", 500.0, true, "Upkeep of colony facilities"),
            military: expense("military", "Military upkeep", 20.0, true, "Cost per military unit"),
            research: expense("research", "Research & development", 5_000.0, false, "Investment in research"),
            welfare: expense("welfare", "Welfare", 5.0, true, "Welfare services per colonist"),
        },
        tax_rates: TaxRates {
            citizen_tax: TaxRate {
                id: TaxRateId::CitizenTax,
                name: "Citizen tax rate".into(),
                rate: 10.0,
                description: "Tax rate on ordinary colonists".into(),
                affects_support: -0.5,
            },
            corporate_tax: TaxRate {
                id: TaxRateId::CorporateTax,
                name: "Corporate tax rate".into(),
                rate: 15.0,
                description: "Tax rate on companies".into(),
                affects_support: -0.3,
            },
        },
    }
}

fn requirements(done: [bool; 3]) -> Vec<CitizenshipRequirement> {
    let defs = [
        ("1", "Basic training", "Complete basic military training"),
        ("2", "Citizenship exam", "Pass the federal citizenship exam"),
        ("3", "Constitution", "Understand and swear to the federal constitution"),
    ];
    defs.iter()
        .zip(done)
        .map(|((id, name, description), completed)| CitizenshipRequirement {
            id: (*id).into(),
            name: (*name).into(),
            description: (*description).into(),
            completed,
        })
        .collect()
}

fn standard_citizens() -> Vec<Citizen> {
    vec![
        Citizen {
            id: "1".into(),
            name: "Johnny Rico".into(),
            status: CitizenshipStatus::Citizen,
            military_service: MilitaryService { started: true, completed: true, years_served: 2 },
            requirements: requirements([true, true, true]),
            voting_rights: true,
            contributions: Contributions { military: 850.0, civil: 320.0, research: 150.0 },
        },
        Citizen {
            id: "2".into(),
            name: "Carmen Ibanez".into(),
            status: CitizenshipStatus::Trainee,
            military_service: MilitaryService { started: true, completed: false, years_served: 1 },
            requirements: requirements([true, false, false]),
            voting_rights: false,
            contributions: Contributions { military: 450.0, civil: 200.0, research: 80.0 },
        },
        Citizen {
            id: "3".into(),
            name: "Ace Levy".into(),
            status: CitizenshipStatus::Civilian,
            military_service: MilitaryService::default(),
            requirements: requirements([false, false, false]),
            voting_rights: false,
            contributions: Contributions { military: 0.0, civil: 150.0, research: 300.0 },
        },
    ]
}

fn standard_courses() -> Vec<TrainingCourse> {
    vec![
        TrainingCourse {
            id: "1".into(),
            training_type: TrainingType::BasicTraining,
            name: "Basic military training".into(),
            description: "The federal basic training programme, mandatory for every citizenship applicant.".into(),
            duration_weeks: 8,
            required_for_citizenship: true,
            prerequisites: vec![],
            level: TrainingLevel::NotStarted,
            progress: 0.0,
        },
        TrainingCourse {
            id: "2".into(),
            training_type: TrainingType::PoweredSuit,
            name: "Powered suit operation".into(),
            description: "Piloting and tactical use of combat powered suits.".into(),
            duration_weeks: 12,
            required_for_citizenship: false,
            prerequisites: vec![TrainingType::BasicTraining],
            level: TrainingLevel::NotStarted,
            progress: 0.0,
        },
        TrainingCourse {
            id: "3".into(),
            training_type: TrainingType::AlienCombat,
            name: "Alien combat".into(),
            description: "Specialised training for engaging hostile alien life.".into(),
            duration_weeks: 10,
            required_for_citizenship: false,
            prerequisites: vec![TrainingType::BasicTraining, TrainingType::PoweredSuit],
            level: TrainingLevel::NotStarted,
            progress: 0.0,
        },
    ]
}
