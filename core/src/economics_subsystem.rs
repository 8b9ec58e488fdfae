//! Economics subsystem: monthly income, expenses and the policy table.
//!
//! The calculator half of this module is PURE: income and expenses are
//! functions of the ledger, the configured tables and the active
//! policies. The only state here is the configuration the player can
//! change (tax rates, active policies) and the last month's statistics.
//!
//! Execution: first subsystem of every settlement.
//! Depends on: Population and Military levels from the ledger.

use crate::{
    error::SimResult,
    event::{EventDraft, EventType, Impact, Severity},
    ledger::{ResourceKind, ResourceLedger},
    rng::SubsystemRng,
    subsystem::{SettlementContext, SettlementOutput, SimSubsystem},
    types::{EntityId, Mutation},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeSource {
    pub id:          String,
    pub name:        String,
    pub base_amount: f64,
    pub multiplier:  f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseCategory {
    pub id:          String,
    pub name:        String,
    pub base_amount: f64,
    pub multiplier:  f64,
    pub required:    bool,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaxRateId {
    CitizenTax,
    CorporateTax,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxRate {
    pub id:              TaxRateId,
    pub name:            String,
    /// Percentage, 0–100.
    pub rate:            f64,
    pub description:     String,
    /// Declared sensitivity of support to this rate (-1.0 to 1.0).
    /// Not read by the settlement formulas.
    pub affects_support: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeSources {
    pub citizen_tax:   IncomeSource,
    pub corporate_tax: IncomeSource,
    pub trade:         IncomeSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseCategories {
    pub maintenance: ExpenseCategory,
    pub military:    ExpenseCategory,
    pub research:    ExpenseCategory,
    pub welfare:     ExpenseCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxRates {
    pub citizen_tax:   TaxRate,
    pub corporate_tax: TaxRate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomyConfig {
    pub income:    IncomeSources,
    pub expenses:  ExpenseCategories,
    pub tax_rates: TaxRates,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceEffect {
    pub resource: ResourceKind,
    pub amount:   f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PolicyEffects {
    #[serde(default)]
    pub income_multiplier:  Option<f64>,
    #[serde(default)]
    pub expense_multiplier: Option<f64>,
    /// Applied once, on activation.
    #[serde(default)]
    pub support_change:     Option<f64>,
    /// Applied once, on activation.
    #[serde(default)]
    pub resource_effects:   Vec<ResourceEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EconomicPolicy {
    pub id:          EntityId,
    pub name:        String,
    pub description: String,
    pub effects:     PolicyEffects,
    /// Declared length in turns. Kept as metadata; policies stay active
    /// until explicitly deactivated.
    #[serde(default)]
    pub duration:    Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct IncomeBreakdown {
    pub citizen_tax:   f64,
    pub corporate_tax: f64,
    pub trade:         f64,
}

impl IncomeBreakdown {
    pub fn total(&self) -> f64 {
        self.citizen_tax + self.corporate_tax + self.trade
    }

    fn scale(&mut self, factor: f64) {
        self.citizen_tax *= factor;
        self.corporate_tax *= factor;
        self.trade *= factor;
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpenseBreakdown {
    pub maintenance: f64,
    pub military:    f64,
    pub research:    f64,
    pub welfare:     f64,
}

impl ExpenseBreakdown {
    pub fn total(&self) -> f64 {
        self.maintenance + self.military + self.research + self.welfare
    }

    fn scale(&mut self, factor: f64) {
        self.maintenance *= factor;
        self.military *= factor;
        self.research *= factor;
        self.welfare *= factor;
    }
}

/// One month's books, as computed at settlement.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FinanceSummary {
    pub income:   IncomeBreakdown,
    pub expenses: ExpenseBreakdown,
}

impl FinanceSummary {
    pub fn net(&self) -> f64 {
        self.income.total() - self.expenses.total()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthlyStats {
    pub total_income:   f64,
    pub total_expenses: f64,
    pub net_profit:     f64,
    pub tax_revenue:    f64,
    pub trade_balance:  f64,
}

impl From<&FinanceSummary> for MonthlyStats {
    fn from(summary: &FinanceSummary) -> Self {
        Self {
            total_income:   summary.income.total(),
            total_expenses: summary.expenses.total(),
            net_profit:     summary.net(),
            tax_revenue:    summary.income.citizen_tax + summary.income.corporate_tax,
            trade_balance:  summary.income.trade,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Economy {
    config:          EconomyConfig,
    active_policies: Vec<EconomicPolicy>,
    monthly_stats:   MonthlyStats,
}

impl Economy {
    pub fn new(config: EconomyConfig) -> Self {
        Self {
            config,
            active_policies: Vec::new(),
            monthly_stats: MonthlyStats::default(),
        }
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn active_policies(&self) -> &[EconomicPolicy] {
        &self.active_policies
    }

    pub fn monthly_stats(&self) -> &MonthlyStats {
        &self.monthly_stats
    }

    pub fn tax_rate(&self, id: TaxRateId) -> &TaxRate {
        match id {
            TaxRateId::CitizenTax => &self.config.tax_rates.citizen_tax,
            TaxRateId::CorporateTax => &self.config.tax_rates.corporate_tax,
        }
    }

    /// Set a tax rate, clamped to 0–100 percent.
    pub fn set_tax_rate(&mut self, id: TaxRateId, rate: f64) -> Mutation {
        let target = match id {
            TaxRateId::CitizenTax => &mut self.config.tax_rates.citizen_tax,
            TaxRateId::CorporateTax => &mut self.config.tax_rates.corporate_tax,
        };
        if rate.is_nan() {
            log::debug!("economy: {id:?} rate NaN ignored");
            return Mutation::Unchanged;
        }
        let clamped = rate.clamp(0.0, 100.0);
        target.rate = clamped;
        log::debug!("economy: {id:?} rate set to {clamped:.1}%");
        if clamped == rate { Mutation::Applied } else { Mutation::Clamped }
    }

    /// Activate a policy. Activating an id that is already active is a no-op.
    pub fn activate_policy(&mut self, policy: EconomicPolicy) -> Mutation {
        if self.is_active(&policy.id) {
            return Mutation::Unchanged;
        }
        log::info!("economy: policy '{}' activated", policy.id);
        self.active_policies.push(policy);
        Mutation::Applied
    }

    pub fn deactivate_policy(&mut self, policy_id: &str) -> Mutation {
        let before = self.active_policies.len();
        self.active_policies.retain(|p| p.id != policy_id);
        if self.active_policies.len() == before {
            log::debug!("economy: deactivate ignored, '{policy_id}' is not active");
            Mutation::UnknownId
        } else {
            log::info!("economy: policy '{policy_id}' deactivated");
            Mutation::Applied
        }
    }

    pub fn is_active(&self, policy_id: &str) -> bool {
        self.active_policies.iter().any(|p| p.id == policy_id)
    }

    pub fn detailed_income(&self, ledger: &ResourceLedger) -> IncomeBreakdown {
        let src = &self.config.income;
        let rates = &self.config.tax_rates;
        let mut income = IncomeBreakdown {
            citizen_tax: ledger.current(ResourceKind::Population)
                * src.citizen_tax.base_amount
                * src.citizen_tax.multiplier
                * (rates.citizen_tax.rate / 100.0),
            // Flat: not yet scaled by facility count.
            corporate_tax: src.corporate_tax.base_amount
                * src.corporate_tax.multiplier
                * (rates.corporate_tax.rate / 100.0),
            trade: src.trade.base_amount * src.trade.multiplier,
        };
        for factor in self.active_policies.iter().filter_map(|p| p.effects.income_multiplier) {
            income.scale(factor);
        }
        income
    }

    pub fn detailed_expenses(&self, ledger: &ResourceLedger) -> ExpenseBreakdown {
        let cat = &self.config.expenses;
        let mut expenses = ExpenseBreakdown {
            maintenance: cat.maintenance.base_amount * cat.maintenance.multiplier,
            military: ledger.current(ResourceKind::Military)
                * cat.military.base_amount
                * cat.military.multiplier,
            research: cat.research.base_amount * cat.research.multiplier,
            welfare: ledger.current(ResourceKind::Population)
                * cat.welfare.base_amount
                * cat.welfare.multiplier,
        };
        for factor in self.active_policies.iter().filter_map(|p| p.effects.expense_multiplier) {
            expenses.scale(factor);
        }
        expenses
    }

    pub fn finance(&self, ledger: &ResourceLedger) -> FinanceSummary {
        FinanceSummary {
            income:   self.detailed_income(ledger),
            expenses: self.detailed_expenses(ledger),
        }
    }

    pub fn record_month(&mut self, summary: &FinanceSummary) {
        self.monthly_stats = MonthlyStats::from(summary);
    }
}

/// Month-end step that books income and expenses against Credits.
pub struct EconomicsSubsystem;

impl EconomicsSubsystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EconomicsSubsystem {
    fn default() -> Self { Self::new() }
}

impl SimSubsystem for EconomicsSubsystem {
    fn name(&self) -> &'static str { "economics" }

    fn settle(
        &mut self,
        ctx:  &SettlementContext<'_>,
        _rng: &mut SubsystemRng,
    ) -> SimResult<SettlementOutput> {
        let summary = ctx.economy.finance(ctx.ledger);
        let income = summary.income.total();
        let expenses = summary.expenses.total();
        let net = summary.net();

        log::debug!(
            "month={} economics: income={income:.0} expenses={expenses:.0} net={net:+.0}",
            ctx.date
        );

        let severity = if net >= 0.0 { Severity::Positive } else { Severity::Negative };
        let report = EventDraft::new(
            EventType::ResourceChange,
            "Monthly financial report",
            "Income and expenditure for the month.",
        )
        .impact(Impact::on(ResourceKind::Credits, income, format!("Total income: +{income:.0} Cr")))
        .impact(Impact::on(ResourceKind::Credits, -expenses, format!("Total expenses: -{expenses:.0} Cr")))
        .impact(Impact::on(ResourceKind::Credits, net, format!("Net profit: {net:+.0} Cr")))
        .severity(severity);

        let mut out = SettlementOutput::default()
            .entry(report)
            .delta(ResourceKind::Credits, net);
        out.finance = Some(summary);
        Ok(out)
    }
}
