//! Plain-text rendering of a tenor view.

use std::fmt;

use nibor_common::{format_percent, Currency, DISPLAY_DECIMALS};
use nibor_recon::{implied_yield, Criterion, CriterionOutcome, FxInputs};
use rust_decimal::Decimal;

use crate::session::TenorView;

const WEIGHT_DECIMALS: u32 = 4;
const SPREAD_DECIMALS: u32 = 2;
const SPOT_DECIMALS: u32 = 4;
const PIPS_DECIMALS: u32 = 2;
const BASE_RATE_DECIMALS: u32 = 2;

fn fixed(value: Option<Decimal>, decimals: u32) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals as usize, v.round_dp(decimals)),
        None => "—".to_string(),
    }
}

/// Text report of the shown view: header, result, inputs, steps and checks.
pub struct DrawerReport<'a> {
    view: &'a TenorView,
    funding_mode: bool,
    decimals: u32,
    stale: bool,
}

impl<'a> DrawerReport<'a> {
    pub fn new(view: &'a TenorView) -> Self {
        Self {
            view,
            funding_mode: false,
            decimals: DISPLAY_DECIMALS,
            stale: false,
        }
    }

    /// Mark the view as awaiting a re-run.
    pub fn stale(mut self, stale: bool) -> Self {
        self.stale = stale;
        self
    }

    /// Report the funding rate instead of the published rate.
    pub fn funding_mode(mut self, funding_mode: bool) -> Self {
        self.funding_mode = funding_mode;
        self
    }

    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn title(&self) -> String {
        if self.funding_mode {
            format!("Funding Rate {}", self.view.tenor)
        } else {
            format!("NIBOR {}", self.view.tenor)
        }
    }

    fn headline_rate(&self) -> Option<Decimal> {
        if self.funding_mode {
            self.view.funding_rate()
        } else {
            self.view.final_rate()
        }
    }

    /// Short summary for pasting elsewhere.
    pub fn summary(&self) -> String {
        let spread = self.view.composition().map(|c| c.spread);
        format!(
            "{} Calculation Summary\nFunding Rate: {}\nSpread: {}\nFinal NIBOR: {}\nStatus: {}\nTimestamp: {}\n",
            self.title(),
            format_percent(self.view.funding_rate(), self.decimals),
            format_percent(spread, SPREAD_DECIMALS),
            format_percent(self.view.final_rate(), self.decimals),
            self.view.status(),
            self.view.shown_at.format("%Y-%m-%d %H:%M:%S"),
        )
    }

    fn write_result(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = &self.view.result;
        writeln!(f, "Result")?;
        writeln!(f, "  App    {}", format_percent(self.headline_rate(), self.decimals))?;
        writeln!(f, "  Facit  {}", format_percent(result.facit(), self.decimals))?;
        writeln!(f, "  Delta  {}", fixed(result.delta(), self.decimals))
    }

    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}  {}  {}",
            self.title(),
            format_percent(self.headline_rate(), self.decimals),
            self.view.status()
        )?;
        writeln!(
            f,
            "  Run {} | {} UTC | {}",
            self.view.run_id,
            self.view.shown_at.format("%H:%M:%S"),
            if self.stale { "awaiting re-run" } else { "current" }
        )
    }

    fn write_inputs(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Inputs")?;

        let snapshot = &self.view.snapshot;
        for currency in Currency::ALL {
            writeln!(
                f,
                "  {:<12} {}  weight {}",
                currency.component_label(),
                format_percent(snapshot.implied_rate(currency), self.decimals),
                fixed(snapshot.weights().get(currency), WEIGHT_DECIMALS),
            )?;
            if let Some(inputs) = snapshot.fx_inputs(currency) {
                self.write_fx_inputs(f, inputs)?;
            }
        }
        Ok(())
    }

    fn write_fx_inputs(&self, f: &mut fmt::Formatter<'_>, inputs: &FxInputs) -> fmt::Result {
        let days = inputs
            .days
            .map_or_else(|| "—".to_string(), |d| d.to_string());
        writeln!(
            f,
            "    Spot {}  Pips {}  Rate {}  Days {}  Yield {}",
            fixed(inputs.spot, SPOT_DECIMALS),
            fixed(inputs.pips, PIPS_DECIMALS),
            format_percent(inputs.base_rate, BASE_RATE_DECIMALS),
            days,
            format_percent(implied_yield(inputs), self.decimals),
        )
    }

    fn write_steps(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Calculation Steps")?;

        for (i, c) in self.view.contributions().iter().enumerate() {
            let label = format!("{}. {} contribution", i + 1, c.currency);
            writeln!(
                f,
                "  {:<22} {} x {} = {}",
                label,
                fixed(c.implied_rate, self.decimals),
                fixed(c.weight, WEIGHT_DECIMALS),
                fixed(c.value, self.decimals),
            )?;
        }

        let composition = self.view.composition();
        writeln!(
            f,
            "  {:<22} = {}",
            "4. Funding rate",
            format_percent(self.view.funding_rate(), self.decimals)
        )?;

        if !self.funding_mode {
            writeln!(
                f,
                "  {:<22} + {}",
                "5. Add spread",
                format_percent(composition.map(|c| c.spread), SPREAD_DECIMALS)
            )?;
            writeln!(
                f,
                "  {:<22} = {}",
                "6. Final NIBOR",
                format_percent(self.view.final_rate(), self.decimals)
            )?;
        }

        if self.view.is_partial() {
            writeln!(f, "  (partial: missing inputs treated as zero)")?;
        }
        Ok(())
    }

    fn write_check(&self, f: &mut fmt::Formatter<'_>, criterion: &Criterion) -> fmt::Result {
        let marker = match criterion.outcome() {
            CriterionOutcome::Matched => "PASS",
            CriterionOutcome::Mismatch => "FAIL",
            CriterionOutcome::MissingInput => "MISSING",
        };
        let name = match criterion.source() {
            Some(source) => format!("{} ({})", criterion.name(), source),
            None => criterion.name().to_string(),
        };
        writeln!(
            f,
            "  [{}] {}  {} vs {}",
            marker,
            name,
            fixed(criterion.computed_value(), self.decimals),
            fixed(criterion.expected_value(), self.decimals),
        )
    }
}

impl fmt::Display for DrawerReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        self.write_result(f)?;
        self.write_inputs(f)?;
        self.write_steps(f)?;

        let result = &self.view.result;
        writeln!(f, "Checks ({}/{})", result.passed(), result.len())?;
        if result.is_empty() {
            writeln!(f, "  no facit for this tenor")?;
        }
        for criterion in result.criteria() {
            self.write_check(f, criterion)?;
        }
        for issue in result.issues() {
            writeln!(f, "  ! {}", issue)?;
        }
        Ok(())
    }
}
