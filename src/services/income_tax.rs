// src/services/income_tax.rs

use rust_decimal::Decimal;

use crate::models::tools::{FilingStatus, IncomeTaxPayload, IncomeTaxReport, IncomeTaxResults};

// 2025 US federal brackets: (upper bound of the bracket, rate in percent).
// The last bracket is open-ended.
const SINGLE: &[(Option<i64>, i64)] = &[
    (Some(11_925), 10),
    (Some(48_475), 12),
    (Some(103_350), 22),
    (Some(197_300), 24),
    (Some(250_525), 32),
    (Some(626_350), 35),
    (None, 37),
];

const MARRIED_JOINTLY: &[(Option<i64>, i64)] = &[
    (Some(23_850), 10),
    (Some(96_950), 12),
    (Some(206_700), 22),
    (Some(394_600), 24),
    (Some(501_050), 32),
    (Some(751_600), 35),
    (None, 37),
];

const MARRIED_SEPARATELY: &[(Option<i64>, i64)] = &[
    (Some(11_925), 10),
    (Some(48_475), 12),
    (Some(103_350), 22),
    (Some(197_300), 24),
    (Some(250_525), 32),
    (Some(375_800), 35),
    (None, 37),
];

const HEAD_OF_HOUSEHOLD: &[(Option<i64>, i64)] = &[
    (Some(17_000), 10),
    (Some(64_850), 12),
    (Some(103_350), 22),
    (Some(197_300), 24),
    (Some(250_500), 32),
    (Some(626_350), 35),
    (None, 37),
];

fn brackets(status: FilingStatus) -> &'static [(Option<i64>, i64)] {
    match status {
        FilingStatus::Single => SINGLE,
        FilingStatus::MarriedJointly => MARRIED_JOINTLY,
        FilingStatus::MarriedSeparately => MARRIED_SEPARATELY,
        FilingStatus::HeadOfHousehold => HEAD_OF_HOUSEHOLD,
    }
}

/// Federal tax on `taxable` and the rate applied to the next dollar earned.
pub fn federal_tax(taxable: Decimal, status: FilingStatus) -> (Decimal, Decimal) {
    let hundred = Decimal::ONE_HUNDRED;
    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    let mut marginal = None;

    for &(upper, rate) in brackets(status) {
        let rate = Decimal::from(rate);
        let upper = upper.map(Decimal::from);

        if marginal.is_none() && upper.is_none_or(|u| taxable < u) {
            marginal = Some(rate);
        }
        if taxable > lower {
            let top = upper.map_or(taxable, |u| u.min(taxable));
            tax += (top - lower) * rate / hundred;
        }
        match upper {
            Some(u) => lower = u,
            None => break,
        }
    }

    (tax.round_dp(2), marginal.unwrap_or(Decimal::ZERO))
}

pub fn income_tax_report(inputs: IncomeTaxPayload) -> IncomeTaxReport {
    let taxable_income = (inputs.gross_income - inputs.deductions).max(Decimal::ZERO);
    let (tax_before_credits, marginal_rate) = federal_tax(taxable_income, inputs.filing_status);
    let final_tax_owed = (tax_before_credits - inputs.credits).max(Decimal::ZERO);

    let effective_rate = if inputs.gross_income > Decimal::ZERO {
        (final_tax_owed / inputs.gross_income * Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    };

    let results = IncomeTaxResults {
        gross_income: inputs.gross_income,
        total_deductions: inputs.deductions,
        taxable_income,
        tax_before_credits,
        tax_credits: inputs.credits,
        final_tax_owed,
        effective_tax_rate_percent: effective_rate,
        marginal_tax_rate_percent: marginal_rate,
    };

    IncomeTaxReport { inputs, results }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars(amount: i64) -> Decimal {
        Decimal::from(amount)
    }

    fn payload(gross: i64, deductions: i64, credits: i64, filing_status: FilingStatus) -> IncomeTaxPayload {
        IncomeTaxPayload {
            gross_income: dollars(gross),
            deductions: dollars(deductions),
            credits: dollars(credits),
            filing_status,
        }
    }

    #[test]
    fn single_filer_spans_three_brackets() {
        // 1192.50 + 4386.00 + 335.50
        let (tax, marginal) = federal_tax(dollars(50_000), FilingStatus::Single);
        assert_eq!(tax, Decimal::new(591_400, 2));
        assert_eq!(marginal, dollars(22));
    }

    #[test]
    fn bracket_edge_moves_the_marginal_rate_up() {
        let (tax, marginal) = federal_tax(dollars(23_850), FilingStatus::MarriedJointly);
        assert_eq!(tax, dollars(2_385));
        assert_eq!(marginal, dollars(12));
    }

    #[test]
    fn top_bracket_is_open_ended() {
        let (_, marginal) = federal_tax(dollars(5_000_000), FilingStatus::HeadOfHousehold);
        assert_eq!(marginal, dollars(37));
    }

    #[test]
    fn report_applies_deductions_then_credits() {
        let report = income_tax_report(payload(120_000, 30_000, 2_000, FilingStatus::MarriedJointly));
        let results = report.results;

        assert_eq!(results.taxable_income, dollars(90_000));
        assert_eq!(results.tax_before_credits, dollars(10_323));
        assert_eq!(results.final_tax_owed, dollars(8_323));
        assert_eq!(results.effective_tax_rate_percent, Decimal::new(694, 2));
        assert_eq!(results.marginal_tax_rate_percent, dollars(12));
    }

    #[test]
    fn amounts_never_go_negative() {
        let report = income_tax_report(payload(10_000, 25_000, 500, FilingStatus::Single));
        assert_eq!(report.results.taxable_income, Decimal::ZERO);
        assert_eq!(report.results.final_tax_owed, Decimal::ZERO);

        let report = income_tax_report(payload(0, 0, 0, FilingStatus::Single));
        assert_eq!(report.results.effective_tax_rate_percent, Decimal::ZERO);
        assert_eq!(report.results.marginal_tax_rate_percent, dollars(10));
    }

    #[test]
    fn filing_status_defaults_to_married_jointly() {
        let inputs: IncomeTaxPayload = serde_json::from_str(r#"{"gross_income":50000}"#).unwrap();
        assert_eq!(inputs.filing_status, FilingStatus::MarriedJointly);
        assert_eq!(inputs.deductions, Decimal::ZERO);
    }
}
