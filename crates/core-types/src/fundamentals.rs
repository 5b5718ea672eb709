use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A balance-sheet or income-statement line item of a `FundamentalsSnapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItem {
    TotalDebt,
    CommonEquity,
    NetDebt,
    CashAndEquivalents,
    SharesIssued,
    InterestExpense,
    TaxProvision,
    PretaxIncome,
    NetIncome,
}

/// Up to four annual free-cash-flow figures, most recent first.
///
/// Unlike the other line items, a missing figure stays unknown and is never
/// read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FcfHistory {
    pub latest: Option<Decimal>,
    pub one_year_ago: Option<Decimal>,
    pub two_years_ago: Option<Decimal>,
    pub three_years_ago: Option<Decimal>,
}

impl FcfHistory {
    /// Builds a history from figures ordered most recent first. Extra entries are ignored.
    pub fn from_recent(values: &[Option<Decimal>]) -> Self {
        let at = |i: usize| values.get(i).copied().flatten();
        Self {
            latest: at(0),
            one_year_ago: at(1),
            two_years_ago: at(2),
            three_years_ago: at(3),
        }
    }

    /// The figure reported `years` years before the latest one (0 is the latest).
    pub fn years_ago(&self, years: usize) -> Option<Decimal> {
        match years {
            0 => self.latest,
            1 => self.one_year_ago,
            2 => self.two_years_ago,
            3 => self.three_years_ago,
            _ => None,
        }
    }
}

/// A company's financial-statement snapshot as handed over by the data layer.
///
/// Providers routinely omit items that do not apply to a company, so every
/// field is optional and `value` reads an absent item as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalsSnapshot {
    pub total_debt: Option<Decimal>,
    pub common_equity: Option<Decimal>,
    pub net_debt: Option<Decimal>,
    pub cash_and_equivalents: Option<Decimal>,
    pub shares_issued: Option<Decimal>,
    pub interest_expense: Option<Decimal>,
    pub tax_provision: Option<Decimal>,
    pub pretax_income: Option<Decimal>,
    pub net_income: Option<Decimal>,
    pub free_cash_flow: FcfHistory,
}

impl FundamentalsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a line item, consuming and returning the snapshot.
    pub fn with(mut self, item: LineItem, value: Decimal) -> Self {
        *self.slot(item) = Some(value);
        self
    }

    /// Sets the free-cash-flow history, most recent first.
    pub fn with_free_cash_flow(mut self, values: &[Option<Decimal>]) -> Self {
        self.free_cash_flow = FcfHistory::from_recent(values);
        self
    }

    /// The reported value of an item, if the source carried it.
    pub fn reported(&self, item: LineItem) -> Option<Decimal> {
        match item {
            LineItem::TotalDebt => self.total_debt,
            LineItem::CommonEquity => self.common_equity,
            LineItem::NetDebt => self.net_debt,
            LineItem::CashAndEquivalents => self.cash_and_equivalents,
            LineItem::SharesIssued => self.shares_issued,
            LineItem::InterestExpense => self.interest_expense,
            LineItem::TaxProvision => self.tax_provision,
            LineItem::PretaxIncome => self.pretax_income,
            LineItem::NetIncome => self.net_income,
        }
    }

    /// The value of an item, with absent items read as zero.
    pub fn value(&self, item: LineItem) -> Decimal {
        self.reported(item).unwrap_or(Decimal::ZERO)
    }

    fn slot(&mut self, item: LineItem) -> &mut Option<Decimal> {
        match item {
            LineItem::TotalDebt => &mut self.total_debt,
            LineItem::CommonEquity => &mut self.common_equity,
            LineItem::NetDebt => &mut self.net_debt,
            LineItem::CashAndEquivalents => &mut self.cash_and_equivalents,
            LineItem::SharesIssued => &mut self.shares_issued,
            LineItem::InterestExpense => &mut self.interest_expense,
            LineItem::TaxProvision => &mut self.tax_provision,
            LineItem::PretaxIncome => &mut self.pretax_income,
            LineItem::NetIncome => &mut self.net_income,
        }
    }
}
