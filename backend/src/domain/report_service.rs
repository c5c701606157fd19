//! Report and dashboard aggregation for the farm.
//!
//! All figures are recomputed from the collections on every call; nothing is
//! cached. Monetary sums use plain `f64` addition and are only rounded when a
//! renderer formats them.
//!
//! ## Reports
//!
//! - **Monthly sales**: sales dated in the reference month and year
//! - **Costs**: `cost × quantity` over all supplies, split by supply type
//! - **Herd**: head count per lot name with each lot's share of the herd
//! - **Recent sales**: the last entries by insertion order, newest first

use chrono::{Datelike, NaiveDate};
use shared::{
    Buyer, Cattle, CostsReport, DashboardSummary, Employee, FarmReport, HerdReport, Lot,
    LotHeadCount, MonthlySalesReport, RecentSale, ReportSale, ReportSupply, Sale, Supply,
    SupplyType, SupplyTypeTotals, MISSING_REFERENCE,
};
use std::collections::{BTreeMap, HashMap};

/// Number of sales shown on the dashboard
pub const RECENT_SALES_LIMIT: usize = 5;

/// Stateless service computing report figures from in-memory collections
#[derive(Clone, Copy, Debug, Default)]
pub struct ReportService;

impl ReportService {
    pub fn new() -> Self {
        Self
    }

    /// Sales whose date is in the same month and year as `today`
    pub fn monthly_sales_report(&self, sales: &[Sale], today: NaiveDate) -> MonthlySalesReport {
        let monthly: Vec<Sale> = sales
            .iter()
            .filter(|sale| sale.date.month() == today.month() && sale.date.year() == today.year())
            .cloned()
            .collect();

        let total_quantity = monthly.iter().map(|sale| u64::from(sale.quantity)).sum();
        let total_revenue = monthly.iter().map(|sale| sale.total_value).sum();

        MonthlySalesReport {
            total_sales: monthly.len(),
            total_quantity,
            total_revenue,
            sales: monthly,
        }
    }

    /// Quantity and cost per supply type
    pub fn supplies_by_type(&self, supplies: &[Supply]) -> BTreeMap<SupplyType, SupplyTypeTotals> {
        supplies.iter().fold(BTreeMap::new(), |mut acc, supply| {
            let totals: &mut SupplyTypeTotals = acc.entry(supply.supply_type).or_default();
            totals.quantity += supply.quantity;
            totals.cost += supply.total_cost();
            acc
        })
    }

    pub fn costs_report(&self, supplies: &[Supply]) -> CostsReport {
        let total_costs = supplies.iter().map(Supply::total_cost).sum();
        let by_type = self.supplies_by_type(supplies);
        let cost_of = |supply_type| by_type.get(&supply_type).map_or(0.0, |t| t.cost);

        CostsReport {
            total_costs,
            feed_costs: cost_of(SupplyType::Feed),
            medicine_costs: cost_of(SupplyType::Medicine),
            by_type,
        }
    }

    /// Head count per raw lot string, in first-seen order, tagged with the
    /// matching lot's color
    pub fn herd_report(&self, cattle: &[Cattle], lots: &[Lot]) -> HerdReport {
        let total = cattle.len();
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for animal in cattle {
            let count = counts.entry(animal.lot.as_str()).or_insert_with(|| {
                order.push(animal.lot.as_str());
                0
            });
            *count += 1;
        }

        // With no cattle the loop above produced no lots, so no division happens
        let by_lot = order
            .into_iter()
            .map(|lot| {
                let count = counts[lot];
                LotHeadCount {
                    lot: lot.to_string(),
                    count,
                    percentage: herd_percentage(count, total),
                    color: self.lot_color(lots, lot).map(str::to_string),
                }
            })
            .collect();

        HerdReport { total, by_lot }
    }

    /// Last entries by insertion order, most recently entered first
    pub fn recent_sales(&self, sales: &[Sale]) -> Vec<Sale> {
        sales.iter().rev().take(RECENT_SALES_LIMIT).cloned().collect()
    }

    pub fn buyer_name<'a>(&self, buyers: &'a [Buyer], buyer_id: &str) -> &'a str {
        buyers
            .iter()
            .find(|buyer| buyer.id == buyer_id)
            .map_or(MISSING_REFERENCE, |buyer| buyer.name.as_str())
    }

    pub fn employee_name<'a>(&self, employees: &'a [Employee], employee_id: &str) -> &'a str {
        employees
            .iter()
            .find(|employee| employee.id == employee_id)
            .map_or(MISSING_REFERENCE, |employee| employee.name.as_str())
    }

    /// Color of the lot with this name, if the lot still exists
    pub fn lot_color<'a>(&self, lots: &'a [Lot], lot_name: &str) -> Option<&'a str> {
        lots.iter()
            .find(|lot| lot.name == lot_name)
            .map(|lot| lot.color.as_str())
    }

    pub fn dashboard(
        &self,
        cattle: &[Cattle],
        buyers: &[Buyer],
        supplies: &[Supply],
        sales: &[Sale],
        lots: &[Lot],
        today: NaiveDate,
    ) -> DashboardSummary {
        let monthly = self.monthly_sales_report(sales, today);
        let recent_sales = self
            .recent_sales(sales)
            .into_iter()
            .map(|sale| RecentSale {
                buyer_name: self.buyer_name(buyers, &sale.buyer_id).to_string(),
                sale,
            })
            .collect();

        DashboardSummary {
            total_cattle: cattle.len(),
            monthly_sales: monthly.total_sales,
            monthly_revenue: monthly.total_revenue,
            total_costs: self.costs_report(supplies).total_costs,
            herd: self.herd_report(cattle, lots),
            recent_sales,
        }
    }

    /// Bundle of aggregates and raw records handed to a report renderer
    pub fn farm_report(
        &self,
        cattle: &[Cattle],
        buyers: &[Buyer],
        employees: &[Employee],
        supplies: &[Supply],
        sales: &[Sale],
        lots: &[Lot],
        today: NaiveDate,
    ) -> FarmReport {
        let report_sales = sales
            .iter()
            .map(|sale| ReportSale {
                buyer_name: self.buyer_name(buyers, &sale.buyer_id).to_string(),
                employee_name: self.employee_name(employees, &sale.employee_id).to_string(),
                sale: sale.clone(),
            })
            .collect();
        let report_supplies = supplies
            .iter()
            .map(|supply| ReportSupply {
                total_cost: supply.total_cost(),
                supply: supply.clone(),
            })
            .collect();

        FarmReport {
            generated_on: today,
            monthly_sales: self.monthly_sales_report(sales, today),
            costs: self.costs_report(supplies),
            herd: self.herd_report(cattle, lots),
            sales: report_sales,
            supplies: report_supplies,
        }
    }
}

/// `count / total × 100` rounded half away from zero to one decimal.
/// Callers never pass `total == 0`.
fn herd_percentage(count: usize, total: usize) -> f64 {
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}
