//! Printable export of a [`FarmReport`].
//!
//! The CSV document is split into sections. Each section starts with a single
//! `[name]` row followed by a header row and its data rows:
//!
//! ```text
//! [summary]
//! metric,value
//! generated on,2025-06-18
//! ...
//! [sales]
//! date,lot,sex,quantity,buyer,employee,fed,vaccinated,total value
//! ...
//! [supplies]
//! [herd]
//! ```

use anyhow::{Context, Result};
use csv::{Writer, WriterBuilder};
use shared::{FarmReport, Sex};

/// Turns a report bundle into a document
pub trait ReportRenderer: Send + Sync {
    /// MIME type of the rendered document
    fn content_type(&self) -> &'static str;

    fn render(&self, report: &FarmReport) -> Result<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct CsvReportRenderer;

impl CsvReportRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_summary(&self, writer: &mut Writer<Vec<u8>>, report: &FarmReport) -> Result<()> {
        writer.write_record(["[summary]"])?;
        writer.write_record(["metric", "value"])?;

        let rows = [
            ("generated on", report.generated_on.to_string()),
            ("monthly sales", report.monthly_sales.total_sales.to_string()),
            ("monthly head sold", report.monthly_sales.total_quantity.to_string()),
            ("monthly revenue", money(report.monthly_sales.total_revenue)),
            ("total costs", money(report.costs.total_costs)),
            ("feed costs", money(report.costs.feed_costs)),
            ("medicine costs", money(report.costs.medicine_costs)),
            ("total head", report.herd.total.to_string()),
        ];
        for (metric, value) in rows {
            writer.write_record([metric, value.as_str()])?;
        }
        Ok(())
    }

    fn write_sales(&self, writer: &mut Writer<Vec<u8>>, report: &FarmReport) -> Result<()> {
        writer.write_record(["[sales]"])?;
        writer.write_record([
            "date",
            "lot",
            "sex",
            "quantity",
            "buyer",
            "employee",
            "fed",
            "vaccinated",
            "total value",
        ])?;

        for entry in &report.sales {
            let sale = &entry.sale;
            writer.write_record([
                sale.date.to_string().as_str(),
                sale.lot.as_str(),
                sex_label(sale.sex),
                sale.quantity.to_string().as_str(),
                entry.buyer_name.as_str(),
                entry.employee_name.as_str(),
                yes_no(sale.is_fed),
                yes_no(sale.is_vaccinated),
                money(sale.total_value).as_str(),
            ])?;
        }
        Ok(())
    }

    fn write_supplies(&self, writer: &mut Writer<Vec<u8>>, report: &FarmReport) -> Result<()> {
        writer.write_record(["[supplies]"])?;
        writer.write_record(["name", "type", "quantity", "unit", "unit cost", "total cost"])?;

        for entry in &report.supplies {
            let supply = &entry.supply;
            writer.write_record([
                supply.name.as_str(),
                supply.supply_type.to_string().as_str(),
                supply.quantity.to_string().as_str(),
                supply.unit.as_str(),
                money(supply.cost).as_str(),
                money(entry.total_cost).as_str(),
            ])?;
        }
        Ok(())
    }

    fn write_herd(&self, writer: &mut Writer<Vec<u8>>, report: &FarmReport) -> Result<()> {
        writer.write_record(["[herd]"])?;
        writer.write_record(["lot", "head", "percentage", "color"])?;

        for lot in &report.herd.by_lot {
            writer.write_record([
                lot.lot.as_str(),
                lot.count.to_string().as_str(),
                format!("{:.1}", lot.percentage).as_str(),
                lot.color.as_deref().unwrap_or(""),
            ])?;
        }
        Ok(())
    }
}

impl ReportRenderer for CsvReportRenderer {
    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn render(&self, report: &FarmReport) -> Result<String> {
        // Sections have different widths
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

        self.write_summary(&mut writer, report)
            .context("writing summary section")?;
        self.write_sales(&mut writer, report)
            .context("writing sales section")?;
        self.write_supplies(&mut writer, report)
            .context("writing supplies section")?;
        self.write_herd(&mut writer, report)
            .context("writing herd section")?;

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flushing report: {}", e.error()))?;
        String::from_utf8(bytes).context("report is not valid UTF-8")
    }
}

fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn sex_label(sex: Sex) -> &'static str {
    match sex {
        Sex::Female => "female",
        Sex::Male => "male",
    }
}
