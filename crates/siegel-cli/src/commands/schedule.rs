//! Schedule command implementation.
//!
//! Prints each instrument's cashflows discounted at its reference yield.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use siegel_core::daycounts::DayCount;
use siegel_curves::schedule::ScheduleEntry;

use crate::basket_file::BasketFile;
use crate::cli::OutputFormat;
use crate::output::{format_percent, print_csv, print_header, print_json, print_output, KeyValue};

/// Arguments for the schedule command.
#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Basket file (TOML)
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
struct InstrumentSchedule<'a> {
    name: &'a str,
    reference_yield: f64,
    total_price: f64,
    entries: &'a [ScheduleEntry],
}

#[derive(Debug, Serialize)]
struct ScheduleRecord<'a> {
    instrument: &'a str,
    date: String,
    maturity: f64,
    amount: f64,
    discount_factor: f64,
    present_value: f64,
}

#[derive(Debug, Serialize, Tabled)]
struct ScheduleRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Years")]
    maturity: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "DF")]
    discount_factor: String,
    #[tabled(rename = "PV")]
    present_value: String,
}

/// Execute the schedule command.
pub fn execute(args: ScheduleArgs, format: OutputFormat, quiet: bool) -> Result<()> {
    let file = BasketFile::load(&args.file)?;
    let schedules = file.schedules()?;

    match format {
        OutputFormat::Table => {
            if !quiet {
                print_header("Valuation");
                print_output(
                    &[
                        KeyValue::new("Valuation Date", file.valuation_date.to_string()),
                        KeyValue::new("Day Count", file.day_count.name()),
                        KeyValue::new("Instruments", file.instruments.len().to_string()),
                    ],
                    format,
                )?;
            }

            for (bond, schedule) in file.instruments.iter().zip(&schedules) {
                print_header(&format!(
                    "{} @ {} (price {:.6})",
                    bond.name(),
                    format_percent(bond.reference_yield()),
                    schedule.total_price()
                ));
                let rows: Vec<ScheduleRow> = bond
                    .cashflows()
                    .iter()
                    .zip(schedule.entries())
                    .map(|(cf, entry)| ScheduleRow {
                        date: cf.date().to_string(),
                        maturity: format!("{:.4}", entry.maturity),
                        amount: format!("{:.4}", entry.amount),
                        discount_factor: format!("{:.6}", entry.discount_factor),
                        present_value: format!("{:.6}", entry.present_value),
                    })
                    .collect();
                print_output(&rows, format)?;
            }
        }
        OutputFormat::Json => {
            let output: Vec<InstrumentSchedule<'_>> = file
                .instruments
                .iter()
                .zip(&schedules)
                .map(|(bond, schedule)| InstrumentSchedule {
                    name: bond.name(),
                    reference_yield: bond.reference_yield(),
                    total_price: schedule.total_price(),
                    entries: schedule.entries(),
                })
                .collect();
            print_json(&output)?;
        }
        OutputFormat::Csv => {
            let records: Vec<ScheduleRecord<'_>> = file
                .instruments
                .iter()
                .zip(&schedules)
                .flat_map(|(bond, schedule)| {
                    bond.cashflows()
                        .iter()
                        .zip(schedule.entries())
                        .map(move |(cf, entry)| ScheduleRecord {
                            instrument: bond.name(),
                            date: cf.date().to_string(),
                            maturity: entry.maturity,
                            amount: entry.amount,
                            discount_factor: entry.discount_factor,
                            present_value: entry.present_value,
                        })
                })
                .collect();
            print_csv(&records)?;
        }
    }

    Ok(())
}
