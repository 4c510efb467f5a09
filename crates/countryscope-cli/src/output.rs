use std::io::Write;

use countryscope_core::{Country, ListStatus, QuerySnapshot, ViewQuery};
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;

use crate::cli::OutputFormat;
use crate::error::CliError;

const COLUMNS: [&str; 4] = ["NAME", "CAPITAL", "REGION", "POPULATION"];

/// Renders the list view: status line plus rows.
pub fn render_list<W: Write>(
    out: &mut W,
    status: &ListStatus,
    rows: &[&Country],
    query: &ViewQuery,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = json!({
                "status": status,
                "query": {
                    "search_term": query.search_term,
                    "sort": query.sort_field,
                    "order": query.sort_order,
                },
                "countries": rows,
            });
            write_json(out, &payload, pretty)
        }
        OutputFormat::Table => render_list_table(out, status, rows, query),
    }
}

fn render_list_table<W: Write>(
    out: &mut W,
    status: &ListStatus,
    rows: &[&Country],
    query: &ViewQuery,
) -> Result<(), CliError> {
    match status {
        ListStatus::Showing { .. } if !query.search_term.is_empty() => {
            writeln!(out, "{} matching \"{}\"", status.message(), query.search_term)?;
        }
        ListStatus::NoMatches { .. } => {
            writeln!(out, "{}", status.message())?;
            writeln!(out, "Try adjusting your search term")?;
            return Ok(());
        }
        _ => writeln!(out, "{}", status.message())?,
    }

    if rows.is_empty() {
        return Ok(());
    }

    let cells = rows
        .iter()
        .map(|country| {
            [
                country.name.common.clone(),
                country.primary_capital().unwrap_or("N/A").to_owned(),
                country.region.clone(),
                country.formatted_population(),
            ]
        })
        .collect::<Vec<_>>();

    let mut widths = COLUMNS.map(|header| header.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "{:<w0$}  {:<w1$}  {:<w2$}  {:>w3$}",
        COLUMNS[0],
        COLUMNS[1],
        COLUMNS[2],
        COLUMNS[3],
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3],
    )?;
    for [name, capital, region, population] in &cells {
        writeln!(
            out,
            "{:<w0$}  {:<w1$}  {:<w2$}  {:>w3$}",
            name,
            capital,
            region,
            population,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
        )?;
    }

    Ok(())
}

/// Renders the detail view of one country.
pub fn render_detail<W: Write>(
    out: &mut W,
    country: &Country,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => write_json(out, &detail_json(country), pretty),
        OutputFormat::Table => {
            writeln!(out, "{}", country.name.common)?;
            writeln!(out, "{}", country.native_name())?;
            writeln!(out, "flag        : {} ({})", country.flags.png, country.flag_alt())?;
            writeln!(out)?;
            writeln!(out, "Basic Information")?;
            writeln!(
                out,
                "  capital     : {}",
                country.primary_capital().unwrap_or("N/A")
            )?;
            writeln!(out, "  region      : {}", country.region)?;
            writeln!(out, "  population  : {}", country.formatted_population())?;
            writeln!(out, "  coordinates : {}", country.coordinates)?;

            if let Some((_, currency)) = country.primary_currency() {
                writeln!(out)?;
                writeln!(out, "Currency")?;
                writeln!(out, "  {currency}")?;
            }

            if !country.timezones.is_empty() {
                writeln!(out)?;
                writeln!(out, "Timezones")?;
                for timezone in &country.timezones {
                    writeln!(out, "  {timezone}")?;
                }
            }
            Ok(())
        }
    }
}

fn detail_json(country: &Country) -> Value {
    json!({
        "name": country.name.common,
        "official_name": country.name.official,
        "native_name": country.native_name(),
        "flag": { "png": country.flags.png, "alt": country.flag_alt() },
        "capital": country.primary_capital(),
        "region": country.region,
        "population": country.population,
        "population_display": country.formatted_population(),
        "coordinates": country.coordinates,
        "currency": country.primary_currency().map(|(code, currency)| json!({
            "code": code,
            "name": currency.name,
            "symbol": currency.symbol,
        })),
        "timezones": country.timezones,
    })
}

/// Renders cache state for the `status` explorer command.
pub fn render_snapshot<W: Write>(out: &mut W, snapshot: &QuerySnapshot) -> Result<(), CliError> {
    let updated_at = snapshot
        .updated_at
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_else(|| String::from("never"));

    writeln!(out, "records     : {}", snapshot.records().len())?;
    writeln!(out, "updated_at  : {updated_at}")?;
    writeln!(out, "stale       : {}", snapshot.is_stale)?;
    writeln!(out, "fetching    : {}", snapshot.is_fetching)?;
    if let Some(error) = &snapshot.error {
        writeln!(out, "last_error  : {}: {}", error.code(), error.message())?;
    }
    Ok(())
}

fn write_json<W: Write>(out: &mut W, payload: &Value, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(payload)?
    } else {
        serde_json::to_string(payload)?
    };
    writeln!(out, "{payload}")?;
    Ok(())
}
