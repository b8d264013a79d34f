use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::Amount;
use crate::engine::EngineError;
use crate::model::{Availability, Change, Collection, Command, Listing, Outcome, Refund, Restock};
use crate::operator::AccessDenied;

/// Errors that can occur when reading csv scripts
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized action '{action}'")]
    UnrecognizedAction { line: usize, action: String },

    #[error("line {line}: {action} missing {field}")]
    MissingField {
        line: usize,
        action: String,
        field: &'static str,
    },

    #[error("line {line}: {action} has invalid {field} {value}")]
    InvalidField {
        line: usize,
        action: String,
        field: &'static str,
        value: i64,
    },
}

/// A parsed script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRow {
    pub line: usize,
    pub command: Command,
    /// Operator secret supplied on the line, if any.
    pub secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InputRow {
    action: String,
    value: Option<i64>,
    name: Option<String>,
    quantity: Option<i64>,
    secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    name: String,
    price: i64,
    quantity: i64,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    action: &'a str,
    status: &'a str,
    balance: String,
    detail: String,
}

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>, CsvError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })
}

/// Read a command script from a csv file
///
/// Header: `action,value,name,quantity,secret`. `buy` takes the 1-based item
/// number shown by `list`.
pub fn read_script(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<ScriptRow, CsvError>>, CsvError> {
    let reader = open(path.as_ref())?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            // header is line 1
            let line = idx + 2;
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            let command = parse_command(line, &row)?;
            Ok(ScriptRow {
                line,
                command,
                secret: row.secret,
            })
        }))
}

fn parse_command(line: usize, row: &InputRow) -> Result<Command, CsvError> {
    let action = row.action.to_lowercase();
    let value = |field: &'static str| {
        row.value.ok_or_else(|| CsvError::MissingField {
            line,
            action: action.clone(),
            field,
        })
    };
    let invalid = |field: &'static str, value: i64| CsvError::InvalidField {
        line,
        action: action.clone(),
        field,
        value,
    };

    match action.as_str() {
        "list" => Ok(Command::List),
        "insert" => {
            let coin = value("coin")?;
            let coin = u32::try_from(coin).map_err(|_| invalid("coin", coin))?;
            Ok(Command::InsertCoin(coin))
        }
        "buy" => {
            let number = value("item number")?;
            match usize::try_from(number) {
                Ok(n) if n > 0 => Ok(Command::Purchase(n - 1)),
                _ => Err(invalid("item number", number)),
            }
        }
        "refund" => Ok(Command::Refund),
        "restock" => {
            let price = value("price")?;
            let quantity = row.quantity.ok_or_else(|| CsvError::MissingField {
                line,
                action: action.clone(),
                field: "quantity",
            })?;
            Ok(Command::Restock {
                name: row.name.clone().unwrap_or_default(),
                price: Amount::from_units(price),
                quantity,
            })
        }
        "report" => Ok(Command::Report),
        "collect" => Ok(Command::Collect),
        _ => Err(CsvError::UnrecognizedAction {
            line,
            action: row.action.clone(),
        }),
    }
}

/// Read catalog seed rows (`name,price,quantity`) as restock commands
pub fn read_catalog(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Command, CsvError>>, CsvError> {
    let reader = open(path.as_ref())?;

    Ok(reader
        .into_deserialize::<CatalogRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2;
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            Ok(Command::Restock {
                name: row.name,
                price: Amount::from_units(row.price),
                quantity: row.quantity,
            })
        }))
}

/// Writes one csv row per applied command
pub struct OutcomeWriter<W: io::Write> {
    writer: csv::Writer<W>,
}

impl<W: io::Write> OutcomeWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    pub fn write(
        &mut self,
        command: &Command,
        balance: Amount,
        result: &Result<Outcome, EngineError>,
    ) -> Result<(), csv::Error> {
        let (status, detail) = match result {
            Ok(outcome) if outcome.is_short() => ("warning", render(outcome)),
            Ok(outcome) => ("ok", render(outcome)),
            Err(e) => ("error", e.to_string()),
        };
        self.writer.serialize(OutputRow {
            action: command.name(),
            status,
            balance: balance.to_string(),
            detail,
        })
    }

    /// Row for an operator command refused by the gate.
    pub fn denied(
        &mut self,
        command: &Command,
        balance: Amount,
        denied: &AccessDenied,
    ) -> Result<(), csv::Error> {
        self.writer.serialize(OutputRow {
            action: command.name(),
            status: "denied",
            balance: balance.to_string(),
            detail: denied.to_string(),
        })
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| io::Error::new(e.error().kind(), e.to_string()))
    }
}

fn render(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Listed(listing) if listing.is_empty() => "no items".to_string(),
        Outcome::Listed(listing) => listing
            .iter()
            .map(render_listing)
            .collect::<Vec<_>>()
            .join("; "),
        Outcome::Deposited { coin, .. } => format!("inserted {coin}"),
        Outcome::Sold(sale) => match &sale.change {
            Some(change) => format!(
                "sold {} for {}; change {}",
                sale.item,
                sale.price,
                render_change(change)
            ),
            None => format!("sold {} for {}", sale.item, sale.price),
        },
        Outcome::Refunded(Refund::Nothing) => "nothing to refund".to_string(),
        Outcome::Refunded(Refund::Returned(change)) => {
            format!("returned {}", render_change(change))
        }
        Outcome::Restocked(Restock::Added) => "item added".to_string(),
        Outcome::Restocked(Restock::Updated {
            previous_price: None,
        }) => "stock merged".to_string(),
        Outcome::Restocked(Restock::Updated {
            previous_price: Some(previous),
        }) => format!("stock merged; price was {previous}"),
        Outcome::Reported(report) => {
            format!("total {}; profit {}", report.total, report.profit)
        }
        Outcome::Collected(Collection::Collected(profit)) => format!("collected {profit}"),
        Outcome::Collected(Collection::NoProfit(_)) => "no profit".to_string(),
    }
}

fn render_listing(listing: &Listing) -> String {
    let status = match listing.availability {
        Availability::InStock(n) => format!("{n} left"),
        Availability::OutOfStock => "out of stock".to_string(),
    };
    format!(
        "{}. {} - {} ({status})",
        listing.number, listing.name, listing.price
    )
}

fn render_change(change: &Change) -> String {
    let coins = change
        .coins
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    match (coins.is_empty(), change.is_short()) {
        (false, false) => coins,
        (false, true) => format!("{coins}, could not return {}", change.remainder),
        (true, _) => format!("none, could not return {}", change.remainder),
    }
}
