//! Interactive explorer session over stdin.
//!
//! Every line is one command. After each state change the current view is
//! rendered again; the filtered/sorted list goes through a [`MemoizedView`]
//! so redraws with unchanged inputs skip the filter and sort.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use countryscope_core::{
    CountrySet, ExplorerState, ListStatus, MemoizedView, SortField, SortOrder, ViewQuery,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::error::CliError;
use crate::output;

use super::show::find_by_name;
use super::Session;

const GC_PERIOD: Duration = Duration::from_secs(60);

const HELP: &str = "\
commands:
  search <term>       filter by name (no term clears the filter)
  sort name|population
  order asc|desc      no argument flips the current order
  open <name|number>  show details of a country
  close               back to the list
  refresh             fetch again, ignoring the cache
  status              cache state
  help                this text
  quit";

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn run(session: &Session) -> Result<ExitCode, CliError> {
    let gc = session.cache.spawn_garbage_collector(GC_PERIOD);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    let result = Explorer::new(session).drive(stdin, &mut stdout).await;
    gc.abort();
    result.map(|()| ExitCode::SUCCESS)
}

struct Explorer<'s> {
    session: &'s Session,
    state: ExplorerState,
    memo: MemoizedView,
}

impl<'s> Explorer<'s> {
    fn new(session: &'s Session) -> Self {
        Self {
            session,
            state: ExplorerState::new(),
            memo: MemoizedView::new(),
        }
    }

    async fn drive<R, W>(&mut self, input: R, out: &mut W) -> Result<(), CliError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        // Errors land on the snapshot and are rendered from there.
        let _ = self.session.cache.fetch().await;
        self.render(out).await?;
        writeln!(out, "type 'help' for commands")?;
        out.flush()?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match self.handle(line.trim(), out).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(
                    error @ (CliError::Validation(_)
                    | CliError::UnknownCountry { .. }
                    | CliError::Command(_)),
                ) => writeln!(out, "error: {error}")?,
                Err(error) => return Err(error),
            }
            out.flush()?;
        }
        Ok(())
    }

    async fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow, CliError> {
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        debug!(command, argument, "explorer command");

        match command.to_ascii_lowercase().as_str() {
            "" => return Ok(Flow::Continue),
            "quit" | "exit" | "q" => return Ok(Flow::Quit),
            "help" | "?" => writeln!(out, "{HELP}")?,
            "search" => {
                self.state.set_search_term(argument);
                self.state.close_detail();
                self.render(out).await?;
            }
            "sort" => {
                let field = argument.parse::<SortField>()?;
                self.state.set_sort_field(field);
                self.state.close_detail();
                self.render(out).await?;
            }
            "order" => {
                let order = if argument.is_empty() {
                    self.state.sort_order().reversed()
                } else {
                    argument.parse::<SortOrder>()?
                };
                self.state.set_sort_order(order);
                self.state.close_detail();
                self.render(out).await?;
            }
            "open" => {
                self.open(argument).await?;
                self.render(out).await?;
            }
            "close" => {
                self.state.close_detail();
                self.render(out).await?;
            }
            "refresh" => {
                let _ = self.session.cache.refetch().await;
                self.render(out).await?;
            }
            "status" => {
                let snapshot = self.session.cache.snapshot().await;
                output::render_snapshot(out, &snapshot)?;
            }
            other => {
                return Err(CliError::Command(format!(
                    "unknown command '{other}', type 'help'"
                )))
            }
        }
        Ok(Flow::Continue)
    }

    /// Selects by 1-based position in the current view, else by name.
    async fn open(&mut self, argument: &str) -> Result<(), CliError> {
        if argument.is_empty() {
            return Err(CliError::Command(String::from("open needs a country name")));
        }

        let records = self.records().await;
        let query = ViewQuery::from(&self.state);
        let rows = self.memo.get(&records, &query);

        let by_position = argument
            .parse::<usize>()
            .ok()
            .and_then(|position| position.checked_sub(1))
            .and_then(|index| rows.get(index).copied());
        let country = by_position
            .or_else(|| find_by_name(&records, argument))
            .ok_or_else(|| CliError::UnknownCountry {
                name: argument.to_owned(),
            })?;

        self.state.select(country);
        Ok(())
    }

    async fn render<W: Write>(&mut self, out: &mut W) -> Result<(), CliError> {
        let snapshot = self.session.cache.snapshot().await;
        let records = snapshot
            .data
            .clone()
            .unwrap_or_else(|| Arc::from(Vec::new()));

        if let Some(country) = self.state.selected_in(&records) {
            return output::render_detail(out, country, self.session.format, self.session.pretty);
        }

        let query = ViewQuery::from(&self.state);
        let rows = self.memo.get(&records, &query);
        let status = ListStatus::classify(&snapshot, rows.len(), &query.search_term);
        output::render_list(out, &status, &rows, &query, self.session.format, self.session.pretty)
    }

    async fn records(&self) -> CountrySet {
        self.session
            .cache
            .snapshot()
            .await
            .data
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }
}
