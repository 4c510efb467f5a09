use std::io::Write;
use std::process::ExitCode;

use countryscope_core::{ListStatus, ViewQuery};

use crate::cli::ListArgs;
use crate::error::CliError;
use crate::output;

use super::{Session, FETCH_FAILED};

pub async fn run(args: &ListArgs, session: &Session) -> Result<ExitCode, CliError> {
    // The error is recorded on the snapshot; classification reads it there.
    let _ = session.cache.fetch().await;
    let snapshot = session.cache.snapshot().await;

    let query = ViewQuery::new(args.search.as_str(), args.sort.into(), args.order.into());
    let rows = query.apply(snapshot.records());
    let status = ListStatus::classify(&snapshot, rows.len(), &query.search_term);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    output::render_list(&mut out, &status, &rows, &query, session.format, session.pretty)?;
    out.flush()?;

    Ok(match status {
        ListStatus::Failed { .. } => ExitCode::from(FETCH_FAILED),
        _ => ExitCode::SUCCESS,
    })
}
