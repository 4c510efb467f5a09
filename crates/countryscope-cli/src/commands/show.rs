use std::io::Write;
use std::process::ExitCode;

use countryscope_core::Country;

use crate::cli::ShowArgs;
use crate::error::CliError;
use crate::output;

use super::{Session, FETCH_FAILED};

pub async fn run(args: &ShowArgs, session: &Session) -> Result<ExitCode, CliError> {
    let name = args.name.trim();
    if name.is_empty() {
        return Err(CliError::Command(String::from("country name must not be empty")));
    }

    let countries = match session.cache.fetch().await {
        Ok(countries) => countries,
        Err(error) => {
            eprintln!("{}", error.user_message());
            return Ok(ExitCode::from(FETCH_FAILED));
        }
    };

    let country = find_by_name(&countries, name).ok_or_else(|| CliError::UnknownCountry {
        name: name.to_owned(),
    })?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    output::render_detail(&mut out, country, session.format, session.pretty)?;
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

/// First record whose common or official name equals `name`, ignoring case.
pub fn find_by_name<'a>(countries: &'a [Country], name: &str) -> Option<&'a Country> {
    let needle = name.to_lowercase();
    countries.iter().find(|country| {
        country.name.common.to_lowercase() == needle
            || country.name.official.to_lowercase() == needle
    })
}

#[cfg(test)]
mod tests {
    use countryscope_core::parse_countries;

    use super::*;

    #[test]
    fn matches_common_or_official_name_ignoring_case() {
        let countries = parse_countries(
            r#"[{"name":{"common":"Chad","official":"Republic of Chad"},
                 "flags":{"png":"td.png"},"region":"Africa","latlng":[15,19],"population":1,
                 "timezones":[],"currencies":{},"capital":[]}]"#,
        )
        .expect("parses");

        assert!(find_by_name(&countries, "chad").is_some());
        assert!(find_by_name(&countries, "REPUBLIC OF CHAD").is_some());
        assert!(find_by_name(&countries, "Cha").is_none());
    }
}
