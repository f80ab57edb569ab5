use anyhow::Result;

use crate::core::error::SearchError;
use crate::core::search::{search_file, ErrorResult, SearchRequest};
use crate::ui::search_display;

pub struct SearchOptions {
    pub file: String,
    pub keyword: String,
    pub case_sensitive: bool,
    pub json: bool,
}

/// Run one search from the command line. Returns `false` when the search
/// produced an error payload.
pub fn run(options: SearchOptions) -> Result<bool> {
    let request =
        SearchRequest::new(options.file, options.keyword).with_case_sensitive(options.case_sensitive);

    match search_file(&request) {
        Ok(result) => {
            if options.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                search_display::display_results(&result);
            }
            Ok(true)
        }
        Err(e) => {
            report_error(&e, options.json)?;
            Ok(false)
        }
    }
}

fn report_error(err: &SearchError, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&ErrorResult::from(err))?);
    } else {
        search_display::display_error(&err.to_string());
    }
    Ok(())
}
