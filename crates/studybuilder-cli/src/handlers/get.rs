//! Generic read command handler

use super::utils::{add_filters, params_from_pairs};
use crate::cli::GetArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use serde_json::{json, Value};
use studybuilder_core::resources::fetch_all_pages;
use studybuilder_core::Gateway;

/// Rows per page when following pagination without an explicit size
const DEFAULT_PAGE_SIZE: u64 = 100;

/// Handle the get command
pub async fn handle_get(args: GetArgs, gateway: &Gateway, output: &mut OutputWriter) -> Result<()> {
    let mut params = params_from_pairs(&args.params);
    add_filters(&mut params, args.filters.as_deref())?;

    if args.all {
        // A negative size means "everything", which is one call anyway
        let page_size = args
            .page_size
            .map(|size| size.max(0) as u64)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let spinner = output.spinner(&format!("Fetching {}", args.path));
        let items = fetch_all_pages::<Value>(gateway, &args.path, &params, page_size).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let items = items?;

        let total = items.len();
        return output.payload(&json!({ "items": items, "total": total }));
    }

    if let Some(page_size) = args.page_size {
        params.insert("page_size".to_string(), Value::from(page_size));
    }

    let response = gateway.get_with(&args.path, params).await?;
    let body: Value = response
        .json()
        .unwrap_or_else(|_| Value::String(response.text()));
    output.payload(&body)
}
