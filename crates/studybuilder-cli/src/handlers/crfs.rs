//! CRF library command handlers

use super::utils::{add_filters, params_from_pairs};
use crate::cli::{CrfsAction, CrfsArgs, CrfsExportArgs, CrfsListArgs, CrfsTargetArgs};
use crate::error::Result;
use crate::output::OutputWriter;
use studybuilder_core::resources::{CrfsClient, ExportFormat, ExportRequest, OdmSource};
use studybuilder_core::{Gateway, NewNotification};

/// Lifecycle transitions shared by every CRF element kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Approve,
    Inactivate,
    Reactivate,
    NewVersion,
    Delete,
}

impl Lifecycle {
    fn past_tense(self) -> &'static str {
        match self {
            Lifecycle::Approve => "approved",
            Lifecycle::Inactivate => "inactivated",
            Lifecycle::Reactivate => "reactivated",
            Lifecycle::NewVersion => "opened as a new version",
            Lifecycle::Delete => "deleted",
        }
    }
}

/// Handle the crfs command
pub async fn handle_crfs(args: CrfsArgs, gateway: &Gateway, output: &mut OutputWriter) -> Result<()> {
    let client = CrfsClient::new(gateway.clone());

    match args.action {
        CrfsAction::List(list) => handle_list(list, &client, output).await,
        CrfsAction::Approve(target) => handle_lifecycle(Lifecycle::Approve, target, &client, output).await,
        CrfsAction::Inactivate(target) => handle_lifecycle(Lifecycle::Inactivate, target, &client, output).await,
        CrfsAction::Reactivate(target) => handle_lifecycle(Lifecycle::Reactivate, target, &client, output).await,
        CrfsAction::NewVersion(target) => handle_lifecycle(Lifecycle::NewVersion, target, &client, output).await,
        CrfsAction::Delete(target) => handle_lifecycle(Lifecycle::Delete, target, &client, output).await,
        CrfsAction::Export(export) => handle_export(export, &client, output).await,
    }
}

async fn handle_list(args: CrfsListArgs, client: &CrfsClient, output: &mut OutputWriter) -> Result<()> {
    let mut params = params_from_pairs(&args.params);
    add_filters(&mut params, args.filters.as_deref())?;

    let page = client.source(args.source.into()).get_all(params).await?;
    output.payload(&serde_json::to_value(&page)?)
}

/// Run one lifecycle call and confirm it with a success notification
async fn handle_lifecycle(
    action: Lifecycle,
    target: CrfsTargetArgs,
    client: &CrfsClient,
    output: &mut OutputWriter,
) -> Result<()> {
    let source = OdmSource::from(target.source);
    let uid = target.uid.as_str();

    let body = match action {
        Lifecycle::Approve => client.approve(source, uid).await?,
        Lifecycle::Inactivate => client.inactivate(source, uid).await?,
        Lifecycle::Reactivate => client.reactivate(source, uid).await?,
        Lifecycle::NewVersion => client.new_version(source, uid, None).await?,
        Lifecycle::Delete => client.delete(source, uid).await?,
    };

    client
        .source(source)
        .gateway()
        .notifications()
        .add(NewNotification::success(format!("{} {} {}", source, uid, action.past_tense())));

    // 204 responses (delete) have nothing to show
    if body.is_null() {
        return Ok(());
    }
    output.payload(&body)
}

async fn handle_export(args: CrfsExportArgs, client: &CrfsClient, output: &mut OutputWriter) -> Result<()> {
    let request = ExportRequest {
        target_uids: args.target_uids,
        target_type: args.target_type,
        export_to: args.export_to,
        stylesheet: args.stylesheet,
        version: args.library_version,
        allowed_namespaces: args.allowed_namespaces,
        format: ExportFormat::from(args.format),
    };

    let spinner = output.spinner("Exporting");
    let response = client.export(&request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }
    let response = response?;

    match args.out_file {
        Some(path) => {
            std::fs::write(&path, response.bytes())?;
            output.success(&format!("Wrote {} bytes to {}", response.bytes().len(), path.display()))
        }
        None => output.bytes(response.bytes()),
    }
}
