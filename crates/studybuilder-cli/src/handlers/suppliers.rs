//! Study data supplier command handlers

use super::utils::{params_from_pairs, resolve_study_uid};
use crate::cli::{OutputFormat, SuppliersAction, SuppliersArgs};
use crate::error::Result;
use crate::output::OutputWriter;
use studybuilder_core::resources::StudyClient;
use studybuilder_core::stores::StudyDataSuppliersStore;
use studybuilder_core::Gateway;

/// Handle the suppliers command
pub async fn handle_suppliers(args: SuppliersArgs, gateway: &Gateway, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        SuppliersAction::List(list) => {
            let study_uid = resolve_study_uid(&list.study_uid);
            let store = StudyDataSuppliersStore::new(StudyClient::new(gateway.clone()));
            let page = store
                .fetch_study_data_suppliers(&study_uid, params_from_pairs(&list.params))
                .await?;

            if output.format() != OutputFormat::Human {
                return output.data(&page);
            }

            let rows = store
                .sorted_study_data_suppliers()
                .into_iter()
                .map(|supplier| {
                    let kind = supplier.type_name().unwrap_or_default().to_string();
                    vec![
                        supplier.study_data_supplier_uid,
                        supplier.name,
                        kind,
                        supplier
                            .study_data_supplier_order
                            .map(|order| order.to_string())
                            .unwrap_or_default(),
                    ]
                })
                .collect();
            output.table(&["UID", "NAME", "TYPE", "ORDER"], rows)?;
            output.info(&format!("{} supplier(s) in {}", store.total_items(), study_uid))
        }
    }
}
