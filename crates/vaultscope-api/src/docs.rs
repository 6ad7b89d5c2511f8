#![allow(clippy::needless_for_each)]

use anyhow::Result;
use serde_json::to_string_pretty;
use std::path::PathBuf;
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::{ServerBuilder, ServerVariableBuilder};
use utoipauto::utoipauto;

pub struct ServerAddon;

impl Modify for ServerAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let version_variable = ServerVariableBuilder::new()
            .default_value("v1")
            .enum_values(Some(vec!["v1"]))
            .build();
        openapi.servers = Some(vec![
            ServerBuilder::new()
                .url("/{version}")
                .parameter("version", version_variable)
                .build(),
        ]);
    }
}

#[utoipauto(paths = "./crates/vaultscope-api/src/")]
#[derive(OpenApi)]
#[openapi(
    modifiers(&ServerAddon),
    tags(
        (name = "vaultscope", description = "Vault APY/TVL aggregation API"),
        (name = "Prices", description = "Cached token and LP prices"),
        (name = "Vaults", description = "Per-vault TVL, APY and metric snapshots")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Writes `openapi.json` into `output_path`.
    pub fn generate_openapi_json(output_path: PathBuf) -> Result<()> {
        let openapi = Self::openapi();
        let json = to_string_pretty(&openapi)?;

        let file_path = output_path.join("openapi.json");
        tracing::info!("Saving OpenAPI specs to {}...", file_path.display());
        std::fs::write(&file_path, json)?;
        Ok(())
    }
}
