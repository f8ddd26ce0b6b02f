//! Network artifact materializer.
//!
//! Genesis block and channel transaction follow the same
//! generate-then-store pattern as identity material: the local file is the
//! idempotency marker for generation, the store's create-if-absent primitive
//! the marker for storage. configtxgen runs with an explicit working
//! directory; the provisioning process's own cwd is never touched.

use hlfp_ca::{CommandRunner, CommandSpec};
use hlfp_core::{NetworkConfig, ProvisionError, Result};
use hlfp_k8s::SecretStore;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// configtx profile used for the orderer genesis block
const GENESIS_PROFILE: &str = "OrdererGenesis";

/// Generates and stores genesis/channel configuration artifacts
pub struct ArtifactMaterializer {
    config: Arc<NetworkConfig>,
    store: Arc<dyn SecretStore>,
    runner: Arc<dyn CommandRunner>,
}

impl ArtifactMaterializer {
    /// Drive configtxgen through `runner`, storing artifacts via `store`
    pub fn new(
        config: Arc<NetworkConfig>,
        store: Arc<dyn SecretStore>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            config,
            store,
            runner,
        }
    }

    /// Materialize the genesis block and store it as a secret
    pub async fn genesis_block(&self) -> Result<()> {
        let group = &self.config.orderers;
        let namespace = self.config.msp(&group.msp)?.namespace.clone();
        let secret_name = group.secret_genesis.as_deref().ok_or_else(|| {
            ProvisionError::Config("orderers.secret_genesis is not set".to_string())
        })?;

        let genesis_file = self.config.core.dir_crypto.join("genesis.block");
        if genesis_file.exists() {
            info!(path = %genesis_file.display(), "genesis block already exists, skipping generation");
        } else {
            let spec = CommandSpec::new("configtxgen")
                .args(["-profile", GENESIS_PROFILE, "-outputBlock"])
                .arg(genesis_file.display().to_string())
                .current_dir(&self.config.core.dir_config);
            self.generate(&spec, &genesis_file).await?;
        }

        self.store
            .create_from_file(secret_name, &namespace, "genesis.block", &genesis_file)
            .await?;
        Ok(())
    }

    /// Materialize the channel creation transaction and store it as a secret
    pub async fn channel_tx(&self) -> Result<()> {
        let group = &self.config.peers;
        let namespace = self.config.msp(&group.msp)?.namespace.clone();
        let secret_name = group.secret_channel.as_deref().ok_or_else(|| {
            ProvisionError::Config("peers.secret_channel is not set".to_string())
        })?;
        let channel = group.channel_name.as_deref().ok_or_else(|| {
            ProvisionError::Config("peers.channel_name is not set".to_string())
        })?;
        let profile = group.channel_profile.as_deref().ok_or_else(|| {
            ProvisionError::Config("peers.channel_profile is not set".to_string())
        })?;

        let channel_filename = format!("{channel}.tx");
        let channel_file = self.config.core.dir_crypto.join(&channel_filename);
        if channel_file.exists() {
            info!(path = %channel_file.display(), "channel transaction already exists, skipping generation");
        } else {
            let spec = CommandSpec::new("configtxgen")
                .args(["-profile", profile, "-channelID", channel, "-outputCreateChannelTx"])
                .arg(channel_file.display().to_string())
                .current_dir(&self.config.core.dir_config);
            self.generate(&spec, &channel_file).await?;
        }

        self.store
            .create_from_file(secret_name, &namespace, &channel_filename, &channel_file)
            .await?;
        Ok(())
    }

    async fn generate(&self, spec: &CommandSpec, output: &Path) -> Result<()> {
        let result = self.runner.run(spec).await?;
        if !result.success {
            return Err(ProvisionError::Artifact(result.stderr));
        }
        info!(path = %output.display(), "generated artifact");
        Ok(())
    }
}
