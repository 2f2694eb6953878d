// ABOUTME: Docker provider implementation backing the runtime capability interface
// ABOUTME: Uses bollard to create, exec into, and remove task containers

use super::{ContainerConfig, ExecResult, Provider, ProviderError, Result};
use async_trait::async_trait;
use bollard::{
    container::{Config, CreateContainerOptions, LogOutput, RemoveContainerOptions, StartContainerOptions},
    exec::{CreateExecOptions, StartExecResults},
    image::CreateImageOptions,
    Docker,
};
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub struct DockerProvider {
    client: Docker,
    label_prefix: String,
    /// Cache of successfully pulled images to avoid redundant pulls
    image_cache: Arc<RwLock<HashSet<String>>>,
    /// Timeout for image pull operations (default: 10 minutes)
    pull_timeout: Duration,
}

impl DockerProvider {
    /// Create a new Docker provider with default pull timeout (10 minutes)
    pub fn new() -> Result<Self> {
        Self::with_pull_timeout(Duration::from_secs(600))
    }

    /// Create a new Docker provider with custom pull timeout
    pub fn with_pull_timeout(timeout: Duration) -> Result<Self> {
        let client = Docker::connect_with_defaults()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            label_prefix: "sudo.sandbox".to_string(),
            image_cache: Arc::new(RwLock::new(HashSet::new())),
            pull_timeout: timeout,
        })
    }

    /// Create with a specific Docker connection
    pub fn with_client(client: Docker) -> Self {
        Self {
            client,
            label_prefix: "sudo.sandbox".to_string(),
            image_cache: Arc::new(RwLock::new(HashSet::new())),
            pull_timeout: Duration::from_secs(600),
        }
    }

    /// Convert our config to bollard config
    fn to_bollard_config(&self, config: &ContainerConfig) -> Config<String> {
        let mut labels = config.labels.clone();
        labels.insert(format!("{}.managed", self.label_prefix), "true".to_string());
        labels.insert(format!("{}.name", self.label_prefix), config.name.clone());

        let env: Vec<String> = config
            .env_vars
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        let host_config = bollard::models::HostConfig {
            network_mode: Some(config.network_mode.clone()),
            ..Default::default()
        };

        Config {
            image: Some(config.image.clone()),
            cmd: config.command.clone(),
            env: Some(env),
            working_dir: config.working_dir.clone(),
            labels: Some(labels),
            host_config: Some(host_config),
            ..Default::default()
        }
    }

    async fn image_exists(&self, image: &str) -> Result<bool> {
        match self.client.inspect_image(image).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(ProviderError::ImageError(e.to_string())),
        }
    }

    async fn pull_image(&self, image: &str) -> Result<()> {
        {
            let cache = self.image_cache.read().await;
            if cache.contains(image) && self.image_exists(image).await? {
                debug!("Image {} found in cache, skipping pull", image);
                return Ok(());
            }
        }

        info!("Pulling image: {} (timeout: {:?})", image, self.pull_timeout);

        let options = CreateImageOptions {
            from_image: image.to_string(),
            ..Default::default()
        };

        let stream = self.client.create_image(Some(options), None, None);

        let result = tokio::time::timeout(self.pull_timeout, async {
            let mut stream = stream;
            let mut last_status = String::new();

            while let Some(progress) = stream.next().await {
                match progress {
                    Ok(info) => {
                        if let Some(status) = &info.status {
                            if status != &last_status {
                                debug!("Pull status: {}", status);
                                last_status = status.clone();
                            }
                        }
                        if let Some(error) = info.error {
                            return Err(ProviderError::ImageError(format!(
                                "Failed to pull image {}: {}",
                                image, error
                            )));
                        }
                    }
                    Err(e) => {
                        return Err(ProviderError::ImageError(format!(
                            "Failed to pull image {}: {}",
                            image, e
                        )));
                    }
                }
            }

            Ok(())
        })
        .await;

        match result {
            Ok(Ok(())) => {
                info!("Successfully pulled image: {}", image);
                self.image_cache.write().await.insert(image.to_string());
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProviderError::ImageError(format!(
                "Timeout pulling image {} after {:?}",
                image, self.pull_timeout
            ))),
        }
    }
}

#[async_trait]
impl Provider for DockerProvider {
    async fn is_available(&self) -> Result<bool> {
        match self.client.ping().await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("Docker not available: {}", e);
                Ok(false)
            }
        }
    }

    async fn create_container(&self, config: &ContainerConfig) -> Result<String> {
        info!("Creating container: {}", config.name);

        if !self.image_exists(&config.image).await? {
            self.pull_image(&config.image).await?;
        }

        let bollard_config = self.to_bollard_config(config);
        let options = CreateContainerOptions {
            name: config.name.clone(),
            platform: None,
        };

        let container = self
            .client
            .create_container(Some(options), bollard_config)
            .await
            .map_err(|e| ProviderError::ContainerError(e.to_string()))?;

        debug!("Created container: {}", container.id);

        self.client
            .start_container(&container.id, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| ProviderError::ContainerError(e.to_string()))?;

        Ok(container.id)
    }

    async fn exec_command(
        &self,
        container_id: &str,
        command: Vec<String>,
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<ExecResult> {
        info!(
            "Executing command in container {}: {:?}",
            container_id, command
        );

        let env: Option<Vec<String>> = env_vars.map(|vars| {
            vars.into_iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect()
        });

        let exec_config = CreateExecOptions {
            cmd: Some(command),
            env,
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let exec = self
            .client
            .create_exec(container_id, exec_config)
            .await
            .map_err(|e| ProviderError::ContainerError(e.to_string()))?;

        let start_result = self
            .client
            .start_exec(&exec.id, None)
            .await
            .map_err(|e| ProviderError::ContainerError(e.to_string()))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        match start_result {
            StartExecResults::Attached { mut output, .. } => {
                while let Some(msg) = output.next().await {
                    match msg {
                        Ok(LogOutput::StdOut { message }) => stdout.extend_from_slice(&message),
                        Ok(LogOutput::StdErr { message }) => stderr.extend_from_slice(&message),
                        Ok(LogOutput::Console { message }) => stdout.extend_from_slice(&message),
                        _ => {}
                    }
                }
            }
            StartExecResults::Detached => {
                return Err(ProviderError::ContainerError(
                    "Exec was detached unexpectedly".to_string(),
                ))
            }
        }

        let exec_inspect = self
            .client
            .inspect_exec(&exec.id)
            .await
            .map_err(|e| ProviderError::ContainerError(e.to_string()))?;

        let exit_code = exec_inspect.exit_code.unwrap_or(0);

        Ok(ExecResult {
            exit_code,
            stdout,
            stderr,
        })
    }

    async fn remove_container(&self, container_id: &str, force: bool) -> Result<()> {
        info!("Removing container: {} (force: {})", container_id, force);

        let options = RemoveContainerOptions {
            force,
            v: true, // Remove volumes
            ..Default::default()
        };

        match self
            .client
            .remove_container(container_id, Some(options))
            .await
        {
            Ok(_) => Ok(()),
            // Container already removed is not an error
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {
                debug!("Container {} already removed", container_id);
                Ok(())
            }
            Err(e) => Err(ProviderError::ContainerError(e.to_string())),
        }
    }
}
