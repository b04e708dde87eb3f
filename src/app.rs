//! Service bootstrap: builds collaborators from settings, registers modules
//! and drives the server lifecycle.

use std::sync::Arc;

use anyhow::{bail, Context};
use kitab_db::{DocumentStore, FirestoreStore, MemoryStore};
use kitab_kernel::settings::{
    Environment, MailBackend, MailSettings, Settings, SmtpSecurity, StoreBackend, StoreSettings,
};
use kitab_kernel::{InitCtx, ModuleRegistry};
use kitab_mail::{MailTransport, MailerConfig, MemoryOutbox, SmtpMailTransport, TlsMode};

use crate::modules;

/// External collaborators shared by the modules.
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn DocumentStore>,
    pub mail: Arc<dyn MailTransport>,
    pub from_address: String,
}

impl AppServices {
    /// Build the configured store and mail transport.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let store = build_store(&settings.store, &settings.environment).await?;
        let (mail, from_address) = build_mail(&settings.mail, &settings.environment)?;

        Ok(Self {
            store,
            mail,
            from_address,
        })
    }
}

async fn build_store(
    settings: &StoreSettings,
    environment: &Environment,
) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match settings.backend {
        StoreBackend::Memory => {
            if *environment == Environment::Production {
                bail!("the memory store backend cannot be used in production");
            }
            tracing::warn!("using in-memory document store; books are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Firestore => {
            if let Some(key_path) = &settings.credentials_path {
                let store = FirestoreStore::with_service_account(
                    settings.endpoint.clone(),
                    settings.project_id.as_deref(),
                    key_path,
                )
                .await
                .context("failed to set up firestore service account credentials")?;
                tracing::info!(
                    endpoint = %settings.endpoint,
                    key = %key_path.display(),
                    "using firestore document store with service account"
                );
                return Ok(Arc::new(store));
            }

            if *environment == Environment::Production {
                bail!(
                    "store.credentials_path is required for firestore in production \
                     (set KITAB_STORE__CREDENTIALS_PATH)"
                );
            }
            let project_id = settings
                .project_id
                .as_deref()
                .context("store.project_id is required for the firestore backend")?;
            tracing::info!(project_id, endpoint = %settings.endpoint, "using firestore document store");
            Ok(Arc::new(FirestoreStore::new(
                settings.endpoint.clone(),
                project_id,
                settings.access_token.clone(),
            )))
        }
    }
}

fn build_mail(
    settings: &MailSettings,
    environment: &Environment,
) -> anyhow::Result<(Arc<dyn MailTransport>, String)> {
    match settings.backend {
        MailBackend::Memory => {
            if *environment == Environment::Production {
                bail!("the memory mail backend cannot be used in production");
            }
            tracing::warn!("using in-memory mail outbox; no mail will be delivered");
            Ok((Arc::new(MemoryOutbox::new()), settings.from_address.clone()))
        }
        MailBackend::Smtp => {
            let config = mailer_config(settings)?;
            let host = settings
                .smtp_host
                .as_deref()
                .context("mail.smtp_host is required for the smtp backend")?;
            let tls = match settings.smtp_security {
                SmtpSecurity::Tls => TlsMode::Implicit,
                SmtpSecurity::StartTls => TlsMode::StartTls,
                SmtpSecurity::Plain => {
                    if *environment == Environment::Production {
                        bail!("unencrypted smtp cannot be used in production");
                    }
                    TlsMode::None
                }
            };
            let transport = SmtpMailTransport::connect(host, settings.smtp_port, tls, &config)
                .context("failed to create mail transport")?;
            tracing::info!(host, security = ?settings.smtp_security, "using smtp mail transport");
            Ok((Arc::new(transport), config.from_address))
        }
    }
}

/// Sender credentials from configuration. Never compiled in.
pub fn mailer_config(settings: &MailSettings) -> anyhow::Result<MailerConfig> {
    let user = settings
        .user
        .as_deref()
        .context("mail.user is not configured (set KITAB_MAIL__USER)")?;
    let pass = settings
        .pass
        .as_deref()
        .context("mail.pass is not configured (set KITAB_MAIL__PASS)")?;

    MailerConfig::new(user, pass, settings.from_address.as_str())
        .context("invalid mail configuration")
}

/// Registry holding every application module
pub fn build_registry(services: &AppServices) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, services)?;
    Ok(registry)
}

/// Run the server until Ctrl-C, then stop modules.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let services = AppServices::from_settings(&settings).await?;
    let registry = build_registry(&services)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = kitab_http::start_server(&registry, &settings, shutdown_signal()).await;

    registry.stop_all().await?;
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
