use anyhow::Context;
use kitab_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load KitabCorner settings")?;
    kitab_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        store = ?settings.store.backend,
        mail = ?settings.mail.backend,
        "kitab-app bootstrap starting"
    );

    kitab_app::serve(settings).await
}
