pub mod admin;
pub mod books;

use kitab_kernel::ModuleRegistry;

use crate::app::AppServices;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, services: &AppServices) -> anyhow::Result<()> {
    registry.register(books::create_module(services.store.clone()))?;
    registry.register(admin::create_module(
        services.mail.clone(),
        services.from_address.clone(),
    ))?;
    Ok(())
}
