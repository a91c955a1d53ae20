use crate::api;
use crate::cli::actions::Action;
use anyhow::{Context, Result};
use tokio::fs;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { settings } => {
            fs::create_dir_all(&settings.uploads_dir)
                .await
                .with_context(|| {
                    format!(
                        "Failed to create uploads directory: {}",
                        settings.uploads_dir.display()
                    )
                })?;

            api::new(settings).await?;
        }
    }

    Ok(())
}
