use anyhow::Result;

use super::auth::connect;
use super::{project_info, stopped_message};

pub async fn stop() -> Result<()> {
    let client = connect()?;

    let Some(current) = client.current_time_entry().await? else {
        println!("No running time entry found.");
        return Ok(());
    };

    let info = project_info(&client, &current).await;
    println!("Stopping time entry \"{}\"{info}...", current.description);
    let stopped = client
        .stop_time_entry(current.workspace_id, current.id)
        .await?;
    println!("{}", stopped_message(&stopped));
    Ok(())
}
