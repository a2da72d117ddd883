pub mod resolve;
pub mod run;

use crate::settings::Settings;
use dispatch_core::{ApiClient, HttpTransport};

fn client(settings: &Settings) -> anyhow::Result<ApiClient> {
    let transport = HttpTransport::new()?;
    Ok(ApiClient::new(settings.session.clone(), Box::new(transport)))
}
