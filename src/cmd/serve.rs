use std::sync::Arc;

use clap::Args;

use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::model::{LocalProcessBackend, ModelGateway};
use crate::server;
use crate::services::CompletionBackend;

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, default_value_t = 8000)]
    pub port: u16,
}

pub async fn run(ctx: &AppContext, args: ServeArgs) -> AppResult<()> {
    // The server is the remote endpoint; its gateway is local-only so it
    // can never fall back to calling itself.
    let local: Option<Arc<dyn CompletionBackend>> = match &ctx.config.model_command {
        Some(command) => Some(Arc::new(LocalProcessBackend::from_command(command)?)),
        None => None,
    };
    let generation = Arc::new(ModelGateway::local_only(local));
    server::serve(&args.host, args.port, generation).await
}
