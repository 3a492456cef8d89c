use clap::Args;
use colored::Colorize;

use crate::context::AppContext;
use crate::domain::generation::SamplingParams;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Prompt to generate text from.
    pub prompt: String,
    /// Maximum number of tokens to generate.
    #[arg(long, default_value_t = 100)]
    pub max_new_tokens: u32,
    /// Disable sampling (greedy decoding).
    #[arg(long)]
    pub no_sample: bool,
    /// Top-p sampling parameter.
    #[arg(long, default_value_t = 0.95)]
    pub top_p: f64,
    /// Sampling temperature.
    #[arg(long, default_value_t = 0.7)]
    pub temperature: f64,
}

pub async fn run(ctx: &AppContext, args: GenerateArgs) -> AppResult<()> {
    let params = SamplingParams {
        max_new_tokens: args.max_new_tokens,
        do_sample: !args.no_sample,
        top_p: args.top_p,
        temperature: args.temperature,
    };

    let outcome = ctx.generation.generate(&args.prompt, &params).await;
    if let Some(reason) = outcome.degraded_reason() {
        eprintln!("{}", format!("Generation degraded: {reason}").yellow());
    }
    println!("{}", outcome.text());
    Ok(())
}
