use anyhow::{Context as _, Result};
use group_digest::storage::{path_utils, UsageLog};
use group_digest::summary::summarizer::DEFAULT_PROMPT;
use group_digest::summary::{AnalysisType, OpenAiClient, Summarizer, SummaryPrompts, SummaryRequest};

use super::Context;

pub struct SummarizeArgs {
    pub analysis: AnalysisType,
    pub criteria: Option<String>,
    pub prompt: Option<String>,
    pub window_secs: Option<f64>,
    pub json: bool,
}

/// Named prompt, else the prompt registered for the analysis type, else the default.
fn resolve_prompt(prompts: &SummaryPrompts, args: &SummarizeArgs) -> Result<String> {
    if let Some(name) = &args.prompt {
        return prompts
            .get(name)
            .map(String::from)
            .with_context(|| format!("Unknown prompt '{}'. Run `group-digest prompts`.", name));
    }
    Ok(prompts
        .get(args.analysis.as_str())
        .unwrap_or(DEFAULT_PROMPT)
        .to_string())
}

pub fn run(ctx: &Context, group_id: &str, args: &SummarizeArgs) -> Result<()> {
    let prompts = SummaryPrompts::load(&path_utils::prompts_path(&ctx.data_dir));
    let prompt = resolve_prompt(&prompts, args)?;

    let client = OpenAiClient::from_config(&ctx.config.llm)?;
    let summarizer = Summarizer::new(ctx.store()?, Box::new(client), ctx.config.llm.clone())
        .with_usage_log(UsageLog::new(path_utils::api_log_path(&ctx.data_dir)));

    let summary = summarizer
        .summarize(&SummaryRequest {
            group_id: group_id.to_string(),
            window_secs: args.window_secs.unwrap_or(ctx.config.fetch.window_secs),
            analysis: args.analysis,
            criteria: args.criteria.clone(),
            prompt,
        })
        .context("Failed to generate summary")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", summary.text);
    println!();
    println!("Messages used: {}", summary.messages_used);
    for (i, d) in summary.discussions.iter().enumerate() {
        println!();
        println!("#{} {} [{}]", i + 1, d.title, d.engagement);
        println!("   started by {} at {}", d.started_by, d.time);
        println!("   {}", d.content);
    }
    Ok(())
}

/// `prompts` — list the named summary prompts.
pub fn list_prompts(ctx: &Context) -> Result<()> {
    let prompts = SummaryPrompts::load(&path_utils::prompts_path(&ctx.data_dir));
    if prompts.is_empty() {
        println!("No summary prompts defined. Add them to summary_prompts.json.");
        return Ok(());
    }
    for name in prompts.names() {
        println!("{}", name);
    }
    Ok(())
}
