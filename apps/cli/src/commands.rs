//! CLI command definitions, routing, and tracing setup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use figforge_chunker::strip_blank_lines;
use figforge_core::{
    CancellationToken, DRIVER_SLOTS, EnrichOptions, EnrichmentProgress, RunStatus, run_enrichment,
    run_generation,
};
use figforge_generation::{GeminiClient, GeminiClientConfig};
use figforge_prompt::referenced_slots;
use figforge_prompt::templates::{DEFAULT_ENRICH_TEMPLATE, DEFAULT_GENERATE_TEMPLATE};
use figforge_shared::{AppConfig, ImageAttachment, init_config, load_config, resolve_api_key};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// figforge — turn design exports into mobile UI code.
#[derive(Parser)]
#[command(
    name = "figforge",
    version,
    about = "Generate mobile UI code from Figma designs and enrich it with exported design data.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Generate seed screen code from design images and project context.
    Generate {
        /// Design image file(s), sent with every model call.
        #[arg(long, required = true)]
        image: Vec<PathBuf>,

        /// Conventions & standards file.
        #[arg(long)]
        conventions: Option<PathBuf>,

        /// Component mapping file.
        #[arg(long)]
        mapping: Option<PathBuf>,

        /// Merged existing-components source file.
        #[arg(long)]
        components: Option<PathBuf>,

        /// Sample code patterns file.
        #[arg(long)]
        sample_code: Option<PathBuf>,

        /// Package structure file.
        #[arg(long)]
        package_structure: Option<PathBuf>,

        /// User stories file.
        #[arg(long)]
        user_stories: Option<PathBuf>,

        /// API endpoints file.
        #[arg(long)]
        api_endpoints: Option<PathBuf>,

        /// Prompt template file (defaults to the built-in template).
        #[arg(long)]
        template: Option<PathBuf>,

        /// Model identifier (defaults to config).
        #[arg(long)]
        model: Option<String>,

        /// Output file for the generated code.
        #[arg(short, long, default_value = "generated_code.txt")]
        out: PathBuf,
    },

    /// Iteratively enrich generated code with chunked design-export JSON.
    Enrich {
        /// Design-export JSON/text document (the Figma API dump).
        #[arg(long)]
        document: PathBuf,

        /// Seed code artifact to enrich (output of `generate`).
        #[arg(long)]
        seed: PathBuf,

        /// Design image file(s), held constant across iterations.
        #[arg(long, required = true)]
        image: Vec<PathBuf>,

        /// Theme colors & typography reference file.
        #[arg(long)]
        theme: Option<PathBuf>,

        /// Maximum lines per chunk (defaults to config).
        #[arg(long)]
        lines_per_chunk: Option<usize>,

        /// Prompt template file (defaults to the built-in template).
        #[arg(long)]
        template: Option<PathBuf>,

        /// Model identifier (defaults to config).
        #[arg(long)]
        model: Option<String>,

        /// Output file for the enriched code.
        #[arg(short, long, default_value = "enriched_code.txt")]
        out: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "figforge=info",
        1 => "figforge=debug",
        _ => "figforge=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Generate {
            image,
            conventions,
            mapping,
            components,
            sample_code,
            package_structure,
            user_stories,
            api_endpoints,
            template,
            model,
            out,
        } => {
            let config = load_config()?;
            let client = build_client(&config)?;
            let model_id = model.unwrap_or_else(|| config.gemini.default_model.clone());
            let images = load_images(&image)?;
            let template = load_template(template.as_deref(), DEFAULT_GENERATE_TEMPLATE)?;

            let mut context = HashMap::new();
            context.insert("conventions".to_string(), optional_text(conventions.as_deref())?);
            context.insert("component_mapping".to_string(), optional_text(mapping.as_deref())?);
            context.insert(
                "existing_components".to_string(),
                optional_text(components.as_deref())?,
            );
            context.insert("sample_code".to_string(), optional_text(sample_code.as_deref())?);
            context.insert(
                "package_structure".to_string(),
                optional_text(package_structure.as_deref())?,
            );
            context.insert("user_stories".to_string(), optional_text(user_stories.as_deref())?);
            context.insert("api_endpoints".to_string(), optional_text(api_endpoints.as_deref())?);

            check_template_slots(&template, &context, &[])?;

            let spinner = ProgressBar::new_spinner().with_message("Generating seed code...");
            spinner.enable_steady_tick(Duration::from_millis(120));

            let code = run_generation(
                &client,
                &model_id,
                &images,
                &template,
                &context,
                Duration::from_secs(config.gemini.request_timeout_secs),
            )
            .await?;

            spinner.finish_and_clear();
            write_output(&out, &code)?;
            println!("Generated code written to {}", out.display());
            Ok(())
        }

        Command::Enrich {
            document,
            seed,
            image,
            theme,
            lines_per_chunk,
            template,
            model,
            out,
        } => {
            let config = load_config()?;
            let client = build_client(&config)?;
            let model_id = model.unwrap_or_else(|| config.gemini.default_model.clone());
            let images = load_images(&image)?;
            let template = load_template(template.as_deref(), DEFAULT_ENRICH_TEMPLATE)?;

            let document_text = read_text(&document)?;
            let seed_code = strip_blank_lines(&read_text(&seed)?);

            let mut auxiliary_context = HashMap::new();
            auxiliary_context.insert(
                "theme_reference".to_string(),
                optional_text(theme.as_deref())?,
            );

            check_template_slots(&template, &auxiliary_context, DRIVER_SLOTS)?;

            let options = EnrichOptions {
                model_id,
                max_lines_per_chunk: lines_per_chunk
                    .unwrap_or(config.defaults.lines_per_chunk),
                template,
                auxiliary_context,
                call_timeout: Duration::from_secs(config.gemini.request_timeout_secs),
            };

            // Ctrl-C abandons any in-flight model call and stops the run;
            // the partial result is still written.
            let cancel = CancellationToken::new();
            let cancel_signal = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel_signal.cancel();
                }
            });

            let progress = BarProgress::new();

            let outcome = run_enrichment(
                &client,
                &options,
                &document_text,
                &seed_code,
                &images,
                &progress,
                &cancel,
            )
            .await?;

            progress.finish();
            write_output(&out, &outcome.code)?;

            match &outcome.status {
                RunStatus::Completed => {
                    info!(
                        iterations = outcome.iterations_completed,
                        "enrichment complete"
                    );
                    println!(
                        "Enriched code written to {} ({} iterations)",
                        out.display(),
                        outcome.iterations_completed
                    );
                    Ok(())
                }
                RunStatus::Canceled => {
                    println!(
                        "Canceled after {}/{} iterations; partial result written to {}",
                        outcome.iterations_completed,
                        outcome.total_iterations,
                        out.display()
                    );
                    Ok(())
                }
                RunStatus::Failed { iteration, error } => {
                    println!(
                        "Partial result ({}/{} iterations) written to {}",
                        outcome.iterations_completed,
                        outcome.total_iterations,
                        out.display()
                    );
                    Err(eyre!("iteration {iteration} failed: {error}"))
                }
            }
        }

        Command::Config { action } => match action {
            ConfigAction::Init => {
                let path = init_config()?;
                println!("Config written to {}", path.display());
                Ok(())
            }
            ConfigAction::Show => {
                let config = load_config()?;
                println!("{}", toml::to_string_pretty(&config)?);
                Ok(())
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the Gemini client from config + env.
fn build_client(config: &AppConfig) -> Result<GeminiClient> {
    let api_key = resolve_api_key(config)?;
    let client_config = GeminiClientConfig {
        request_timeout: Duration::from_secs(config.gemini.request_timeout_secs),
        ..GeminiClientConfig::new(api_key)
    };
    Ok(GeminiClient::new(client_config)?)
}

/// Read a UTF-8 text file.
fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| eyre!("failed to read {}: {e}", path.display()))
}

/// Read an optional auxiliary input, compacted for prompting.
/// Absent files slot in as the literal "None".
fn optional_text(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => Ok(strip_blank_lines(&read_text(p)?)),
        None => Ok("None".to_string()),
    }
}

/// Load a template from file, or fall back to the built-in.
fn load_template(path: Option<&Path>, fallback: &str) -> Result<String> {
    match path {
        Some(p) => read_text(p),
        None => Ok(fallback.to_string()),
    }
}

/// Reject a template up front if it references slots that neither the
/// static context nor the pipeline will fill. Catches typos in
/// user-supplied `--template` files before any model call is made.
fn check_template_slots(
    template: &str,
    context: &HashMap<String, String>,
    injected: &[&str],
) -> Result<()> {
    let unknown: Vec<String> = referenced_slots(template)
        .into_iter()
        .filter(|name| !context.contains_key(name) && !injected.contains(&name.as_str()))
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(eyre!(
            "template references unknown slot(s): {}",
            unknown.join(", ")
        ))
    }
}

/// Load design images, inferring MIME type from the file extension.
fn load_images(paths: &[PathBuf]) -> Result<Vec<ImageAttachment>> {
    paths
        .iter()
        .map(|path| {
            let data = std::fs::read(path)
                .map_err(|e| eyre!("failed to read image {}: {e}", path.display()))?;
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("png");
            Ok(ImageAttachment::from_bytes(data, extension))
        })
        .collect()
}

/// Write the output artifact.
fn write_output(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .map_err(|e| eyre!("failed to write {}: {e}", path.display()))
}

// ---------------------------------------------------------------------------
// Progress bar adapter
// ---------------------------------------------------------------------------

/// Renders driver progress as an indicatif bar.
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::no_length();
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")
                .expect("valid progress template"),
        );
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl EnrichmentProgress for BarProgress {
    fn iteration_started(&self, current: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message(format!("enriching part {current} of {total}"));
    }

    fn iteration_completed(&self, current: usize, _total: usize) {
        self.bar.set_position(current as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn template_with_known_slots_passes() {
        let ctx = context(&[("theme_reference", "colors")]);
        let template = "part {part_number} of {total_parts}\n{theme_reference}\n{current_code}";
        assert!(check_template_slots(template, &ctx, DRIVER_SLOTS).is_ok());
    }

    #[test]
    fn template_with_unknown_slot_is_rejected() {
        let ctx = context(&[("theme_reference", "colors")]);
        let template = "{current_code} {them_reference}";
        let err = check_template_slots(template, &ctx, DRIVER_SLOTS).unwrap_err();
        assert!(err.to_string().contains("them_reference"));
    }

    #[test]
    fn driver_slots_are_not_required_in_context() {
        let template = "{design_chunk} {iteration_number}";
        assert!(check_template_slots(template, &HashMap::new(), DRIVER_SLOTS).is_ok());
    }
}
