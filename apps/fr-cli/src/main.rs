use clap::{Parser, Subcommand};
use fr_app::{
    AppError, AppResult, CaseOutcome, CaseProgressEvent, CaseRunner, ExportStatus, StudyProgress,
    load_config, render_case_model, run_study,
};
use fr_template::{Advisory, derive_template};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fr-cli")]
#[command(about = "FlowRunner CLI - templated multiphase case runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the configured case into a model file without running it
    Render {
        /// Path to the runner YAML file
        config: PathBuf,
        /// Output model path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Run the configured case once
    Run {
        /// Path to the runner YAML file
        config: PathBuf,
    },
    /// Run a parameter study over the configured case
    Study {
        /// Path to the runner YAML file
        config: PathBuf,
    },
    /// Turn a concrete model file into a template with placeholders
    MakeTemplate {
        /// Existing model file
        input: PathBuf,
        /// Template file to write
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { config, output } => cmd_render(&config, &output),
        Commands::Run { config } => cmd_run(&config),
        Commands::Study { config } => cmd_study(&config),
        Commands::MakeTemplate { input, output } => cmd_make_template(&input, &output),
    }
}

fn print_advisories(advisories: &[Advisory]) {
    for advisory in advisories {
        println!("  ! {}", advisory);
    }
}

fn cmd_render(config_path: &Path, output: &Path) -> AppResult<()> {
    let config = load_config(config_path)?;
    let (path, advisories) = render_case_model(&config, output)?;
    print_advisories(&advisories);
    println!("✓ Model written: {}", path.display());
    Ok(())
}

fn cmd_run(config_path: &Path) -> AppResult<()> {
    let config = load_config(config_path)?;
    let converted = config.case.to_template_inputs()?;
    print_advisories(&converted.advisories);

    println!("Running case from template: {}", config.template.display());
    let mut runner = CaseRunner::from_config(&config);

    let report = runner.run_case(
        &config.results_dir,
        &converted.inputs,
        &chrono::Local::now(),
        Some(&mut |event| render_cli_progress(&event)),
    )?;
    clear_progress_line();

    println!("✓ Case completed: {}", report.handle);
    println!("  Folder: {}", report.folder.display());
    println!("  Initialized with: {}", report.entry_point);
    print_export("Trends", &report.trends);
    print_export("Profiles", &report.profiles);
    for (logger, sidecar) in &report.failed_profile_loggers {
        println!("  ✗ profile logger {} failed, see {}", logger, sidecar.display());
    }
    Ok(())
}

fn print_export(label: &str, status: &ExportStatus) {
    match status {
        ExportStatus::Exported(report) => {
            println!("  {}: {} file(s)", label, report.files.len());
            if !report.skipped_variables.is_empty() {
                println!("    skipped variables: {}", report.skipped_variables.len());
            }
        }
        ExportStatus::Failed { sidecar, message } => {
            println!("  {}: failed ({}), see {}", label, message, sidecar.display());
        }
    }
}

fn cmd_study(config_path: &Path) -> AppResult<()> {
    let config = load_config(config_path)?;
    let converted = config.case.to_template_inputs()?;
    print_advisories(&converted.advisories);
    if config.study.parameters.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "{} has no study.parameters to sweep",
            config_path.display()
        )));
    }

    let root = fr_results::create_result_folder(&config.results_dir, &chrono::Local::now())?;
    println!("Parameter study in: {}", root.display());
    for param in &config.study.parameters {
        println!("  {} = {:?}", param.key, param.values);
    }

    let mut runner = CaseRunner::from_config(&config);
    let mut on_case = |p: StudyProgress<'_>| -> AppResult<()> {
        match &p.result.outcome {
            CaseOutcome::Completed(report) => {
                println!("[{}/{}] ✓ {}", p.case_index, p.total, report.handle)
            }
            CaseOutcome::Failed { error } => {
                println!("[{}/{}] ✗ {}", p.case_index, p.total, error)
            }
        }
        io::stdout().flush()?;
        Ok(())
    };
    let report = run_study(
        &mut runner,
        &root,
        &converted.inputs,
        &config.study.parameters,
        Some(&mut on_case),
    )?;

    println!(
        "✓ Study finished: {} completed, {} failed",
        report.completed(),
        report.failed()
    );
    if !report.missing_trends.is_empty() {
        println!("  Cases without trend files: {:?}", report.missing_trends);
    }
    if !report.missing_profiles.is_empty() {
        println!("  Cases without profile files: {:?}", report.missing_profiles);
    }
    Ok(())
}

fn cmd_make_template(input: &Path, output: &Path) -> AppResult<()> {
    let model = fs::read_to_string(input)?;
    let (template, placeholders) = derive_template(&model);
    fs::write(output, template)?;
    info!(output = %output.display(), count = placeholders.len(), "template written");

    if placeholders.is_empty() {
        println!("No known assignments found; template is a copy of the model");
    } else {
        println!("✓ Template written: {}", output.display());
        for placeholder in placeholders {
            println!("  {}", placeholder);
        }
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &CaseProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {:?}  elapsed={:.2}s",
        spinner[spin_idx], event.stage, event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{:<120}", line);
    let _ = io::stdout().flush();
}
