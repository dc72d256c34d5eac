use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use hn_app::{
    AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, network_service,
    project_service, query, run_service,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hn-cli")]
#[command(about = "heatnet CLI - district heating network synthesis and hourly simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project file (YAML or JSON)
        project_path: PathBuf,
    },
    /// Generate the pipe network and write its GeoJSON layers
    Generate {
        /// Path to the project file
        project_path: PathBuf,
        /// Output directory for the layer files
        #[arg(short, long, default_value = "layers")]
        out_dir: PathBuf,
    },
    /// Run the hourly simulation
    Simulate {
        /// Path to the project file
        project_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Run chunks of this many hours in parallel
        #[arg(long)]
        chunk_hours: Option<usize>,
    },
    /// List cached runs for a project
    Runs {
        /// Path to the project file
        project_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the project file
        project_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export the hourly pump summary as CSV
    ExportPump {
        /// Path to the project file
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export every consumer-hour as CSV
    ExportConsumers {
        /// Path to the project file
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export one consumer variable as an hourly series
    ExportSeries {
        /// Path to the project file
        project_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Consumer point id
        consumer_id: String,
        /// Variable name (qext_w, mdot_kg_s, t_from_c, t_to_c, dp_bar)
        variable: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Generate {
            project_path,
            out_dir,
        } => cmd_generate(&project_path, &out_dir),
        Commands::Simulate {
            project_path,
            no_cache,
            chunk_hours,
        } => cmd_simulate(&project_path, !no_cache, chunk_hours),
        Commands::Runs { project_path } => cmd_runs(&project_path),
        Commands::ShowRun {
            project_path,
            run_id,
        } => cmd_show_run(&project_path, &run_id),
        Commands::ExportPump {
            project_path,
            run_id,
            output,
        } => cmd_export_pump(&project_path, &run_id, output.as_deref()),
        Commands::ExportConsumers {
            project_path,
            run_id,
            output,
        } => cmd_export_consumers(&project_path, &run_id, output.as_deref()),
        Commands::ExportSeries {
            project_path,
            run_id,
            consumer_id,
            variable,
            output,
        } => cmd_export_series(
            &project_path,
            &run_id,
            &consumer_id,
            &variable,
            output.as_deref(),
        ),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;

    let summary = project_service::summarize(&project);
    println!("✓ Project is valid");
    println!(
        "  {} streets, {} consumers, {} producer(s), {} hours, peak {:.1} kW",
        summary.streets,
        summary.consumers,
        summary.producers,
        summary.hours,
        summary.peak_demand_w / 1000.0
    );
    Ok(())
}

fn cmd_generate(project_path: &Path, out_dir: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let (_network, report) = network_service::export_layers(&project, out_dir)?;

    println!("✓ Network generated");
    println!(
        "  Forward: {} pipes, {:.1} m",
        report.forward_pipes, report.forward_length_m
    );
    println!(
        "  Return:  {} pipes, {:.1} m",
        report.return_pipes, report.return_length_m
    );
    if !report.unconnectable.is_empty() {
        println!("  Unconnectable: {}", report.unconnectable.join(", "));
    }
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }
    for file in &report.files {
        println!("  wrote {}", file.display());
    }
    Ok(())
}

fn cmd_simulate(project_path: &Path, use_cache: bool, chunk_hours: Option<usize>) -> AppResult<()> {
    println!("Running hourly simulation: {}", project_path.display());

    let request = RunRequest {
        project_path,
        options: RunOptions {
            use_cache,
            chunk_hours,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| {
            let emit_now =
                last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }
    print_timing_summary(&response.timing);

    let (manifest, record) = run_service::load_run(project_path, &response.run_id)?;
    let summary = query::get_run_summary(&manifest, &record)?;
    print_run_summary(&summary);
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (event.stage, event.hourly, event.fraction_complete()) {
        (RunStage::Simulating, Some(hourly), Some(fraction)) => {
            let width = 28usize;
            let filled = ((fraction * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  hour={}  {}/{}  converged={}  elapsed={:.1}s",
                bar,
                fraction * 100.0,
                hourly.hour,
                hourly.completed,
                hourly.total,
                hourly.converged,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &hn_app::RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);

    println!("\nTiming summary:");
    if timing.load_cache_time_s > 0.0 {
        println!("  Cache load: {:.3}s", timing.load_cache_time_s);
    } else {
        println!(
            "  Generate: {:.3}s ({:.1}%)",
            timing.generate_time_s,
            100.0 * timing.generate_time_s / total
        );
        println!(
            "  Simulate: {:.3}s ({:.1}%)",
            timing.simulate_time_s,
            100.0 * timing.simulate_time_s / total
        );
        println!(
            "  Save:     {:.3}s ({:.1}%)",
            timing.save_time_s,
            100.0 * timing.save_time_s / total
        );
    }
    println!("  Total:    {:.3}s", timing.total_time_s);
}

fn print_run_summary(summary: &query::RunSummary) {
    println!("\nRun Summary:");
    println!(
        "  Hours: {} ({} - {})",
        summary.record_count, summary.hour_range.0, summary.hour_range.1
    );
    println!("  Consumers: {}", summary.consumer_count);
    if let Some(worst) = &summary.worst_point {
        println!("  Worst point: {}", worst);
    }
    println!(
        "  Unconverged hours: {}  flagged consumer-hours: {}",
        summary.unconverged_hours.len(),
        summary.flagged_consumer_hours
    );
    println!(
        "  Heat: {:.1} kWh  peak {:.1} kW  max lift {:.2} bar  mean return {:.1} °C",
        summary.pump.heat_kwh,
        summary.pump.peak_heat_kw,
        summary.pump.max_lift_bar,
        summary.pump.mean_return_c
    );
}

fn cmd_runs(project_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(project_path)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", project_path.display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!(
                "  {} ({}, {} hours, {} unconverged)",
                manifest.run_id,
                manifest.timestamp,
                manifest.run_type.hours(),
                manifest.unconverged_hours.len()
            );
        }
    }
    Ok(())
}

fn cmd_show_run(project_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, record) = run_service::load_run(project_path, run_id)?;
    let summary = query::get_run_summary(&manifest, &record)?;
    println!("  Project: {}", manifest.project_name);
    println!("  Solver: {}", manifest.solver_version);
    print_run_summary(&summary);

    println!("\nConsumers:");
    for id in &manifest.consumer_ids {
        println!("  {}", id);
    }
    if !summary.unconverged_hours.is_empty() {
        println!("\nUnconverged hours: {:?}", summary.unconverged_hours);
    }
    Ok(())
}

/// File at `output`, or stdout.
fn open_output(output: Option<&Path>) -> AppResult<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    })
}

fn cmd_export_pump(project_path: &Path, run_id: &str, output: Option<&Path>) -> AppResult<()> {
    let (_manifest, record) = run_service::load_run(project_path, run_id)?;
    let rows = hn_results::pump_summary(&record.hours);
    hn_results::write_pump_csv(&rows, open_output(output)?)?;
    if let Some(path) = output {
        println!("✓ Exported {} hours to {}", rows.len(), path.display());
    }
    Ok(())
}

fn cmd_export_consumers(
    project_path: &Path,
    run_id: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let (manifest, record) = run_service::load_run(project_path, run_id)?;
    let rows = hn_results::consumer_rows(&record.hours, &manifest.consumer_ids);
    hn_results::write_consumer_csv(&rows, open_output(output)?)?;
    if let Some(path) = output {
        println!("✓ Exported {} rows to {}", rows.len(), path.display());
    }
    Ok(())
}

fn cmd_export_series(
    project_path: &Path,
    run_id: &str,
    consumer_id: &str,
    variable: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let (manifest, record) = run_service::load_run(project_path, run_id)?;
    let series = query::consumer_series(&manifest, &record, consumer_id, variable)?;

    let mut csv = String::from("hour,value\n");
    for (hour, val) in &series {
        csv.push_str(&format!("{},{}\n", hour, val));
    }

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            series.len(),
            path.display()
        );
    } else {
        print!("{}", csv);
    }
    Ok(())
}
