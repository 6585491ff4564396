use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use enhanced_pairplot::{PairGridOptions, RenderOptions};
use enhanced_pairplot::{grid, stats, storage, viz};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "pairplot",
    version,
    about = "Render pair-plot grids annotated with descriptive and inferential statistics"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the annotated grid to an image (and optionally export the labels).
    Render(RenderArgs),
    /// Print per-variable, per-group summary statistics.
    Stats(StatsArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Input CSV file with a header row.
    #[arg(short, long)]
    input: PathBuf,
    /// Categorical column used to split the data into groups.
    #[arg(long)]
    hue: Option<String>,
    /// Variables to plot, separated by comma or semicolon (default: all numeric columns).
    #[arg(long)]
    vars: Option<String>,
    /// Output image (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// Width of the image (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the image (default 1000).
    #[arg(long, default_value_t = 1000)]
    height: u32,
    /// Skip the statistic labels.
    #[arg(long, default_value_t = false)]
    no_annotate: bool,
    /// Do not append "(N=count)" to legend entries.
    #[arg(long, default_value_t = false)]
    no_counts: bool,
    /// Locale for tick labels (en, de, fr, es, it, pt, nl).
    #[arg(long, default_value = "en")]
    locale: String,
    /// Export the computed labels to a file (format inferred by --format or extension).
    #[arg(long)]
    annotations: Option<PathBuf>,
    /// Format of --annotations (csv or json).
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// Input CSV file with a header row.
    #[arg(short, long)]
    input: PathBuf,
    /// Categorical column used to split the data into groups.
    #[arg(long)]
    hue: Option<String>,
    /// Save the summaries to a file as well (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Format of --out (csv or json).
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn resolve_format(format: Option<&OutFormat>, path: &Path) -> String {
    match format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let mut data = storage::load_csv(&args.input, args.hue.as_deref())?;
    if let Some(vars) = args.vars.as_deref() {
        data = data.select(&parse_list(vars))?;
    }

    let options = PairGridOptions {
        annotate: !args.no_annotate,
        show_counts: !args.no_counts,
        ..PairGridOptions::default()
    };
    let render = RenderOptions {
        width: args.width,
        height: args.height,
        locale: args.locale.clone(),
    };

    let scene = grid::build_pair_grid(&data, &options)?;
    viz::render_pair_grid(&scene, &args.out, &render)?;
    eprintln!("Wrote pair grid to {}", args.out.display());

    if let Some(path) = args.annotations.as_ref() {
        match resolve_format(args.format.as_ref(), path).as_str() {
            "csv" => storage::save_annotations_csv(&scene, path)?,
            "json" => storage::save_annotations_json(&scene, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!(
            "Saved {} annotations to {}",
            scene.annotations().count(),
            path.display()
        );
    }
    Ok(())
}

fn cmd_stats(args: StatsArgs) -> Result<()> {
    let data = storage::load_csv(&args.input, args.hue.as_deref())?;
    let summaries = stats::grouped_summary(&data);

    if let Some(path) = args.out.as_ref() {
        match resolve_format(args.format.as_ref(), path).as_str() {
            "csv" => storage::save_summary_csv(&summaries, path)?,
            "json" => storage::save_summary_json(&summaries, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} summaries to {}", summaries.len(), path.display());
    }

    for s in &summaries {
        let group = s.group.as_deref().unwrap_or("all");
        println!(
            "{} • {}  count={}  min={} max={} mean={} median={} sd={} ks_p={}",
            s.variable,
            group,
            s.count,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median),
            fmt_opt(s.std),
            fmt_opt(s.ks_p_value)
        );
    }
    Ok(())
}
