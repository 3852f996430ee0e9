use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use kqr::binning::make_bins;
use kqr::viz::{FrameRenderer, PlottersRenderer};
use kqr::{BinSizeChange, Confirm, Confirmation, Controller, Series, ViewConfig, storage};
use log::warn;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "kqr",
    version,
    about = "Bin, scale & chart k-mer frequency histograms"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the histogram to an SVG or PNG chart.
    Plot(PlotArgs),
    /// Print the estimated axis scales.
    Scales(ScalesArgs),
    /// Write the binned series to CSV or JSON.
    Bin(BinArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preset {
    Min,
    Max,
    Ideal,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Histogram file (.json, .csv, or two-column text such as `jellyfish histo` output).
    input: PathBuf,
    /// Series name to use when the file holds several (default: the first).
    #[arg(long)]
    series: Option<String>,
    /// JSON file with viewer settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PlotArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Chart path (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// Bucket width (1 = raw data). Defaults to the smallest width that fits the datapoint target.
    #[arg(long, conflicts_with = "detail")]
    bin_size: Option<u32>,
    /// Detail level (inverse of bin size: bin size = max_bin_size - detail).
    #[arg(long)]
    detail: Option<u32>,
    /// Upper bound of the x axis.
    #[arg(long, conflicts_with = "x")]
    x_scale: Option<f64>,
    /// Jump the x axis to a preset bound.
    #[arg(long, value_enum)]
    x: Option<Preset>,
    /// Upper bound of the y axis.
    #[arg(long, conflicts_with = "y")]
    y_scale: Option<f64>,
    /// Jump the y axis to a preset bound.
    #[arg(long, value_enum)]
    y: Option<Preset>,
    /// Width of the plot (default from config, 1000).
    #[arg(long)]
    width: Option<u32>,
    /// Height of the plot (default from config, 600).
    #[arg(long)]
    height: Option<u32>,
    /// Locale for tick labels (en, de, fr, ...).
    #[arg(long)]
    locale: Option<String>,
    /// Chart title (default: series name).
    #[arg(long)]
    title: Option<String>,
    /// Accept rebinning above the datapoint target without asking.
    #[arg(long, default_value_t = false)]
    yes: bool,
}

#[derive(Args, Debug)]
struct ScalesArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Bin size to estimate scales for.
    #[arg(long)]
    bin_size: Option<u32>,
    /// Print as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct BinArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Bucket width.
    #[arg(long)]
    bin_size: u32,
    /// Output file.
    #[arg(short, long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

/// Confirmation on the terminal; non-interactive runs fall back to `--yes`.
struct PromptConfirm {
    yes: bool,
}

impl Confirm for PromptConfirm {
    fn confirm(&mut self, points: usize, limit: usize) -> Confirmation {
        if self.yes {
            return Confirmation::Accepted;
        }
        if !std::io::stdin().is_terminal() {
            return Confirmation::Declined;
        }
        eprint!("This detail level shows {points} datapoints (limit {limit}) and may be slow. Continue? [y/N] ");
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_err() {
            return Confirmation::Declined;
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Confirmation::Accepted,
            _ => Confirmation::Declined,
        }
    }
}

fn fmt_num(x: f64) -> String {
    if x.is_finite() {
        // Format up to 4 decimals, then trim trailing zeros and trailing dot.
        let s = format!("{:.4}", x);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        "NA".to_string()
    }
}

fn load_config(path: Option<&Path>) -> Result<ViewConfig> {
    match path {
        Some(p) => ViewConfig::load(p).with_context(|| format!("reading config {}", p.display())),
        None => Ok(ViewConfig::default()),
    }
}

fn load_input(args: &InputArgs) -> Result<(Series, ViewConfig)> {
    let config = load_config(args.config.as_deref())?;
    let all = storage::load_series(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    let series = storage::select_series(all, args.series.as_deref())?;
    Ok((series, config))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Plot(args) => cmd_plot(args),
        Command::Scales(args) => cmd_scales(args),
        Command::Bin(args) => cmd_bin(args),
    }
}

fn cmd_plot(args: PlotArgs) -> Result<()> {
    let (series, mut config) = load_input(&args.input)?;
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    if let Some(l) = args.locale.as_ref() {
        config.locale = l.clone();
    }

    let renderer = PlottersRenderer::new(&args.out, config.width, config.height)
        .with_locale(&config.locale)
        .with_title(args.title.as_deref().unwrap_or(""));
    let mut view = Controller::new(series, config, renderer);
    view.show_chart()?;

    let mut confirm = PromptConfirm { yes: args.yes };
    let change = match (args.bin_size, args.detail) {
        (Some(b), _) => view.set_bin_size(b, &mut confirm)?,
        (None, Some(d)) => view.set_detail(d, &mut confirm)?,
        (None, None) => BinSizeChange::Unchanged,
    };
    if let BinSizeChange::Declined { points } = change {
        warn!("kept bin size {} instead of showing {} points", view.state().bin_size, points);
    }

    match (args.x_scale, args.x) {
        (Some(v), _) => view.set_x_scale(v)?,
        (None, Some(Preset::Min)) => view.set_min_x()?,
        (None, Some(Preset::Max)) => view.set_max_x()?,
        (None, Some(Preset::Ideal)) => view.set_ideal_x()?,
        (None, None) => {}
    }
    match (args.y_scale, args.y) {
        (Some(v), _) => view.set_y_scale(v)?,
        (None, Some(Preset::Min)) => view.set_min_y()?,
        (None, Some(Preset::Max)) => view.set_max_y()?,
        (None, Some(Preset::Ideal)) => view.set_ideal_y()?,
        (None, None) => {}
    }

    eprintln!("{}", view.status_text());
    eprintln!("Wrote plot to {}", view.renderer().out_path().display());
    Ok(())
}

fn cmd_scales(args: ScalesArgs) -> Result<()> {
    let (series, config) = load_input(&args.input)?;
    let mut view = Controller::new(series, config, FrameRenderer::default());
    view.show_chart()?;
    if let Some(b) = args.bin_size {
        view.set_bin_size(b, &mut kqr::AutoConfirm(Confirmation::Accepted))?;
    }
    let st = view.state();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&st.scales)?);
        return Ok(());
    }
    let s = st.scales;
    println!("series      {}", view.original().name());
    println!("bin size    {}", st.bin_size);
    println!(
        "x           min={} max={} ideal={}",
        fmt_num(s.x_min_scale),
        fmt_num(s.x_max_scale),
        fmt_num(s.x_ideal_scale)
    );
    println!(
        "y           min={} max={} ideal={} floor={}",
        fmt_num(s.y_min_scale),
        fmt_num(s.y_max_scale),
        fmt_num(s.y_ideal_scale),
        fmt_num(s.y_min_value)
    );
    println!("{}", view.status_text());
    Ok(())
}

fn cmd_bin(args: BinArgs) -> Result<()> {
    let (series, _config) = load_input(&args.input)?;
    let bins = make_bins(args.bin_size, &series.points());
    let path = &args.out;
    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(&bins, path)?,
        "json" => storage::save_json(series.name(), args.bin_size.max(1), &bins, path)?,
        other => anyhow::bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} bins to {}", bins.len(), path.display());
    Ok(())
}
