use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use freedom_dashboard::aggregate;
use freedom_dashboard::export;
use freedom_dashboard::facets::Facets;
use freedom_dashboard::filter::{self, FilterCriteria, Page, ScoreRange};
use freedom_dashboard::io::{DEFAULT_DATA_URL, SourceSpec};
use freedom_dashboard::model::EntityKind;
use freedom_dashboard::present::{self, ColorScale, PresentationOptions, RenderRequest, Theme};
use freedom_dashboard::session::{DatasetCache, Session};
use freedom_dashboard::{DashboardError, Result};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| DashboardError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let cache = DatasetCache::new();
    match cli.command {
        Command::Facets(args) => {
            let session = open_session(&cache, &args, PresentationOptions::default())?;
            print_json(&session.facets())
        }
        Command::Summary(args) => execute_summary(&cache, args),
        Command::Trend(args) => execute_trend(&cache, args),
        Command::Export(args) => execute_export(&cache, args),
        Command::Render(args) => execute_render(&cache, args),
    }
}

fn open_session(
    cache: &DatasetCache,
    source: &SourceArgs,
    options: PresentationOptions,
) -> Result<Session> {
    Session::open(cache, &source.to_spec(), options)
}

fn execute_summary(cache: &DatasetCache, args: FilteredArgs) -> Result<()> {
    let session = open_session(cache, &args.source, PresentationOptions::default())?;
    let criteria = args.filters.to_criteria(&session.facets())?;
    let view = filter::apply(session.table(), &criteria);
    let summary = aggregate::summary(&view);

    println!("Rows: {}", summary.count);
    for kpi in present::summary_kpis(&summary) {
        println!("{}: {}", kpi.label, kpi.value);
    }
    if summary.is_empty() {
        println!("{}", present::EMPTY_OVERVIEW_NOTICE);
    }
    Ok(())
}

fn execute_trend(cache: &DatasetCache, args: TrendArgs) -> Result<()> {
    let session = open_session(cache, &args.source, args.presentation.to_options())?;
    print_json(&present::trend_input(
        session.table(),
        args.entities.as_slice(),
        &session.options(),
    ))
}

fn execute_export(cache: &DatasetCache, args: ExportArgs) -> Result<()> {
    let session = open_session(cache, &args.filtered.source, PresentationOptions::default())?;
    let criteria = args.filtered.filters.to_criteria(&session.facets())?;
    let view = filter::apply(session.table(), &criteria);

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(export::suggested_filename(&criteria)));
    let format = args.format.unwrap_or_else(|| ExportFormat::guess(&output));

    let written = match format {
        ExportFormat::Csv => {
            let text = export::to_delimited_text(&view)?;
            if !text.is_empty() {
                fs::write(&output, text)?;
            }
            !view.is_empty()
        }
        ExportFormat::Xlsx => export::write_workbook(&view, &output)?,
    };

    if written {
        println!("wrote {} rows to {}", view.len(), output.display());
    } else {
        warn!("no rows match the selected filters; nothing exported");
    }
    Ok(())
}

fn execute_render(cache: &DatasetCache, args: RenderArgs) -> Result<()> {
    let session = open_session(cache, &args.filtered.source, args.presentation.to_options())?;
    let facets = session.facets();
    let mut criteria = args.filtered.filters.to_criteria(&facets)?;
    if criteria.year.is_none() {
        criteria.year = facets.latest_year();
    }
    let page = Page::from(args.page);
    if page == Page::EntityFocus && criteria.entity_name.is_none() {
        criteria.entity_name = facets.entity_names.first().cloned();
    }

    let request = RenderRequest {
        page: Some(page),
        criteria,
        trend_entities: args.trend_entities,
    };
    print_json(&session.render(&request)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_criteria(path: &Path) -> Result<FilterCriteria> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Explore Freedom in the World scores by year, region, and status."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the values offered by each filter.
    Facets(SourceArgs),
    /// Print headline statistics for the filtered rows.
    Summary(FilteredArgs),
    /// Print the score trend of one or more entities across all years.
    Trend(TrendArgs),
    /// Write the filtered rows to a CSV or Excel file.
    Export(ExportArgs),
    /// Render a dashboard page as JSON.
    Render(RenderArgs),
}

#[derive(clap::Args)]
struct SourceArgs {
    #[arg(
        long,
        help = "Workbook (.xlsx) or CSV file holding the dataset",
        long_help = format!(
            "Workbook (.xlsx) or CSV file holding the dataset. The published workbook \
             can be downloaded from {DEFAULT_DATA_URL}"
        )
    )]
    input: PathBuf,

    /// Worksheet to read; defaults to FIW13-25 or the first sheet.
    #[arg(long)]
    sheet: Option<String>,

    /// Zero-based header row; detected when omitted.
    #[arg(long)]
    header_row: Option<usize>,
}

impl SourceArgs {
    fn to_spec(&self) -> SourceSpec {
        SourceSpec {
            path: self.input.clone(),
            sheet: self.sheet.clone(),
            header_row: self.header_row,
        }
    }
}

#[derive(clap::Args)]
struct FilterArgs {
    /// JSON file with filter criteria; flags below override its fields.
    #[arg(long)]
    criteria: Option<PathBuf>,

    #[arg(long)]
    year: Option<i32>,

    /// Lower total score bound (inclusive).
    #[arg(long)]
    min_score: Option<f64>,

    /// Upper total score bound (inclusive).
    #[arg(long)]
    max_score: Option<f64>,

    /// Allowed region; repeat to allow several.
    #[arg(long = "region")]
    regions: Vec<String>,

    /// Allowed freedom status; repeat to allow several.
    #[arg(long = "status")]
    statuses: Vec<String>,

    #[arg(long, value_enum)]
    kind: Option<KindArg>,

    /// Country or territory name.
    #[arg(long)]
    entity: Option<String>,
}

impl FilterArgs {
    fn to_criteria(&self, facets: &Facets) -> Result<FilterCriteria> {
        let mut criteria = match &self.criteria {
            Some(path) => load_criteria(path)?,
            None => FilterCriteria::default(),
        };

        if let Some(year) = self.year {
            criteria.year = Some(year);
        }
        if self.min_score.is_some() || self.max_score.is_some() {
            let (lower, upper) = facets.score_bounds;
            criteria.score_range = Some(ScoreRange::new(
                self.min_score.unwrap_or(lower),
                self.max_score.unwrap_or(upper),
            )?);
        }
        if !self.regions.is_empty() {
            criteria.regions = self.regions.iter().cloned().collect::<BTreeSet<_>>();
        }
        if !self.statuses.is_empty() {
            criteria.statuses = self.statuses.iter().cloned().collect::<BTreeSet<_>>();
        }
        if let Some(kind) = self.kind {
            criteria.entity_kind = Some(kind.into());
        }
        if let Some(entity) = &self.entity {
            criteria.entity_name = Some(entity.clone());
        }
        Ok(criteria)
    }
}

#[derive(clap::Args)]
struct FilteredArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    filters: FilterArgs,
}

#[derive(clap::Args)]
struct PresentationArgs {
    /// Map color scale; defaults to viridis on the overview and Turbo on the
    /// entity page.
    #[arg(long, value_enum)]
    color_scale: Option<ColorScaleArg>,

    /// Use the dark chart template.
    #[arg(long)]
    dark: bool,
}

impl PresentationArgs {
    fn to_options(&self) -> PresentationOptions {
        PresentationOptions {
            color_scale: self.color_scale.map(ColorScale::from),
            theme: if self.dark { Theme::Dark } else { Theme::Light },
        }
    }
}

#[derive(clap::Args)]
struct TrendArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    presentation: PresentationArgs,

    /// Entity to plot; repeat for several lines.
    #[arg(long = "entity", required = true)]
    entities: Vec<String>,
}

#[derive(clap::Args)]
struct ExportArgs {
    #[command(flatten)]
    filtered: FilteredArgs,

    /// Output path; defaults to a name derived from the selection.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format; guessed from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,
}

#[derive(clap::Args)]
struct RenderArgs {
    #[command(flatten)]
    filtered: FilteredArgs,

    #[command(flatten)]
    presentation: PresentationArgs,

    #[arg(long, value_enum, default_value_t = PageArg::Overview)]
    page: PageArg,

    /// Entity plotted on the overview trend chart; repeatable.
    #[arg(long = "trend")]
    trend_entities: Vec<String>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    fn guess(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => ExportFormat::Xlsx,
            _ => ExportFormat::Csv,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum KindArg {
    Country,
    Territory,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Country => EntityKind::Country,
            KindArg::Territory => EntityKind::Territory,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PageArg {
    Overview,
    Entity,
}

impl From<PageArg> for Page {
    fn from(page: PageArg) -> Self {
        match page {
            PageArg::Overview => Page::Overview,
            PageArg::Entity => Page::EntityFocus,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ColorScaleArg {
    #[value(name = "viridis")]
    Viridis,
    #[value(name = "plasma")]
    Plasma,
    #[value(name = "inferno")]
    Inferno,
    #[value(name = "magma")]
    Magma,
    #[value(name = "cividis")]
    Cividis,
    #[value(name = "RdYlGn")]
    RdYlGn,
    #[value(name = "Blues")]
    Blues,
    #[value(name = "Greens")]
    Greens,
    #[value(name = "Turbo")]
    Turbo,
    #[value(name = "IceFire")]
    IceFire,
}

impl From<ColorScaleArg> for ColorScale {
    fn from(scale: ColorScaleArg) -> Self {
        match scale {
            ColorScaleArg::Viridis => ColorScale::Viridis,
            ColorScaleArg::Plasma => ColorScale::Plasma,
            ColorScaleArg::Inferno => ColorScale::Inferno,
            ColorScaleArg::Magma => ColorScale::Magma,
            ColorScaleArg::Cividis => ColorScale::Cividis,
            ColorScaleArg::RdYlGn => ColorScale::RdYlGn,
            ColorScaleArg::Blues => ColorScale::Blues,
            ColorScaleArg::Greens => ColorScale::Greens,
            ColorScaleArg::Turbo => ColorScale::Turbo,
            ColorScaleArg::IceFire => ColorScale::IceFire,
        }
    }
}
