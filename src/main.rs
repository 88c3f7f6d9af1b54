// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use factory_link::{
    default_export_filename, export_to_file, load_catalog, truncate, write_csv, AgeBucket, AppConfig,
    CapacityBucket, DirectoryAction, DirectoryState, EmployeeBucket, FilterConfiguration,
    ManufacturerCatalog, RatingFloor, RevenueBucket, SelectionSet, SortConfiguration,
    SortDirection, SortField,
};

#[derive(Parser)]
#[command(name = "factory-link", version, about = "Search, compare and export manufacturers")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true, env = "FACTORYLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal browser (default)
    Browse,

    /// Filter, sort and print one page of manufacturers
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        sort: SortArgs,

        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (defaults to config)
        #[arg(long)]
        per_page: Option<usize>,
    },

    /// Export selected manufacturers to CSV
    Export {
        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        sort: SortArgs,

        /// Manufacturer ids to export
        #[arg(long = "id")]
        ids: Vec<String>,

        /// Select every record that matches the filters
        #[arg(long)]
        all_matching: bool,

        /// Output file, `-` for stdout (defaults to the export dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Free-text search
    #[arg(short, long)]
    query: Option<String>,

    #[arg(long = "state")]
    states: Vec<String>,

    #[arg(long = "capability")]
    capabilities: Vec<String>,

    #[arg(long = "material")]
    materials: Vec<String>,

    #[arg(long = "certification")]
    certifications: Vec<String>,

    /// 1-49, 50-199, 200-499, 500-999, 1000+
    #[arg(long)]
    employees: Option<EmployeeBucket>,

    /// <1m, 1m-10m, 10m-50m, 50m-100m, 100m+
    #[arg(long)]
    revenue: Option<RevenueBucket>,

    /// <50, 50-75, 75-90, 90+
    #[arg(long)]
    capacity: Option<CapacityBucket>,

    /// 3.0+, 3.5+, 4.0+, 4.5+
    #[arg(long)]
    min_rating: Option<RatingFloor>,

    /// Years in business: <5, 5-10, 10-25, 25-50, 50+
    #[arg(long)]
    established: Option<AgeBucket>,

    #[arg(long, conflicts_with = "not_diverse")]
    diverse: bool,

    #[arg(long)]
    not_diverse: bool,

    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=100))]
    min_sustainability: u8,
}

impl FilterArgs {
    fn to_filters(&self, reference_year: i32) -> FilterConfiguration {
        let mut filters = FilterConfiguration::as_of(reference_year);
        filters.search = self.query.clone().unwrap_or_default();
        filters.states = self.states.iter().map(|s| s.to_uppercase()).collect();
        filters.capabilities = self.capabilities.iter().cloned().collect();
        filters.materials = self.materials.iter().cloned().collect();
        filters.certifications = self.certifications.iter().cloned().collect();
        filters.employees = self.employees.unwrap_or_default();
        filters.revenue = self.revenue.unwrap_or_default();
        filters.capacity = self.capacity.unwrap_or_default();
        filters.rating = self.min_rating.unwrap_or_default();
        filters.established = self.established.unwrap_or_default();
        filters.diversity = match (self.diverse, self.not_diverse) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        filters.min_sustainability = self.min_sustainability;
        filters
    }
}

#[derive(Args)]
struct SortArgs {
    /// name, city, state, employees, revenue, rating, capacity,
    /// sustainability, moq, lead_time, year_established
    #[arg(long)]
    sort: Option<SortField>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,
}

impl SortArgs {
    fn to_sort(&self) -> SortConfiguration {
        SortConfiguration {
            field: self.sort,
            direction: if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env_and_file(cli.config.as_deref())?;
    factory_link::logging::init(&config.log_level, cli.verbose);

    let catalog = match &config.data_file {
        Some(path) => load_catalog(path).with_context(|| format!("Failed to load catalogue {:?}", path))?,
        None => ManufacturerCatalog::with_defaults(),
    };
    tracing::debug!(records = catalog.len(), "catalogue ready");

    match cli.command.unwrap_or(Command::Browse) {
        Command::Browse => run_browse(config, catalog),
        Command::Search {
            filters,
            sort,
            page,
            per_page,
        } => run_search(&config, &catalog, &filters, &sort, page, per_page),
        Command::Export {
            filters,
            sort,
            ids,
            all_matching,
            output,
        } => run_export(&config, &catalog, &filters, &sort, &ids, all_matching, output),
    }
}

fn current_year() -> i32 {
    Utc::now().year()
}

fn run_search(
    config: &AppConfig,
    catalog: &ManufacturerCatalog,
    filters: &FilterArgs,
    sort: &SortArgs,
    page: usize,
    per_page: Option<usize>,
) -> Result<()> {
    let mut state = DirectoryState::new(per_page.unwrap_or(config.items_per_page))
        .reduce(DirectoryAction::ReplaceFilters(filters.to_filters(current_year())))
        .reduce(DirectoryAction::ReplaceSort(sort.to_sort()))
        .reduce(DirectoryAction::GoToPage(page));

    let view = state.view(catalog);

    let active = state.filters.describe();
    if !active.is_empty() {
        println!("🔎 Filters: {}", active.join(" · "));
    }
    if let Some(field) = state.sort.field {
        println!("↕  Sort: {} {}", field, state.sort.direction.arrow());
    }
    println!(
        "{:<9} {:<34} {:<16} {:<3} {:>6} {:>6} {:>5} {:>5}",
        "ID", "Name", "City", "ST", "Empl.", "Rating", "Cap%", "Sust"
    );
    println!("{}", "─".repeat(92));

    for record in view.rows() {
        println!(
            "{:<9} {:<34} {:<16} {:<3} {:>6} {:>6} {:>5} {:>5}",
            record.id,
            truncate(&record.name, 34),
            truncate(record.city(), 16),
            record.state(),
            record.employee_count.map(|n| n.to_string()).unwrap_or_default(),
            record.rating.map(|r| format!("{:.1}", r)).unwrap_or_default(),
            record.current_capacity.map(|c| format!("{:.0}", c)).unwrap_or_default(),
            record.sustainability_score.map(|s| s.to_string()).unwrap_or_default(),
        );
    }

    println!("{}", "─".repeat(92));
    println!("{} ({} of {} manufacturers match)", view.page.summary(), view.filtered_count, view.total_count);
    Ok(())
}

fn run_export(
    config: &AppConfig,
    catalog: &ManufacturerCatalog,
    filters: &FilterArgs,
    sort: &SortArgs,
    ids: &[String],
    all_matching: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let state = DirectoryState::new(config.items_per_page)
        .reduce(DirectoryAction::ReplaceFilters(filters.to_filters(current_year())))
        .reduce(DirectoryAction::ReplaceSort(sort.to_sort()));

    let mut selection = SelectionSet::new();
    for id in ids {
        if catalog.find_by_id(id).is_none() {
            tracing::warn!(id = %id, "unknown manufacturer id ignored");
            continue;
        }
        selection.select(id);
    }

    let ordered = state.ordered(catalog);
    let records: Vec<_> = if all_matching {
        ordered
    } else {
        ordered.into_iter().filter(|r| selection.contains(&r.id)).collect()
    };

    let options = config.export_options();
    match output {
        Some(path) if path.as_os_str() == "-" => {
            write_csv(std::io::stdout().lock(), &records, &options)?;
        }
        other => {
            let path = other.unwrap_or_else(|| config.export_dir.join(default_export_filename(Utc::now().date_naive())));
            export_to_file(&path, &records, &options)?;
            eprintln!("✓ Exported {} manufacturers to {}", records.len(), path.display());
        }
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_browse(config: AppConfig, catalog: ManufacturerCatalog) -> Result<()> {
    let mut app = ui::App::new(catalog, config);
    ui::run_ui(&mut app)?;
    println!("\n✅ Browser closed");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_browse(_config: AppConfig, _catalog: ManufacturerCatalog) -> Result<()> {
    eprintln!("❌ Browse mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: factory-link search --help");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_search_flags() {
        let cli = Cli::parse_from([
            "factory-link",
            "search",
            "--state",
            "ca",
            "--employees",
            "50-199",
            "--min-rating",
            "4.0+",
            "--diverse",
            "--sort",
            "rating",
            "--desc",
        ]);

        let Some(Command::Search { filters, sort, .. }) = cli.command else {
            panic!("expected search");
        };
        let config = filters.to_filters(2025);
        assert!(config.states.contains("CA"));
        assert_eq!(config.employees, EmployeeBucket::Medium);
        assert_eq!(config.rating, RatingFloor::FourPlus);
        assert_eq!(config.diversity, Some(true));
        assert_eq!(sort.to_sort(), SortConfiguration::by(SortField::Rating, SortDirection::Descending));
    }

    #[test]
    fn test_cli_rejects_conflicting_diversity() {
        let result = Cli::try_parse_from(["factory-link", "search", "--diverse", "--not-diverse"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_command_is_browse() {
        let cli = Cli::parse_from(["factory-link"]);
        assert!(cli.command.is_none());
    }
}
