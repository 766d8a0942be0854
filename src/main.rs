use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use hourboard::{
    config::Config,
    report::{
        self,
        chart::{bar_series, pie_shares, render_bars, render_pie},
        CategoryFilter, Selection,
    },
    session::Session,
    store::CsvStore,
    table::Table,
};
use std::{collections::BTreeSet, path::PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Hours per activity from a timesheet CSV", long_about = None)]
struct Cli {
    /// YAML config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Timesheet CSV (overrides the config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    source: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the whole table
    Show {
        /// Unlocks the restricted column
        #[arg(long)]
        password: Option<String>,
    },
    /// List the periods present in the table
    Periods,
    /// List the activities, optionally within one period
    Activities {
        #[arg(long)]
        period: Option<String>,
    },
    /// Sum hours per activity for one period
    Report(ReportArgs),
    /// Distinct detail rows for one activity in one period
    Detail {
        #[arg(long)]
        period: String,
        #[arg(long)]
        activity: String,
        #[arg(long)]
        json: bool,
    },
    /// Change one cell and save
    Set {
        #[arg(long)]
        row: usize,
        #[arg(long)]
        column: String,
        #[arg(long)]
        value: String,
    },
    /// Append a row (values in column order) and save
    AddRow { values: Vec<String> },
    /// Remove a row and save
    DeleteRow {
        #[arg(long)]
        row: usize,
    },
    /// Print the resolved configuration as YAML
    Config,
}

impl Command {
    fn edits(&self) -> bool {
        matches!(
            self,
            Command::Set { .. } | Command::AddRow { .. } | Command::DeleteRow { .. }
        )
    }
}

#[derive(Parser, Debug)]
struct ReportArgs {
    #[arg(long)]
    period: String,

    /// Activities to include (repeatable)
    #[arg(long = "activity")]
    activities: Vec<String>,

    /// Include every activity instead of an explicit list
    #[arg(long, conflicts_with = "activities")]
    all_activities: bool,

    #[arg(long, value_enum)]
    chart: Option<ChartKind>,

    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChartKind {
    Bar,
    Pie,
}

const BAR_WIDTH: usize = 40;

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(source) = cli.source {
        config.source = source;
    }
    debug!(?config, "resolved config");

    if let Command::Config = cli.command {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let mut session = Session::open(CsvStore::new(&config.source))
        .with_context(|| format!("opening {}", config.source.display()))?;
    if let Some(notice) = session.notice() {
        eprintln!("{notice}");
    }
    // edits fall through so the session reports why they cannot proceed
    if !session.has_columns() && !cli.command.edits() {
        println!("no data available");
        return Ok(());
    }

    let columns = &config.columns;
    match cli.command {
        Command::Show { password } => {
            if session.table().is_empty() {
                println!("no data to show");
                return Ok(());
            }
            let view = config.gate().view(session.table(), password.as_deref());
            print_table(&view);
        }

        Command::Periods => {
            for p in report::distinct_values(session.table(), &columns.period)? {
                println!("{p}");
            }
        }

        Command::Activities { period } => {
            let scoped = match period {
                Some(p) => report::filter_by_period(session.table(), columns, &p)?,
                None => session.table().clone(),
            };
            for a in report::distinct_values(&scoped, &columns.category)? {
                println!("{a}");
            }
        }

        Command::Report(args) => {
            let categories = if args.all_activities {
                CategoryFilter::All
            } else {
                CategoryFilter::Only(args.activities.into_iter().collect::<BTreeSet<_>>())
            };
            let selection = Selection {
                period: args.period,
                categories,
            };
            let summary = report::build_report(session.table(), columns, &selection)?;

            if args.json {
                let chart = match args.chart {
                    Some(ChartKind::Bar) => serde_json::to_value(bar_series(&summary.groups))?,
                    Some(ChartKind::Pie) => serde_json::to_value(pie_shares(&summary.groups))?,
                    None => serde_json::Value::Null,
                };
                let out = serde_json::json!({ "report": summary, "chart": chart });
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }

            if summary.groups.is_empty() {
                println!("no hours to summarize for {}", summary.period);
                return Ok(());
            }
            println!("{}\t{}", columns.category, columns.measure);
            for (activity, hours) in summary.groups.iter() {
                println!("{activity}\t{hours}");
            }
            println!("total\t{}", summary.total);

            match args.chart {
                Some(ChartKind::Bar) => {
                    print!("\n{}", render_bars(&bar_series(&summary.groups), BAR_WIDTH))
                }
                Some(ChartKind::Pie) => print!("\n{}", render_pie(&pie_shares(&summary.groups))),
                None => {}
            }
        }

        Command::Detail {
            period,
            activity,
            json,
        } => {
            let rows = report::detail_for(session.table(), columns, &period, &activity)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_table(&Table::from_rows(columns.detail.clone(), rows));
            }
        }

        Command::Set { row, column, value } => {
            session.set_cell(row, &column, value)?;
            session.save()?;
            info!(row, column = %column, "cell updated");
        }

        Command::AddRow { values } => {
            session.append_row(values)?;
            session.save()?;
            info!(rows = session.table().len(), "row appended");
        }

        Command::DeleteRow { row } => {
            let removed = session.delete_row(row)?;
            session.save()?;
            info!(row, ?removed, "row deleted");
        }

        Command::Config => {}
    }

    Ok(())
}

/// Left-aligned columns with a leading row index.
fn print_table(table: &Table) {
    let mut widths: Vec<usize> = table.headers().iter().map(|h| h.chars().count()).collect();
    for row in table.rows() {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let idx_w = table.len().saturating_sub(1).to_string().len();

    let line = |idx: &str, cells: &[String]| {
        let body: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        println!("{idx:>idx_w$}  {}", body.join("  ").trim_end());
    };

    line("", table.headers());
    for (i, row) in table.rows().iter().enumerate() {
        line(&i.to_string(), row);
    }
}
