//! Affiliate Admin CLI: log in, browse and export entity lists, change
//! statuses, and view the dashboard against the affiliate backend.

use std::path::PathBuf;
use std::sync::Arc;

use affiliate_api::{ConsoleApi, Credentials, DateRange, HttpApi, MemoryApi};
use affiliate_console::columns::CellValue;
use affiliate_console::dashboard::{conversion_rate, profit, DEFAULT_RANGE_DAYS};
use affiliate_console::quick_search::quick_filter;
use affiliate_console::{
    AppStore, DashboardController, EntityListController, Session, SessionVault, Severity,
    StoreEntity, SearchFilter, ToastCenter,
};
use affiliate_core::types::{Advertiser, Campaign, Publisher, User};
use affiliate_core::{AppConfig, EntityId, EntityKind};
use anyhow::{anyhow, bail, Context};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "affiliate-admin")]
#[command(about = "Affiliate marketing administration console")]
#[command(version)]
struct Cli {
    /// Backend base URL (overrides config)
    #[arg(long, global = true, env = "AFFILIATE_CONSOLE__API__BASE_URL")]
    base_url: Option<String>,

    /// Session vault path (overrides config)
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    /// Use the built-in demo backend instead of HTTP
    #[arg(long, global = true, default_value_t = false)]
    demo: bool,

    /// Emit logs as JSON
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Clear the persisted session
    Logout,

    /// Show the current identity and visible menu
    Whoami,

    /// List campaigns, publishers, advertisers or users
    List {
        entity: EntityKind,

        /// Search filter as key=value; repeatable, `a,b` for lists
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// Client-side quick search (campaigns only)
        #[arg(long)]
        quick: Option<String>,

        /// Comma-separated column keys to show
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
    },

    /// Export the visible columns of a list to CSV
    Export {
        entity: EntityKind,

        #[arg(long = "filter")]
        filters: Vec<String>,

        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Output directory (default: console.export_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Change the status of one record
    SetStatus {
        entity: EntityKind,
        id: String,
        status: String,
    },

    /// Delete one record
    Delete { entity: EntityKind, id: String },

    /// Show dashboard analytics (default: last 7 days)
    Dashboard {
        /// Start date, YYYY-MM-DD
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End date, YYYY-MM-DD
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

struct Console<A> {
    session: Arc<Session<A>>,
    toasts: Arc<ToastCenter>,
    config: AppConfig,
}

fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "affiliate_admin=info,warn".into()),
        )
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(base_url) = cli.base_url.clone() {
        config.api.base_url = base_url;
    }
    if let Some(path) = cli.session.clone() {
        config.session.path = path;
    }
    debug!(base_url = %config.api.base_url, session = %config.session.path.display(), demo = cli.demo, "Configuration loaded");

    let toasts = Arc::new(ToastCenter::new(config.console.toast_ttl()));
    let result = if cli.demo {
        info!("Using in-memory demo backend");
        run(Arc::new(MemoryApi::with_demo_data()), config, toasts.clone(), cli.command).await
    } else {
        match HttpApi::new(&config.api) {
            Ok(api) => run(Arc::new(api), config, toasts.clone(), cli.command).await,
            Err(e) => Err(e.into()),
        }
    };

    let mut reported = false;
    for toast in toasts.history() {
        match toast.severity {
            Severity::Error | Severity::Warning => {
                reported = true;
                eprintln!("{}", toast.message);
            }
            _ => println!("{}", toast.message),
        }
    }
    if let Err(e) = result {
        if !reported {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

async fn run<A: ConsoleApi>(
    api: Arc<A>,
    config: AppConfig,
    toasts: Arc<ToastCenter>,
    command: Commands,
) -> anyhow::Result<()> {
    let session = Arc::new(Session::new(
        api,
        AppStore::shared(),
        SessionVault::new(config.session.path.clone()),
    ));
    let console = Console {
        session,
        toasts,
        config,
    };

    match command {
        Commands::Login { email, password } => cmd_login(&console, email, password).await,
        Commands::Logout => cmd_logout(&console),
        Commands::Whoami => cmd_whoami(&console),
        Commands::List {
            entity,
            filters,
            quick,
            columns,
        } => {
            require_session(&console)?;
            cmd_list(&console, entity, &filters, quick.as_deref(), &columns).await
        }
        Commands::Export {
            entity,
            filters,
            columns,
            out,
        } => {
            require_session(&console)?;
            cmd_export(&console, entity, &filters, &columns, out).await
        }
        Commands::SetStatus { entity, id, status } => {
            require_session(&console)?;
            cmd_set_status(&console, entity, &id, &status).await
        }
        Commands::Delete { entity, id } => {
            require_session(&console)?;
            cmd_delete(&console, entity, &id).await
        }
        Commands::Dashboard { from, to } => {
            require_session(&console)?;
            cmd_dashboard(&console, from, to).await
        }
    }
}

fn require_session<A: ConsoleApi>(console: &Console<A>) -> anyhow::Result<()> {
    match console.session.restore()? {
        Some(identity) => {
            debug!(user = %identity.email, "Session active");
            Ok(())
        }
        None => bail!("Not logged in or session expired. Run `affiliate-admin login` first."),
    }
}

// ---------------------------------------------------------------------------
// Session commands
// ---------------------------------------------------------------------------

async fn cmd_login<A: ConsoleApi>(
    console: &Console<A>,
    email: String,
    password: String,
) -> anyhow::Result<()> {
    let identity = console
        .session
        .login(&Credentials { email, password })
        .await
        .context("Login failed")?;
    println!("Logged in as {} <{}> ({})", identity.name, identity.email, identity.role);
    Ok(())
}

fn cmd_logout<A: ConsoleApi>(console: &Console<A>) -> anyhow::Result<()> {
    console.session.restore()?;
    let next = console.session.logout();
    println!("Logged out. Next: {next}");
    Ok(())
}

fn cmd_whoami<A: ConsoleApi>(console: &Console<A>) -> anyhow::Result<()> {
    require_session(console)?;
    let store = console.session.store().read();
    let identity = store
        .auth
        .identity()
        .ok_or_else(|| anyhow!("session has no identity"))?;

    println!("=== Identity ===");
    println!("  ID:      {}", identity.id);
    println!("  Name:    {}", identity.name);
    println!("  Email:   {}", identity.email);
    println!("  Role:    {}", identity.role);
    if let Some(exp) = identity.expires_at {
        println!("  Expires: {}", exp.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    }
    println!();
    println!("=== Menu ===");
    for item in store.auth.menu() {
        println!("  {:<14} {}", item.label, item.route);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entity commands
// ---------------------------------------------------------------------------

async fn load<E: StoreEntity, A: ConsoleApi>(
    console: &Console<A>,
    filters: &[String],
    columns: &[String],
) -> anyhow::Result<EntityListController<E, A>> {
    let mut ctl = EntityListController::<E, A>::new(console.session.clone(), console.toasts.clone());
    ctl.load_preferences().await?;
    if !columns.is_empty() {
        ctl.show_only(columns)?;
    }
    let filter = SearchFilter::from_pairs(filters).map_err(|e| anyhow!(e))?;
    ctl.search(filter.as_filter().clone()).await?;
    Ok(ctl)
}

fn print_table<E: StoreEntity, A: ConsoleApi>(ctl: &EntityListController<E, A>, records: &[E]) {
    let columns = ctl.visible_columns();
    if columns.is_empty() {
        println!("(no columns selected)");
        return;
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| columns.iter().map(|c| render_cell(&c.value(r))).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.title.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    println!("{}", line(columns.iter().map(|c| c.title).collect()));
    for row in &rows {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
    println!("\n{} {}", records.len(), ctl.kind().plural());
}

fn render_cell(value: &CellValue) -> String {
    match value {
        CellValue::List(items) => items.join(", "),
        other => other.render(),
    }
}

async fn cmd_list<A: ConsoleApi>(
    console: &Console<A>,
    kind: EntityKind,
    filters: &[String],
    quick: Option<&str>,
    columns: &[String],
) -> anyhow::Result<()> {
    if quick.is_some() && kind != EntityKind::Campaign {
        bail!("--quick is only available for campaigns");
    }
    match kind {
        EntityKind::Campaign => {
            let ctl = load::<Campaign, A>(console, filters, columns).await?;
            let records = ctl.records();
            let shown: Vec<Campaign> = match quick {
                Some(q) => quick_filter(&records, q).into_iter().cloned().collect(),
                None => records,
            };
            print_table(&ctl, &shown);
        }
        EntityKind::Publisher => list_entity::<Publisher, A>(console, filters, columns).await?,
        EntityKind::Advertiser => list_entity::<Advertiser, A>(console, filters, columns).await?,
        EntityKind::User => list_entity::<User, A>(console, filters, columns).await?,
    }
    Ok(())
}

async fn list_entity<E: StoreEntity, A: ConsoleApi>(
    console: &Console<A>,
    filters: &[String],
    columns: &[String],
) -> anyhow::Result<()> {
    let ctl = load::<E, A>(console, filters, columns).await?;
    print_table(&ctl, &ctl.records());
    Ok(())
}

async fn cmd_export<A: ConsoleApi>(
    console: &Console<A>,
    kind: EntityKind,
    filters: &[String],
    columns: &[String],
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let dir = out.unwrap_or_else(|| console.config.console.export_dir.clone());
    let today = Local::now().date_naive();
    let export = match kind {
        EntityKind::Campaign => load::<Campaign, A>(console, filters, columns).await?.export(today),
        EntityKind::Publisher => load::<Publisher, A>(console, filters, columns).await?.export(today),
        EntityKind::Advertiser => {
            load::<Advertiser, A>(console, filters, columns).await?.export(today)
        }
        EntityKind::User => load::<User, A>(console, filters, columns).await?.export(today),
    };
    let path = export
        .write_to(&dir)
        .with_context(|| format!("Failed to write export to {}", dir.display()))?;
    println!("Exported to {}", path.display());
    Ok(())
}

async fn cmd_set_status<A: ConsoleApi>(
    console: &Console<A>,
    kind: EntityKind,
    id: &str,
    status: &str,
) -> anyhow::Result<()> {
    match kind {
        EntityKind::Campaign => set_status::<Campaign, A>(console, id, status).await,
        EntityKind::Publisher => set_status::<Publisher, A>(console, id, status).await,
        EntityKind::Advertiser => set_status::<Advertiser, A>(console, id, status).await,
        EntityKind::User => set_status::<User, A>(console, id, status).await,
    }
}

async fn set_status<E: StoreEntity, A: ConsoleApi>(
    console: &Console<A>,
    id: &str,
    status: &str,
) -> anyhow::Result<()> {
    let status: E::Status = status.parse().map_err(|e: String| anyhow!(e))?;
    let id: EntityId = id.parse()?;
    let ctl = EntityListController::<E, A>::new(console.session.clone(), console.toasts.clone());
    ctl.set_status(&id, status).await?;
    Ok(())
}

async fn cmd_delete<A: ConsoleApi>(
    console: &Console<A>,
    kind: EntityKind,
    id: &str,
) -> anyhow::Result<()> {
    let id: EntityId = id.parse()?;
    match kind {
        EntityKind::Campaign => delete::<Campaign, A>(console, &id).await,
        EntityKind::Publisher => delete::<Publisher, A>(console, &id).await,
        EntityKind::Advertiser => delete::<Advertiser, A>(console, &id).await,
        EntityKind::User => delete::<User, A>(console, &id).await,
    }
}

async fn delete<E: StoreEntity, A: ConsoleApi>(
    console: &Console<A>,
    id: &EntityId,
) -> anyhow::Result<()> {
    let ctl = EntityListController::<E, A>::new(console.session.clone(), console.toasts.clone());
    ctl.remove(id).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

async fn cmd_dashboard<A: ConsoleApi>(
    console: &Console<A>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let mut dashboard =
        DashboardController::new(console.session.clone(), console.toasts.clone(), today);
    let range = match (from, to) {
        (Some(from), Some(to)) => DateRange::new(from, to),
        (Some(from), None) => DateRange::new(from, today),
        (None, Some(to)) => DateRange::last_days(to, DEFAULT_RANGE_DAYS),
        (None, None) => dashboard.range(),
    };
    dashboard.load(range).await?;
    let data = dashboard
        .data()
        .ok_or_else(|| anyhow!("dashboard returned no data"))?;
    let s = &data.summary;

    println!("=== Dashboard {} to {} ===", range.from, range.to);
    println!("  Clicks:            {}", s.clicks);
    println!("  Conversions:       {}", s.conversions);
    println!("  Conversion rate:   {:.2}%", conversion_rate(s));
    println!("  Revenue:           {:.2}", s.revenue);
    println!("  Payout:            {:.2}", s.payout);
    println!("  Profit:            {:.2}", profit(s));
    println!("  Active campaigns:  {}", s.active_campaigns);
    println!("  Active publishers: {}", s.active_publishers);
    println!();
    println!("  {:<12} {:>8} {:>11} {:>10}", "Date", "Clicks", "Conversions", "Revenue");
    for point in &data.series {
        println!(
            "  {:<12} {:>8} {:>11} {:>10.2}",
            point.date.to_string(),
            point.clicks,
            point.conversions,
            point.revenue
        );
    }
    debug!(generated_at = %Utc::now(), "Dashboard rendered");
    Ok(())
}
