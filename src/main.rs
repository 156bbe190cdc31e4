use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use jiff::{Timestamp, tz::TimeZone};
use tracing_subscriber::{EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};
use wkq::{
	CachingTransport, Client, DiskCache, HttpTransport, Item, Kind, Levels, Query, Schedule, Transport, calendar,
	config::{self, AppConfig},
	gource, report,
};

const TRACE_FILE_ENV: &str = "WKQ_TRACE_FILE";

#[derive(Debug, Parser)]
#[command(author, version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"), about, long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
	/// API key. Takes precedence over the config file, WKQ_API_KEY and ~/.wanikani
	#[arg(short, long, global = true)]
	api_key: Option<String>,
	#[arg(short, long, global = true)]
	debug: bool,
	/// Reuse responses cached under $XDG_CACHE_HOME/wkq
	#[arg(long, global = true, overrides_with = "no_cache")]
	cache: bool,
	#[arg(long, global = true, overrides_with = "cache")]
	no_cache: bool,
	#[arg(long, global = true)]
	base_url: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Write the API key to ~/.wanikani
	SetKey { key: String },
	#[command(flatten)]
	Remote(RemoteCommand),
}

/// Commands that talk to the service.
#[derive(Debug, Subcommand)]
enum RemoteCommand {
	/// Show simple profile information
	Profile,
	/// Show level progress
	Progress,
	/// Show recently unlocked items
	Unlocks(UnlocksArgs),
	/// Show report of upcoming reviews
	Upcoming(UpcomingArgs),
	/// Items that are about to be burned
	Burning(BurningArgs),
	/// Items required to level up
	Blocker(BlockerArgs),
	/// Print an iCalendar feed
	Calendar(CalendarArgs),
	/// Generate log for rendering with gource
	Gource(GourceArgs),
}

#[derive(Args, Debug)]
struct UnlocksArgs {
	#[arg(short, long, default_value_t = 10)]
	limit: u32,
}

/// How a schedule is cut down before it is printed.
#[derive(Args, Debug)]
struct ViewArgs {
	/// List the items in each bucket
	#[arg(short, long)]
	show: bool,
	/// Print at most this many buckets
	#[arg(short, long)]
	limit: Option<usize>,
	/// Only reviews due before local midnight
	#[arg(short, long)]
	today: bool,
}

#[derive(Args, Debug)]
struct UpcomingArgs {
	/// Collapse overdue reviews into a single "now" bucket
	#[arg(short, long)]
	rollup: bool,
	/// Only items of the current level
	#[arg(short, long)]
	current: bool,
	/// Only apprentice radicals and kanji of the current level
	#[arg(short, long)]
	blocker: bool,
	/// e.g. `1-3,7`
	#[arg(long, default_value_t = Levels::All)]
	levels: Levels,
	#[command(flatten)]
	view: ViewArgs,
}

#[derive(Args, Debug)]
struct BurningArgs {
	#[arg(long, default_value_t = Levels::All)]
	levels: Levels,
	#[command(flatten)]
	view: ViewArgs,
}

#[derive(Args, Debug)]
struct BlockerArgs {
	#[arg(short, long)]
	show: bool,
}

#[derive(Args, Debug)]
struct CalendarArgs {
	#[command(subcommand)]
	feed: Feed,
}

#[derive(Debug, Subcommand)]
enum Feed {
	/// One event per blocker review time
	Blockers,
	/// One all-day event per day with the number of reviews due
	Reviews {
		#[arg(long, default_value_t = Levels::All)]
		levels: Levels,
	},
}

#[derive(Args, Debug)]
struct GourceArgs {
	#[arg(short, long, default_value_t = Levels::All)]
	levels: Levels,
	/// Group by level instead of by kind
	#[arg(short, long)]
	group: bool,
}

fn main() -> Result<()> {
	color_eyre::install()?;
	let cli = Cli::parse();
	init_tracing(cli.debug)?;

	match &cli.command {
		Command::SetKey { key } => set_key(key),
		Command::Remote(command) => {
			let config = AppConfig::load()?;
			let tz = config.timezone()?;
			let client = build_client(&cli, &config)?;
			run(command, &client, &tz)
		}
	}
}

fn set_key(key: &str) -> Result<()> {
	let path = config::legacy_key_path().ok_or_else(|| eyre!("HOME is not set, nowhere to write the key"))?;
	config::write_key_file(&path, key).wrap_err_with(|| format!("failed to write {}", path.display()))?;
	println!("Wrote API key to {}", path.display());
	Ok(())
}

fn run<T: Transport>(command: &RemoteCommand, client: &Client<T>, tz: &TimeZone) -> Result<()> {
	match command {
		RemoteCommand::Profile => print!("{}", report::profile(&client.profile()?)),
		RemoteCommand::Progress => print!("{}", report::progress(&client.level_progress()?)),
		RemoteCommand::Unlocks(args) => print!("{}", report::unlocks(&client.recent_unlocks(args.limit)?)),
		RemoteCommand::Upcoming(args) => upcoming(client, args, tz)?,
		RemoteCommand::Burning(args) => {
			let schedule = Query::burning(args.levels.clone()).run(client)?;
			print_schedule(schedule, &args.view, tz)?;
		}
		RemoteCommand::Blocker(args) => {
			let level = client.profile()?.level;
			let schedule = Query::blockers(level).run(client)?;
			print!("{}", report::schedule_table(&schedule, tz, args.show));
		}
		RemoteCommand::Calendar(args) => {
			let feed = match &args.feed {
				Feed::Blockers => calendar::blockers(&Query::blockers(client.profile()?.level).run(client)?),
				Feed::Reviews { levels } => calendar::reviews(&Query::upcoming(levels.clone()).run(client)?, tz),
			};
			print!("{}", feed.render(Timestamp::now()));
		}
		RemoteCommand::Gource(args) => {
			let username = client.profile()?.username;
			let mut items: Vec<Item> = Vec::new();
			for kind in Kind::ALL {
				for item in client.fetch(kind, &args.levels)? {
					items.push(item?);
				}
			}
			let grouping = if args.group { gource::Grouping::Level } else { gource::Grouping::Kind };
			for line in gource::log(&username, &items, grouping) {
				println!("{line}");
			}
		}
	}
	Ok(())
}

fn upcoming<T: Transport>(client: &Client<T>, args: &UpcomingArgs, tz: &TimeZone) -> Result<()> {
	let query = if args.blocker || args.current {
		let level = client.profile()?.level;
		println!("Showing upcoming items for level {level}");
		match args.blocker {
			true => Query::blockers(level),
			false => Query::upcoming(Levels::single(level)).at_level(level),
		}
	} else {
		Query::upcoming(args.levels.clone())
	};

	let mut schedule = query.run(client)?;
	if args.rollup {
		let now = Timestamp::now();
		if schedule.iter().next().is_some_and(|(ts, _)| *ts < now) {
			schedule = schedule.rollup(now);
			println!("Rolled up reviews");
		}
	}
	print_schedule(schedule, &args.view, tz)
}

fn print_schedule(mut schedule: Schedule, view: &ViewArgs, tz: &TimeZone) -> Result<()> {
	if view.today {
		let midnight = Timestamp::now().to_zoned(tz.clone()).date().tomorrow()?.to_zoned(tz.clone())?.timestamp();
		tracing::debug!(%midnight, "skipping reviews from tomorrow on");
		schedule = schedule.before(midnight);
	}
	if let Some(limit) = view.limit {
		schedule = schedule.take(limit);
	}
	print!("{}", report::schedule_table(&schedule, tz, view.show));
	Ok(())
}

fn build_client(cli: &Cli, config: &AppConfig) -> Result<Client<Box<dyn Transport>>> {
	let http = HttpTransport::new(config.timeout())?;
	let use_cache = match (cli.cache, cli.no_cache) {
		(true, _) => true,
		(_, true) => false,
		_ => config.cache,
	};
	let transport: Box<dyn Transport> = match use_cache {
		true => Box::new(CachingTransport::new(http, DiskCache::in_xdg_cache()?)),
		false => Box::new(http),
	};

	let api_key = config.api_key(cli.api_key.as_deref(), config::legacy_key_path().as_deref())?.unwrap_or_default();
	let base_url = cli.base_url.clone().unwrap_or_else(|| config.base_url.clone());
	Ok(Client::new(api_key, transport)?.with_base_url(base_url))
}

/// Human-readable events go to stderr. With `WKQ_TRACE_FILE` set, everything from this crate at
/// debug and above is also written there as JSON lines.
fn init_tracing(debug: bool) -> Result<()> {
	let filter = match debug {
		true => EnvFilter::new("debug"),
		false => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(option_env!("LOG_DIRECTIVES").unwrap_or("warn"))),
	};
	let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_filter(filter);

	let json_layer = match std::env::var_os(TRACE_FILE_ENV) {
		Some(path) => {
			let path = PathBuf::from(path);
			let file = std::fs::File::create(&path).wrap_err_with(|| format!("failed to create trace file {}", path.display()))?;
			Some(fmt::layer().json().with_writer(std::sync::Mutex::new(file)).with_filter(EnvFilter::new("wkq=debug")))
		}
		None => None,
	};

	tracing_subscriber::registry().with(stderr_layer).with(json_layer).init();
	Ok(())
}
