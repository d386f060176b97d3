use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::error;
use quire::config::Config;
use quire::pagination::PageNumber;
use quire::post::PostId;
use quire::render::Renderer;
use quire::sidebar::Sidebar;
use quire::store::MemoryStore;
use quire::url::Urls;
use quire::view::{self, Listing};
use std::io::Write;
use std::path::PathBuf;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn app() -> App<'static, 'static> {
    let page = Arg::with_name("page")
        .long("page")
        .takes_value(true)
        .value_name("N")
        .help("The page to show: a number or `last`");

    App::new("quire")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders blog pages to stdout")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .long("project")
                .short("p")
                .takes_value(true)
                .value_name("DIR")
                .global(true)
                .help("The project directory (or any directory below it)"),
        )
        .subcommand(
            SubCommand::with_name("index")
                .about("All posts")
                .arg(page.clone()),
        )
        .subcommand(
            SubCommand::with_name("category")
                .about("Posts in a category")
                .arg(Arg::with_name("slug").required(true))
                .arg(page.clone()),
        )
        .subcommand(
            SubCommand::with_name("tag")
                .about("Posts with a tag")
                .arg(Arg::with_name("slug").required(true))
                .arg(page.clone()),
        )
        .subcommand(
            SubCommand::with_name("archives")
                .about("Posts from a month")
                .arg(Arg::with_name("year").required(true))
                .arg(Arg::with_name("month").required(true))
                .arg(page.clone()),
        )
        .subcommand(
            SubCommand::with_name("search")
                .about("Posts whose title or body contain the terms")
                .arg(Arg::with_name("terms").multiple(true))
                .arg(page),
        )
        .subcommand(
            SubCommand::with_name("post")
                .about("A single post")
                .arg(Arg::with_name("id").required(true)),
        )
}

fn run() -> Result<()> {
    let matches = app().get_matches();

    let project = match matches.value_of("project") {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let config = Config::from_directory(&project)?;
    let mut store = MemoryStore::load(&config.data_directory)?;
    let urls = Urls::new(config.site_root.clone());
    let renderer = Renderer::new(
        config.index_template.as_slice(),
        config.detail_template.as_slice(),
        &config.title,
        urls.root(),
    )?;
    let sidebar = Sidebar::collect(&store, &urls, config.recent_posts)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match matches.subcommand() {
        ("post", Some(args)) => {
            let id = PostId(parse_arg(args, "id")?);
            let context = view::detail(&mut store, &urls, id)?;
            renderer.render_detail(&mut out, &context, &sidebar)?;
        }
        (name, Some(args)) => {
            let listing = listing(name, args)?;
            let page = PageNumber::parse(args.value_of("page"))?;
            let context = view::list(&store, &urls, &listing, page, config.page_size)?;
            renderer.render_listing(&mut out, &context, &sidebar)?;
        }
        (_, None) => return Err(anyhow!("a subcommand is required")),
    }

    out.flush()?;
    Ok(())
}

fn listing(name: &str, args: &ArgMatches) -> Result<Listing> {
    Ok(match name {
        "index" => Listing::Index,
        "category" => Listing::Category(required(args, "slug")?.to_owned()),
        "tag" => Listing::Tag(required(args, "slug")?.to_owned()),
        "archives" => Listing::Archives {
            year: parse_arg(args, "year")?,
            month: parse_arg(args, "month")?,
        },
        "search" => Listing::Search(
            args.values_of("terms")
                .map(|terms| terms.collect::<Vec<&str>>().join(" "))
                .unwrap_or_default(),
        ),
        other => return Err(anyhow!("unknown listing `{}`", other)),
    })
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.value_of(name)
        .ok_or_else(|| anyhow!("missing argument `{}`", name))
}

fn parse_arg<T>(args: &ArgMatches, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = required(args, name)?;
    raw.parse::<T>()
        .map_err(|e| anyhow!("invalid {} `{}`: {}", name, raw, e))
}
