//! Biblio - command line client for the personal library API

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblio_client::{
    config::{ClientConfig, LoggingConfig},
    models::{
        weather::{find_city, CITIES},
        Book, CreateBook, LoginRequest, RegistrationForm, UpdateBook, Units, WeatherQuery,
    },
    services::token_watch::TokenWatch,
    LibraryClient,
};

#[derive(Parser)]
#[command(name = "biblio", version, about = "Personal library client")]
struct Cli {
    /// Username or email to log in with before running the command
    #[arg(long, env = "BIBLIO_LOGIN", global = true)]
    login: Option<String>,

    #[arg(long, env = "BIBLIO_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and log in with it
    Register {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
    },
    #[command(subcommand)]
    Books(BooksCommand),
    #[command(subcommand)]
    Weather(WeatherCommand),
    #[command(subcommand)]
    Token(TokenCommand),
    /// List preset cities for weather lookups
    Cities,
}

#[derive(Subcommand)]
enum BooksCommand {
    List {
        /// Serve from cache when possible
        #[arg(long)]
        cached: bool,
    },
    Get {
        id: i64,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        editorial: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        pages: Option<i32>,
    },
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        isbn: Option<String>,
        #[arg(long)]
        editorial: Option<String>,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        pages: Option<i32>,
    },
    Delete {
        id: i64,
    },
}

#[derive(clap::Args)]
struct Location {
    /// Preset city name (see `biblio cities`)
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    city: Option<String>,
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
    #[arg(long)]
    units: Option<Units>,
    #[arg(long)]
    lang: Option<String>,
}

#[derive(Subcommand)]
enum WeatherCommand {
    Current(Location),
    /// Forecast in 3-hour steps
    Hourly(Location),
    Daily {
        #[command(flatten)]
        location: Location,
        #[arg(long)]
        days: Option<u32>,
    },
}

#[derive(Subcommand)]
enum TokenCommand {
    Show,
    /// Print the remaining token lifetime every second until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ClientConfig::load()?;
    init_tracing(&config.logging);

    tracing::debug!("Biblio client v{} using {}", env!("CARGO_PKG_VERSION"), config.api.base_url);

    let client = LibraryClient::new(config)?;

    if let (Some(login), Some(password)) = (cli.login, cli.password) {
        client
            .services
            .auth
            .login(&LoginRequest { login, password })
            .await?;
    }

    match cli.command {
        Command::Register { username, email, password, confirm_password } => {
            let response = client
                .services
                .auth
                .register_and_login(RegistrationForm { username, email, password, confirm_password })
                .await?;
            println!("Welcome {}! Your account has been created.", response.user.username);
        }
        Command::Books(command) => run_books(&client, command).await?,
        Command::Weather(command) => run_weather(&client, command).await?,
        Command::Token(command) => run_token(&client, command).await?,
        Command::Cities => {
            for city in CITIES {
                println!("{:<18} {:>9.4} {:>10.4}  {}", city.name, city.lat, city.lon, city.country);
            }
        }
    }

    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("biblio_client={},biblio={}", config.level, config.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_books(client: &LibraryClient, command: BooksCommand) -> anyhow::Result<()> {
    let books = &client.services.books;

    match command {
        BooksCommand::List { cached } => {
            let response = books.get_all_books(cached).await?;
            for book in &response.books {
                print_book(book);
            }
            println!("{} book(s)", response.total);
        }
        BooksCommand::Get { id } => {
            let response = books.get_book_by_id(id, true).await?;
            print_book(&response.book);
        }
        BooksCommand::Create { title, author, year, isbn, editorial, genre, language, pages } => {
            let response = books
                .create_book(&CreateBook {
                    title,
                    author,
                    published_year: year,
                    isbn,
                    editorial,
                    genre,
                    language,
                    pages,
                })
                .await?;
            println!("{}", response.message);
            print_book(&response.book);
        }
        BooksCommand::Update { id, title, author, year, isbn, editorial, genre, language, pages } => {
            let response = books
                .update_book(
                    id,
                    &UpdateBook {
                        title,
                        author,
                        published_year: year,
                        isbn,
                        editorial,
                        genre,
                        language,
                        pages,
                    },
                )
                .await?;
            println!("{}", response.message);
            print_book(&response.book);
        }
        BooksCommand::Delete { id } => {
            let response = books.delete_book(id).await?;
            println!("{}", response.message);
        }
    }

    Ok(())
}

fn print_book(book: &Book) {
    println!(
        "#{:<4} {} - {} ({}) ISBN {}",
        book.id,
        book.title,
        book.author,
        book.published_year.map_or_else(|| "N/A".to_string(), |y| y.to_string()),
        book.isbn.as_deref().unwrap_or("N/A"),
    );
}

fn resolve_location(location: &Location) -> anyhow::Result<WeatherQuery> {
    let mut query = match (&location.city, location.lat, location.lon) {
        (Some(name), _, _) => {
            let city = find_city(name).ok_or_else(|| anyhow::anyhow!("Unknown city: {}", name))?;
            WeatherQuery::for_city(city)
        }
        (None, Some(lat), Some(lon)) => WeatherQuery::new(lat, lon),
        _ => WeatherQuery::for_city(&CITIES[0]),
    };
    query.units = location.units;
    query.lang = location.lang.clone();
    Ok(query)
}

async fn run_weather(client: &LibraryClient, command: WeatherCommand) -> anyhow::Result<()> {
    let weather = &client.services.weather;

    match command {
        WeatherCommand::Current(location) => {
            let response = weather.get_current_weather(&resolve_location(&location)?).await?;
            for current in &response.data {
                println!(
                    "{} ({}): {:.1}° feels like {:.1}°, {}",
                    current.city_name,
                    current.country_code,
                    current.temp,
                    current.app_temp,
                    current.weather.description
                );
            }
        }
        WeatherCommand::Hourly(location) => {
            let response = weather.get_forecast_3hourly(&resolve_location(&location)?).await?;
            println!("{} ({})", response.city_name, response.country_code);
            for slot in &response.data {
                println!("{}  {:>5.1}°  {}", slot.timestamp_local, slot.temp, slot.weather.description);
            }
        }
        WeatherCommand::Daily { location, days } => {
            let mut query = resolve_location(&location)?;
            query.days = days;
            let response = weather.get_forecast_daily(&query).await?;
            println!("{} ({})", response.city_name, response.country_code);
            for day in &response.data {
                println!(
                    "{}  {:>5.1}° / {:>5.1}°  {}",
                    day.valid_date, day.min_temp, day.max_temp, day.weather.description
                );
            }
        }
    }

    Ok(())
}

async fn run_token(client: &LibraryClient, command: TokenCommand) -> anyhow::Result<()> {
    if !client.services.auth.is_authenticated() {
        anyhow::bail!("Not logged in; pass --login and --password");
    }

    match command {
        TokenCommand::Show => match client.services.auth.token_info() {
            Some(info) => {
                if let Some(user) = client.services.auth.current_user() {
                    println!("User:       {}", user.username);
                }
                match info.expires_at {
                    Some(at) => println!("Expires at: {}", at.to_rfc3339()),
                    None => println!("Expires at: N/A"),
                }
                println!("Remaining:  {}", info.time_remaining);
            }
            None => println!("Token could not be decoded"),
        },
        TokenCommand::Watch => {
            let watch = TokenWatch::spawn(client.session().clone(), Duration::from_secs(1), |info| {
                match info {
                    Some(info) => println!("Remaining: {}", info.time_remaining),
                    None => println!("Token could not be decoded"),
                }
            })?;
            tokio::signal::ctrl_c().await?;
            watch.cancel();
        }
    }

    Ok(())
}
