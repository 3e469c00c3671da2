use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use restaurant_client::application::errors::ClientError;
use restaurant_client::application::images::ImageContext;
use restaurant_client::application::ClientContext;
use restaurant_client::domain::entities::{
    ImageUpload, PageQuery, RegisterRequest, Restaurant, RestaurantFilters, Review, ReviewDraft,
};
use restaurant_client::infrastructure::config::Config;

#[derive(Parser)]
#[command(name = "restaurant-client")]
#[command(about = "Command-line client for the restaurant review service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// API base URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the credential
    Login { username: String, password: String },
    /// Drop the stored credential
    Logout,
    /// Create an account
    Register {
        username: String,
        password: String,
        email: String,
    },
    /// Show the logged-in user
    Whoami,
    /// List restaurants
    Restaurants {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long)]
        size: Option<u32>,
        #[arg(short, long)]
        keyword: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_rating: Option<f64>,
        #[arg(long)]
        sort: Option<String>,
    },
    /// Most popular restaurants
    Popular,
    /// Newest restaurants
    Latest,
    /// Restaurant detail with its first page of reviews
    Show { id: i64 },
    /// Reviews of a restaurant
    Reviews {
        id: i64,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Toggle a restaurant favorite
    Favorite { id: i64 },
    /// Toggle a like on a review of a restaurant
    Like { restaurant: i64, review: i64 },
    /// Post a review
    Review {
        restaurant: i64,
        #[arg(short, long)]
        rating: u8,
        content: String,
        /// Image to attach
        #[arg(short, long)]
        image: Option<String>,
    },
    /// List favorites
    Favorites,
    /// Generate default config
    InitConfig,
    /// Show version
    Version,
}

fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli.config, cli.api_url.clone());

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .init();

    match cli.command {
        Commands::Version => {
            println!("restaurant-client v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
        command => {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("Failed to start runtime: {}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = rt.block_on(run(config, command)) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn load_config(path: &str, api_url: Option<String>) -> Config {
    let mut config = if std::path::Path::new(path).exists() {
        Config::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {}, using defaults", e);
            Config::default()
        })
    } else {
        Config::default()
    };
    config.apply_env();
    if let Some(url) = api_url {
        config.api.base_url = url;
    }
    config
}

async fn run(config: Config, command: Commands) -> Result<(), ClientError> {
    config.validate()?;
    let ctx = ClientContext::connect(config).await?;
    ctx.session.initialize().await;

    let result = execute(&ctx, command).await;
    print_notices(&ctx);
    result
}

async fn execute(ctx: &ClientContext, command: Commands) -> Result<(), ClientError> {
    match command {
        Commands::Login { username, password } => {
            let identity = ctx.users.login(&username, &password).await?;
            println!("Logged in as {} ({})", identity.username, identity.role);
        }
        Commands::Logout => {
            ctx.users.logout().await;
        }
        Commands::Register {
            username,
            password,
            email,
        } => {
            ctx.users
                .register(RegisterRequest {
                    username,
                    password,
                    email,
                })
                .await?;
        }
        Commands::Whoami => match ctx.session.identity() {
            Some(identity) => {
                let profile = ctx.users.current_user().await?;
                println!("{} (#{}) {}", profile.username, identity.id, identity.role);
                if let Some(email) = profile.email {
                    println!("  email: {}", email);
                }
            }
            None => println!("Not logged in"),
        },
        Commands::Restaurants {
            page,
            size,
            keyword,
            category,
            min_rating,
            sort,
        } => {
            let size = size.unwrap_or(ctx.config.stores.page_size);
            ctx.restaurants.set_filters(RestaurantFilters {
                keyword,
                category,
                min_rating,
                sort,
            });
            let listing = ctx.restaurants.update_pagination(page, size).await?;
            for restaurant in &listing.content {
                print_restaurant(ctx, restaurant);
            }
            let pagination = ctx.restaurants.snapshot().pagination;
            println!(
                "-- page {} ({} per page, {} total)",
                pagination.current_page, pagination.page_size, pagination.total
            );
        }
        Commands::Popular => {
            for restaurant in ctx.restaurants.fetch_popular().await? {
                print_restaurant(ctx, &restaurant);
            }
        }
        Commands::Latest => {
            for restaurant in ctx.restaurants.fetch_latest().await? {
                print_restaurant(ctx, &restaurant);
            }
        }
        Commands::Show { id } => {
            let restaurant = ctx.restaurants.fetch_restaurant(id).await?;
            if ctx.restaurants.check_favorite(id).await {
                println!("* favorite");
            }
            print_restaurant(ctx, &restaurant);
            for field in [&restaurant.address, &restaurant.phone, &restaurant.description]
                .into_iter()
                .flatten()
            {
                println!("  {}", field);
            }
            for review in ctx.restaurants.snapshot().current_reviews {
                print_review(ctx, &review);
            }
        }
        Commands::Reviews { id, page } => {
            let reviews = ctx
                .reviews
                .fetch_reviews(id, PageQuery::new(page, ctx.config.stores.page_size))
                .await?;
            for review in &reviews.content {
                print_review(ctx, review);
            }
            println!(
                "-- page {} ({} total)",
                reviews.external_page(),
                reviews.total_elements
            );
        }
        Commands::Favorite { id } => {
            // The toggle works off the cached detail
            ctx.restaurants.fetch_restaurant(id).await?;
            ctx.restaurants.check_favorite(id).await;
            let now = ctx.restaurants.toggle_favorite(id).await?;
            println!("{} {}", if now { "Favorited" } else { "Unfavorited" }, id);
        }
        Commands::Like { restaurant, review } => {
            ctx.reviews
                .fetch_reviews(restaurant, PageQuery::default())
                .await?;
            let review = ctx.reviews.toggle_like(review).await?;
            println!(
                "Review {} {} ({} likes)",
                review.id,
                if review.is_liked { "liked" } else { "unliked" },
                review.like_count
            );
        }
        Commands::Review {
            restaurant,
            rating,
            content,
            image,
        } => {
            let mut draft = ReviewDraft::new(content, rating);
            if let Some(path) = image {
                draft = draft.with_image(ImageUpload::from_path(&path).await?);
            }
            let review = ctx.reviews.create_review(restaurant, draft).await?;
            println!("Posted review {}", review.id);
        }
        Commands::Favorites => {
            let favorites = ctx.users.fetch_favorites().await?;
            if favorites.is_empty() {
                println!("No favorites yet");
            }
            for favorite in favorites {
                println!(
                    "#{} {}",
                    favorite.id,
                    favorite.name.as_deref().unwrap_or("(unnamed)")
                );
            }
        }
        Commands::Version | Commands::InitConfig => {}
    }
    Ok(())
}

fn print_restaurant(ctx: &ClientContext, restaurant: &Restaurant) {
    println!(
        "#{} {} [{:.1}, {} reviews]{}",
        restaurant.id,
        restaurant.name,
        restaurant.average_rating,
        restaurant.review_count,
        if restaurant.is_favorite { " *" } else { "" }
    );
    println!(
        "  image: {}",
        ctx.images
            .resolve(restaurant.image_url.as_deref(), ImageContext::Restaurant)
    );
}

fn print_review(ctx: &ClientContext, review: &Review) {
    println!(
        "  [{}] {}/5 by {}: {} ({} likes{})",
        review.id,
        review.rating,
        review.username.as_deref().unwrap_or("anonymous"),
        review.content,
        review.like_count,
        if review.is_liked { ", liked" } else { "" }
    );
    if review.image_url.is_some() {
        println!(
            "    image: {}",
            ctx.images
                .resolve(review.image_url.as_deref(), ImageContext::Review)
        );
    }
}

fn print_notices(ctx: &ClientContext) {
    for notice in ctx.notices.drain() {
        println!("[{}] {}", notice.level, notice.message);
    }
}

fn init_config() {
    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => eprintln!("Failed to render config: {}", e),
    }
}
