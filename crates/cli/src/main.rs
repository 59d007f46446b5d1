use anyhow::{bail, Context, Result};
use catalog::{Catalog, EntityCache, MetadataProvider, MovieId, DEFAULT_CACHE_CAPACITY};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use search::{SearchConfig, Strategy, DEFAULT_MOVIE_LIMIT, DEFAULT_PEOPLE_LIMIT};
use server::{
    ExploredRequest, PathRequest, PathResponse, PathfinderService, ResultStore, SearchId,
    ServiceError, DEFAULT_RESULT_CAPACITY,
};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tmdb_client::{TmdbClient, DEFAULT_BASE_URL};
use tokio::sync::Semaphore;
use tracing::info;

/// ReelLink - degrees of separation between movies
#[derive(Parser)]
#[command(name = "reel-link")]
#[command(about = "Find the chain of shared cast and crew linking two movies", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    search: SearchArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Where movie and credit data comes from
#[derive(Args)]
struct SourceArgs {
    /// Offline catalog fixture (JSON). Used instead of TMDB when given.
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// TMDB v3 API key
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// TMDB API root
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout for TMDB calls, in seconds
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Entries kept per cached entity kind
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,
}

/// Search tuning
#[derive(Args)]
struct SearchArgs {
    /// People kept per movie expansion
    #[arg(long, default_value_t = DEFAULT_PEOPLE_LIMIT)]
    people_limit: usize,

    /// Movies kept per person
    #[arg(long, default_value_t = DEFAULT_MOVIE_LIMIT)]
    movie_limit: usize,

    /// Expand whole cost layers before checking for a meeting (shortest paths, more fetches)
    #[arg(long)]
    layered: bool,

    /// Finished searches kept for explored-set paging
    #[arg(long, default_value_t = DEFAULT_RESULT_CAPACITY)]
    result_capacity: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        #[arg(long, default_value = "5000")]
        port: u16,
    },

    /// Find a path between two movies
    Path {
        /// Source movie ID
        #[arg(long)]
        from: MovieId,

        /// Target movie ID
        #[arg(long)]
        to: MovieId,

        /// Search strategy: bfs or dijkstra
        #[arg(long, default_value = "bfs")]
        algorithm: Strategy,

        /// Also list up to this many explored movies
        #[arg(long, default_value = "0")]
        explored: usize,
    },

    /// Search for movies by title
    Search {
        /// Free-text title query
        #[arg(long)]
        title: String,
    },

    /// Run random path queries against a fixture to measure latency
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Search strategy: bfs or dijkstra
        #[arg(long, default_value = "bfs")]
        algorithm: Strategy,
    },
}

/// Data source chosen from the command line
struct Loaded {
    provider: Arc<dyn MetadataProvider>,
    /// Present when running offline; the benchmark draws ids from it
    catalog: Option<Arc<Catalog>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let loaded = load_provider(&cli.source)?;
    let cache = Arc::new(EntityCache::with_capacity(
        loaded.provider.clone(),
        cli.source.cache_capacity,
    ));
    let config = SearchConfig::default()
        .with_people_limit(cli.search.people_limit)
        .with_movie_limit(cli.search.movie_limit)
        .with_layered(cli.search.layered);
    let results = Arc::new(ResultStore::with_capacity(cli.search.result_capacity));
    let service = PathfinderService::with_results(cache, config, results);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Serve { host, port } => {
            server::serve(service, SocketAddr::new(host, port)).await?
        }
        Commands::Path {
            from,
            to,
            algorithm,
            explored,
        } => handle_path(&service, from, to, algorithm, explored).await?,
        Commands::Search { title } => handle_search(&service, &title).await?,
        Commands::Benchmark {
            requests,
            concurrent,
            algorithm,
        } => handle_benchmark(service, loaded.catalog, requests, concurrent, algorithm).await?,
    }

    Ok(())
}

fn load_provider(args: &SourceArgs) -> Result<Loaded> {
    if let Some(path) = &args.fixture {
        println!("Loading catalog fixture from {}...", path.display());
        let start = Instant::now();
        let catalog = Arc::new(
            Catalog::load_from_file(path).context("Failed to load catalog fixture")?,
        );
        let (movies, with_credits, people) = catalog.counts();
        println!(
            "{} Loaded {} movies ({} with credits, {} people) in {:?}",
            "✓".green(),
            movies,
            with_credits,
            people,
            start.elapsed()
        );
        return Ok(Loaded {
            provider: catalog.clone(),
            catalog: Some(catalog),
        });
    }

    let Some(api_key) = args.api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        bail!("No data source: pass --fixture <json> or set --api-key / TMDB_API_KEY");
    };
    let client = TmdbClient::with_config(
        api_key,
        args.base_url.as_str(),
        Duration::from_secs(args.timeout_secs),
    );
    Ok(Loaded {
        provider: Arc::new(client),
        catalog: None,
    })
}

/// Handle the 'path' command
async fn handle_path(
    service: &PathfinderService,
    from: MovieId,
    to: MovieId,
    strategy: Strategy,
    explored: usize,
) -> Result<()> {
    let request = PathRequest {
        source: from,
        target: to,
        strategy,
    };

    let search_id = match service.find_path(request).await {
        Ok(response) => {
            print_path(&response);
            response.search_id
        }
        Err(ServiceError::NoPathFound {
            search_id,
            explored: explored_count,
        }) => {
            println!(
                "{} No path found between {} and {} ({} movies explored)",
                "✗".red(),
                from,
                to,
                explored_count
            );
            search_id
        }
        Err(e) => return Err(e.into()),
    };

    if explored > 0 {
        print_explored(service, search_id, explored).await?;
    }

    let stats = service.cache_stats();
    info!(
        "Cache: {} hits, {} misses, {} failed lookups",
        stats.hits, stats.misses, stats.failures
    );
    Ok(())
}

/// Handle the 'search' command
async fn handle_search(service: &PathfinderService, title: &str) -> Result<()> {
    let matches = match service.search_titles(title).await {
        Ok(matches) => matches,
        Err(ServiceError::NoResults) => {
            println!("No movies match '{}'", title);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    for hit in matches {
        println!(
            "{}: {} ({}) directed by {}",
            hit.id.to_string().green(),
            hit.title,
            format_year(hit.year),
            hit.director
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: PathfinderService,
    catalog: Option<Arc<Catalog>>,
    requests: usize,
    concurrent: usize,
    strategy: Strategy,
) -> Result<()> {
    let Some(catalog) = catalog else {
        bail!("benchmark needs --fixture so movie ids can be drawn without hitting the API");
    };
    let movie_ids = catalog.movie_ids();
    if movie_ids.is_empty() || requests == 0 {
        bail!("benchmark needs a non-empty fixture and at least one request");
    }

    // Random (source, target) pairs drawn from the fixture
    let pairs: Vec<(MovieId, MovieId)> = (0..requests)
        .map(|_| {
            let source = movie_ids[rand::random_range(0..movie_ids.len())];
            let target = movie_ids[rand::random_range(0..movie_ids.len())];
            (source, target)
        })
        .collect();

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let started = Instant::now();

    // Use tokio::spawn to make concurrent requests
    let mut handles = vec![];
    for (source, target) in pairs {
        let service = service.clone();
        let permits = permits.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            let request = PathRequest {
                source,
                target,
                strategy,
            };
            let found = match service.find_path(request).await {
                Ok(_) => true,
                Err(ServiceError::NoPathFound { .. }) => false,
                Err(e) => return Err(anyhow::Error::from(e)),
            };
            Ok::<_, anyhow::Error>((start.elapsed(), found))
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    let mut found = 0;
    for handle in handles {
        let (elapsed, path_found) = handle.await??;
        timings.push(elapsed);
        if path_found {
            found += 1;
        }
    }
    let wall_time = started.elapsed();

    let total_time: Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = percentile(&timings, 0.50);
    let p95 = percentile(&timings, 0.95);
    let p99 = percentile(&timings, 0.99);
    let throughput = requests as f32 / wall_time.as_secs_f32();
    let stats = service.cache_stats();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Strategy: {}", strategy);
    println!("Paths found: {}/{}", found, requests);
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);
    println!("Cache: {} hits, {} misses", stats.hits, stats.misses);

    Ok(())
}

/// Nearest-rank percentile of sorted timings
fn percentile(sorted: &[Duration], p: f32) -> Duration {
    let index = ((sorted.len() as f32 * p) as usize).min(sorted.len().saturating_sub(1));
    sorted.get(index).copied().unwrap_or_default()
}

/// Helper function to format and print an annotated path
fn print_path(response: &PathResponse) {
    let path = &response.path;
    println!("{}", "Path found:".bold().blue());

    for (step, movie) in path.movies.iter().enumerate() {
        println!(
            "{}. {} ({})",
            (step + 1).to_string().green(),
            movie.title,
            format_year(movie.year)
        );
        if let Some(link) = path.connections.iter().find(|c| c.from == movie.id) {
            println!("   {} {}", "via".dimmed(), link.name.cyan());
        }
    }

    println!(
        "{} movies, {} connections, {} explored in {:.3}s (search {})",
        path.movies.len(),
        path.connections.len(),
        response.total_movies,
        response.execution_time,
        response.search_id
    );
}

async fn print_explored(service: &PathfinderService, search_id: SearchId, limit: usize) -> Result<()> {
    let page = service
        .explored(ExploredRequest {
            search_id: Some(search_id),
            offset: 0,
            limit,
        })
        .await?;

    println!(
        "{}",
        format!("Explored movies ({} of {}):", page.processed_movies.len(), page.total_count)
            .bold()
            .blue()
    );
    for movie in &page.processed_movies {
        println!("  - {} ({})", movie.title, format_year(movie.year));
    }
    Ok(())
}

fn format_year(year: Option<u16>) -> String {
    year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string())
}
