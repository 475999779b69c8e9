use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::{io, path::PathBuf, time::Duration};
use venue_locator::{
    sdk::config::GeocoderConfig,
    sdk::geocoding::{
        distance::DEFAULT_NEARBY_LIMIT, rank_by_distance, CoordinateCache, Geocoder,
        MemoizedGeocoder, YahooGeocoder,
    },
    sdk::pipeline::{ResolutionPipeline, ResultWriter},
    sdk::records::{read_input_records, read_venues},
    sdk::util::{log::init_logging, pacing::FixedDelay},
};

/// Geocode flu vaccination venues and find the ones closest to an address
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve every venue in a name,zip_code,address file to coordinates
    Resolve {
        /// Input CSV with a header row and name,zip_code,address columns
        #[arg(short, long, default_value = "address.csv")]
        input: PathBuf,

        /// Per-venue results, one row per input row
        #[arg(short, long, default_value = "address_out.csv")]
        output: PathBuf,

        /// Coordinate cache written once the run completes
        #[arg(long, default_value = "address_coordinates.csv")]
        cache: PathBuf,

        /// Seconds to wait between venues
        #[arg(long, default_value_t = 2.0)]
        delay_secs: f64,
    },

    /// List the venues nearest to one or more addresses
    Nearby {
        /// Origin address (repeatable)
        #[arg(short, long, required = true)]
        address: Vec<String>,

        /// Venue list, usually the output of `resolve`
        #[arg(long, default_value = "address_out.csv")]
        venues: PathBuf,

        #[arg(long, default_value = "address_coordinates.csv")]
        cache: PathBuf,

        /// How many venues to list per address
        #[arg(short, long, default_value_t = DEFAULT_NEARBY_LIMIT)]
        limit: usize,
    },

    /// Look up a single address or postal code
    Geocode {
        #[arg(long, conflicts_with = "zip", required_unless_present = "zip")]
        address: Option<String>,

        #[arg(long)]
        zip: Option<String>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();

    // Fail on a missing credential before touching any file or the network
    let config = GeocoderConfig::from_env().context("Invalid geocoder configuration")?;
    let geocoder = YahooGeocoder::new(config).context("Failed to build HTTP client")?;

    match cli.command {
        Command::Resolve {
            input,
            output,
            cache,
            delay_secs,
        } => resolve(geocoder, input, output, cache, delay_secs),
        Command::Nearby {
            address,
            venues,
            cache,
            limit,
        } => nearby(geocoder, &address, venues, cache, limit),
        Command::Geocode { address, zip } => geocode(&geocoder, address, zip),
    }
}

fn resolve(
    geocoder: YahooGeocoder,
    input: PathBuf,
    output: PathBuf,
    cache_path: PathBuf,
    delay_secs: f64,
) -> Result<()> {
    let delay = Duration::try_from_secs_f64(delay_secs)
        .with_context(|| format!("Invalid delay: {}", delay_secs))?;

    let records = read_input_records(&input)
        .with_context(|| format!("Failed to read venues from {}", input.display()))?;
    log::info!("Resolving {} venues from {}", records.len(), input.display());

    let mut sink = ResultWriter::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    let mut pipeline = ResolutionPipeline::new(geocoder, FixedDelay(delay));
    let summary = pipeline.run(&records, &mut sink).with_context(|| {
        format!(
            "Run aborted; rows already written to {} are kept",
            output.display()
        )
    })?;

    log::info!(
        "Done: {} venues ({} by address, {} by zip code, {} failed)",
        summary.total(),
        summary.geocoded,
        summary.by_zip_code,
        summary.failed
    );
    log::info!("Results written to {}", output.display());

    let cache = summary.coordinate_cache();
    cache
        .save(&cache_path)
        .with_context(|| format!("Failed to save {}", cache_path.display()))?;
    log::info!(
        "Coordinate cache with {} addresses saved to {}",
        cache.len(),
        cache_path.display()
    );

    Ok(())
}

fn nearby(
    geocoder: YahooGeocoder,
    addresses: &[String],
    venues_path: PathBuf,
    cache_path: PathBuf,
    limit: usize,
) -> Result<()> {
    let venues = read_venues(&venues_path)
        .with_context(|| format!("Failed to read venues from {}", venues_path.display()))?;
    let cache = CoordinateCache::load(&cache_path)
        .with_context(|| format!("Failed to load {}", cache_path.display()))?;
    log::info!(
        "Loaded {} venues and {} cached coordinates",
        venues.len(),
        cache.len()
    );

    let geocoder = MemoizedGeocoder::new(geocoder);
    let mut wtr = csv::Writer::from_writer(io::stdout());
    wtr.write_record(["origin", "distance_m", "name", "address"])?;

    for address in addresses {
        // A failed origin lookup means "no results", not a crash
        let origin = match geocoder.resolve_by_address(address) {
            Ok(Some(coord)) => coord,
            Ok(None) => {
                log::warn!("No coordinate found for \"{}\"", address);
                continue;
            }
            Err(err) => {
                log::warn!("Lookup for \"{}\" failed: {}", address, err);
                continue;
            }
        };
        log::info!("\"{}\" is at (lon={}, lat={})", address, origin.longitude, origin.latitude);

        for ranked in rank_by_distance(origin, &venues, &cache, limit) {
            wtr.write_record([
                address.as_str(),
                ranked.distance_m.to_string().as_str(),
                ranked.venue.name.as_str(),
                ranked.venue.address.as_str(),
            ])?;
        }
    }
    wtr.flush()?;

    Ok(())
}

fn geocode(geocoder: &YahooGeocoder, address: Option<String>, zip: Option<String>) -> Result<()> {
    let (query, found) = match (address, zip) {
        (Some(address), _) => {
            let found = geocoder.resolve_by_address(&address)?;
            (address, found)
        }
        (None, Some(zip)) => {
            let found = geocoder.resolve_by_zip(&zip)?;
            (zip, found)
        }
        (None, None) => bail!("Either --address or --zip is required"),
    };

    match found {
        Some(coord) => {
            println!("{}", coord);
            Ok(())
        }
        None => bail!("No coordinate found for \"{}\"", query),
    }
}
