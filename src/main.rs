use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use sc2k_reader::{CityReader, RotationDirection, TileTable, ViewConfig, WaterLevel, GRID_SIZE};
use sc2k_reader::sc2k::render::projector;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Save file to read
    input: PathBuf,
    /// Rotate the map after loading (repeatable: left or right)
    #[arg(long = "rotate")]
    rotate: Vec<RotationDirection>,
    /// Tile catalog JSON (needed for flip-aware rotation)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// View config JSON (tile size, layer offset, origin)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print every cell of one grid row
    #[arg(long)]
    dump_row: Option<usize>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("\nERROR: Failed to read save file");
        eprintln!("  {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> sc2k_reader::Result<()> {
    let catalog = match &cli.catalog {
        Some(path) => TileTable::load(path)?,
        None => TileTable::new(),
    };
    let view = match &cli.config {
        Some(path) => ViewConfig::load(path)?,
        None => ViewConfig::default(),
    };

    println!("Reading save file: {}", cli.input.display());
    println!("{}", "=".repeat(60));

    let mut city = CityReader::open(&cli.input)?;
    for direction in &cli.rotate {
        city.rotate(*direction, &catalog);
    }

    let meta = &city.metadata;
    println!("\nCity Information:");
    println!("  Name: {}", meta.name);
    println!("  Founded: {}", meta.year_founded);
    println!("  Days elapsed: {}", meta.days_elapsed);
    println!("  Treasury: {}", meta.treasury);
    println!("  Population: {}", meta.population);
    match meta.rotation {
        Some(rotation) => println!("  Saved rotation: {}", rotation),
        None => println!("  Saved rotation: unknown"),
    }
    println!("  Map rotation: {}", city.map_rotation());
    println!("  Water level: {}", meta.water_level);

    let cells = city.cells();
    let wet = cells.iter().filter(|c| c.water_level.is_wet()).count();
    let waterfalls = cells.iter().filter(|c| c.water_level == WaterLevel::Waterfall).count();
    let buildings = cells.iter().filter(|c| c.building_tile_id.is_some()).count();
    let networks = cells.iter().filter(|c| c.network_tile_id.is_some()).count();
    let max_z = cells.iter().map(|c| c.z).max().unwrap_or(0);
    let mut zones: BTreeMap<String, usize> = BTreeMap::new();
    for cell in cells.iter().filter(|c| c.zone_tile_id.is_some()) {
        *zones.entry(format!("{:?}", cell.zone)).or_default() += 1;
    }

    println!("\nStatistics:");
    println!("  Cells: {} ({}x{})", cells.len(), GRID_SIZE, GRID_SIZE);
    println!("  Water cells: {} ({} waterfalls)", wet, waterfalls);
    println!("  Highest elevation: {}", max_z);
    println!("  Building cells: {}", buildings);
    println!("  Network cells: {}", networks);
    for (zone, count) in &zones {
        println!("  {}: {}", zone, count);
    }
    println!("  Labels: {}", city.labels.len());
    println!("  Segments read: {}", city.report.segment_count);
    if !city.report.unknown_tags.is_empty() {
        println!("  Ignored segments: {}", city.report.unknown_tags.join(", "));
    }
    if !city.report.range_errors.is_empty() {
        println!("  Out-of-range values replaced: {}", city.report.range_errors.len());
    }

    if let Some(x) = cli.dump_row {
        println!("\nRow x={}:", x);
        for y in 0..GRID_SIZE {
            let Some(cell) = city.cell(x, y) else { break };
            let poly = projector::project_cell(cell, &view);
            println!(
                "  ({:3},{:3}) z={:2} terrain={} zone={:?} network={:?} building={:?} corners={} screen=({:.0},{:.0})",
                cell.x,
                cell.y,
                cell.z,
                cell.terrain_tile_id,
                cell.zone_tile_id,
                cell.network_tile_id,
                cell.building_tile_id,
                cell.building_corners.as_bit_string(),
                poly.top.x,
                poly.top.y,
            );
        }
    }

    Ok(())
}
