use sc2k_reader::sc2k::codec::rle;
use sc2k_reader::sc2k::format::fields::misc_offsets;
use sc2k_reader::sc2k::render::projector;
use sc2k_reader::sc2k::{FormatError, ImportError};
use sc2k_reader::{
    CityReader, RotationDirection, Rotation, Sc2kError, Slope, TileTable, ViewConfig, Viewer,
    WaterLevel, CELL_COUNT, GRID_SIZE,
};

/// Assembles a save file from `(tag, decoded payload)` pairs.
fn container(segments: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (tag, payload) in segments {
        let stored = if *tag == b"ALTM" || *tag == b"CNAM" {
            payload.clone()
        } else {
            rle::compress(payload)
        };
        body.extend_from_slice(*tag);
        body.extend_from_slice(&(stored.len() as u32).to_be_bytes());
        body.extend_from_slice(&stored);
    }

    let mut file = Vec::new();
    file.extend_from_slice(b"FORM");
    file.extend_from_slice(&((body.len() + 4) as u32).to_be_bytes());
    file.extend_from_slice(b"SCDH");
    file.extend_from_slice(&body);
    file
}

fn misc(rotation: u32, water_level: u32) -> Vec<u8> {
    let mut misc = vec![0u8; misc_offsets::FULL_LEN];
    let mut put = |offset: usize, value: u32| {
        misc[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    };
    put(misc_offsets::ROTATION, rotation);
    put(misc_offsets::WATER_LEVEL, water_level);
    put(misc_offsets::YEAR_FOUNDED, 1900);
    put(misc_offsets::POPULATION, 12_345);
    misc
}

fn cell_index(x: usize, y: usize) -> usize {
    x * GRID_SIZE + y
}

fn flat_city() -> Vec<u8> {
    container(&[
        (b"XTER", vec![0u8; CELL_COUNT]),
        (b"MISC", misc(0, 4)),
    ])
}

#[test]
fn minimal_save_decodes_to_flat_grass() {
    let city = CityReader::from_bytes(&flat_city()).unwrap();

    assert_eq!(city.cells().len(), CELL_COUNT);
    for cell in city.cells() {
        assert_eq!(cell.slope, Slope::Flat);
        assert_eq!(cell.water_level, WaterLevel::Dry);
        assert_eq!(cell.terrain_tile_id, 256);
        assert_eq!(cell.z, 0);
        assert!(cell.building_tile_id.is_none());
        assert!(cell.zone_tile_id.is_none());
        assert!(cell.network_tile_id.is_none());
    }
    assert_eq!(city.metadata.rotation, Some(Rotation::new(0)));
    assert_eq!(city.metadata.water_level, 4);
    assert_eq!(city.metadata.year_founded, 1900);
    assert_eq!(city.metadata.population, 12_345);
    assert_eq!(city.report.segment_count, 2);
    assert!(city.report.range_errors.is_empty());
}

#[test]
fn misc_ending_after_water_level_is_accepted() {
    let mut short = misc(2, 4);
    short.truncate(misc_offsets::WATER_LEVEL + 4);
    assert_eq!(short.len(), 0x0E44);
    let bytes = container(&[(b"XTER", vec![0u8; CELL_COUNT]), (b"MISC", short)]);

    let city = CityReader::from_bytes(&bytes).unwrap();
    assert_eq!(city.metadata.rotation, Some(Rotation::new(2)));
    assert_eq!(city.metadata.water_level, 4);
    assert_eq!(city.metadata.zoom, 0);
}

#[test]
fn cells_are_laid_out_x_major() {
    let mut terrain = vec![0u8; CELL_COUNT];
    terrain[cell_index(3, 7)] = 0x3E;
    let city = CityReader::from_bytes(&container(&[(b"XTER", terrain)])).unwrap();

    let cell = city.cell(3, 7).unwrap();
    assert_eq!((cell.x, cell.y), (3, 7));
    assert_eq!(cell.water_level, WaterLevel::Waterfall);
    assert_eq!(city.cell(7, 3).unwrap().water_level, WaterLevel::Dry);
}

#[test]
fn bad_magic_is_rejected() {
    let mut bytes = flat_city();
    bytes[8..12].copy_from_slice(b"XXXX");

    let err = CityReader::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, Sc2kError::Format(FormatError::InvalidHeader)));
}

#[test]
fn missing_terrain_is_an_import_error() {
    let bytes = container(&[(b"MISC", misc(0, 4))]);

    let err = CityReader::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, Sc2kError::Import(ImportError::MissingRequiredSegment("XTER"))));
}

#[test]
fn truncated_segment_reports_tag() {
    let mut bytes = flat_city();
    bytes.truncate(bytes.len() - 10);

    match CityReader::from_bytes(&bytes).unwrap_err() {
        Sc2kError::Format(FormatError::TruncatedSegment { tag, declared, remaining }) => {
            assert_eq!(tag, "MISC");
            assert_eq!(declared, remaining + 10);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_segments_are_skipped() {
    let bytes = container(&[
        (b"XTER", vec![0u8; CELL_COUNT]),
        (b"XTRF", vec![1u8; 64]),
    ]);
    let city = CityReader::from_bytes(&bytes).unwrap();

    assert_eq!(city.report.unknown_tags, vec!["XTRF".to_string()]);
    assert!(city.metadata.rotation.is_none());
    assert!(!city.rotation_known());
}

#[test]
fn city_name_is_read_uncompressed() {
    let mut cnam = vec![0x09u8];
    cnam.extend_from_slice(b"Riverside\0\0\0");
    let bytes = container(&[(b"XTER", vec![0u8; CELL_COUNT]), (b"CNAM", cnam)]);

    let city = CityReader::from_bytes(&bytes).unwrap();
    assert_eq!(city.metadata.name, "Riverside");
}

#[test]
fn altitude_sets_elevation() {
    let mut altm = vec![0u8; CELL_COUNT * 2];
    let i = cell_index(10, 20) * 2;
    // Little-endian word: elevation 5, water flag set.
    altm[i] = 0x85;
    let bytes = container(&[(b"XTER", vec![0u8; CELL_COUNT]), (b"ALTM", altm)]);

    let city = CityReader::from_bytes(&bytes).unwrap();
    let cell = city.cell(10, 20).unwrap();
    assert_eq!(cell.z, 5);
    assert!(cell.water_flag);
}

#[test]
fn failed_import_keeps_previous_city() {
    let mut viewer = Viewer::new();
    viewer.import(&flat_city()).unwrap();

    let message = viewer.import(b"not a save file").unwrap_err();
    assert!(!message.is_empty());
    let city = viewer.city().expect("previous city kept");
    assert_eq!(city.metadata.water_level, 4);
}

#[test]
fn four_quarter_turns_restore_the_grid() {
    let mut terrain = vec![0u8; CELL_COUNT];
    terrain[cell_index(0, 5)] = 0x01;
    let mut city = CityReader::from_bytes(&container(&[
        (b"XTER", terrain),
        (b"MISC", misc(1, 4)),
    ]))
    .unwrap();
    let original = city.cells().to_vec();
    let catalog = TileTable::new();

    city.rotate(RotationDirection::Left, &catalog);
    assert_eq!(city.map_rotation(), Rotation::new(1));
    // (0, 5) moves to (127 - 5, 0).
    assert_eq!(city.cell(122, 0).unwrap().slope, Slope::from_nibble(1).unwrap());

    for _ in 0..3 {
        city.rotate(RotationDirection::Left, &catalog);
    }
    assert_eq!(city.map_rotation(), Rotation::new(0));
    assert_eq!(city.cells(), &original[..]);
}

#[test]
fn picking_finds_the_projected_cell() {
    let city = CityReader::from_bytes(&flat_city()).unwrap();
    let view = ViewConfig::default();

    let polygon = projector::project(40, 90, 0, &view);
    let picked = projector::pick_cell(&city, &view, polygon.center).unwrap();
    assert_eq!((picked.x, picked.y), (40, 90));
}
