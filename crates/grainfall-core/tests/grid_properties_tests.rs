//! Whole-grid properties of the tick update
//!
//! Each test drives a `Grid` through its public API only.

use std::sync::Arc;

use grainfall_core::simulation::{
    Cell, MaterialDef, MaterialId, MaterialTable, MaterialType, Materials,
};
use grainfall_core::world::{Grid, SimConfig, TickStats};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// Default materials without any reaction rules
fn inert_materials() -> Arc<Materials> {
    let table = MaterialTable {
        materials: Materials::new().to_table().materials,
        reactions: Vec::new(),
    };
    Arc::new(Materials::from_table(table).unwrap())
}

fn grid_with(width: usize, height: usize, materials: Arc<Materials>, config: SimConfig) -> Grid {
    Grid::with_config(width, height, materials, config).unwrap()
}

/// Scatter non-expiring materials over the grid
fn scatter(grid: &mut Grid, seed: u64) {
    let palette = [
        MaterialId::SAND,
        MaterialId::WATER,
        MaterialId::LAVA,
        MaterialId::STONE,
        MaterialId::MUD,
        MaterialId::WALL,
    ];
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    for _ in 0..(grid.width() * grid.height() / 8) {
        let x = rng.gen_range(0..grid.width() as i32);
        let y = rng.gen_range(0..grid.height() as i32);
        let material = palette[rng.gen_range(0..palette.len())];
        grid.paint(x, y, material, rng.gen_range(0..3)).unwrap();
    }
}

// ============================================================================
// Conservation and bounds
// ============================================================================

#[test]
fn test_inert_materials_are_conserved() {
    for parallel in [false, true] {
        let config = SimConfig::seeded(11).with_parallel(parallel);
        let mut grid = grid_with(48, 32, inert_materials(), config);
        scatter(&mut grid, 3);
        let before = grid.histogram();

        for _ in 0..100 {
            grid.tick();
            assert_eq!(grid.histogram(), before, "parallel = {parallel}");
        }
        assert_eq!(grid.cells().len(), 48 * 32);
    }
}

#[test]
fn test_non_reacting_defaults_are_conserved() {
    // Sand, stone, mud and wall have no rules with each other
    let mut grid = grid_with(20, 20, Arc::new(Materials::new()), SimConfig::seeded(8));
    grid.paint(5, 3, MaterialId::SAND, 3).unwrap();
    grid.paint(14, 4, MaterialId::MUD, 3).unwrap();
    grid.paint(10, 10, MaterialId::STONE, 2).unwrap();
    grid.fill_rect(glam::IVec2::new(0, 17), glam::IVec2::new(8, 17), MaterialId::WALL)
        .unwrap();
    let before = grid.histogram();

    for _ in 0..80 {
        grid.tick();
    }

    assert_eq!(grid.histogram(), before);
}

// ============================================================================
// Empty grid
// ============================================================================

#[test]
fn test_all_air_grid_is_idempotent() {
    for parallel in [false, true] {
        let mut grid = grid_with(
            20,
            20,
            Arc::new(Materials::new()),
            SimConfig::seeded(1).with_parallel(parallel),
        );

        for _ in 0..10 {
            assert_eq!(grid.tick(), TickStats::default());
        }
        assert_eq!(grid.count(MaterialId::AIR), 400);
        assert_eq!(grid.tick_count(), 10);
    }
}

// ============================================================================
// Density ordering
// ============================================================================

#[test]
fn test_denser_fluid_sinks_in_a_column() {
    for parallel in [false, true] {
        let mut grid = grid_with(
            1,
            8,
            Arc::new(Materials::new()),
            SimConfig::seeded(21).with_parallel(parallel),
        );
        grid.fill_rect(glam::IVec2::new(0, 0), glam::IVec2::new(0, 3), MaterialId::LAVA)
            .unwrap();
        grid.fill_rect(glam::IVec2::new(0, 4), glam::IVec2::new(0, 7), MaterialId::MUD)
            .unwrap();

        for _ in 0..64 {
            grid.tick();
        }

        for y in 0..4 {
            assert_eq!(grid.material_at(0, y), Some(MaterialId::MUD), "row {y}");
        }
        for y in 4..8 {
            assert_eq!(grid.material_at(0, y), Some(MaterialId::LAVA), "row {y}");
        }
    }
}

#[test]
fn test_water_levels_out_on_the_floor() {
    let mut grid = grid_with(9, 6, Arc::new(Materials::new()), SimConfig::seeded(4));
    grid.fill_rect(glam::IVec2::new(4, 2), glam::IVec2::new(4, 5), MaterialId::WATER)
        .unwrap();

    for _ in 0..300 {
        grid.tick();
    }

    let floor = (0..9)
        .filter(|&x| grid.material_at(x, 5) == Some(MaterialId::WATER))
        .count();
    assert_eq!(floor, 4);
    assert_eq!(grid.count(MaterialId::WATER), 4);
}

#[test]
fn test_steam_rises() {
    let mut grid = grid_with(5, 10, Arc::new(Materials::new()), SimConfig::seeded(2));
    grid.paint(2, 9, MaterialId::STEAM, 0).unwrap();

    for _ in 0..3 {
        grid.tick();
    }

    let rows: Vec<i32> = grid
        .cells()
        .iter()
        .filter(|(_, cell)| cell.material_id == MaterialId::STEAM)
        .map(|(pos, _)| pos.y)
        .collect();
    // One or two rows per tick through air, never into the ceiling yet
    assert_eq!(rows.len(), 1);
    assert!((3..=6).contains(&rows[0]), "steam at row {}", rows[0]);
}

// ============================================================================
// Reactions and lifecycle
// ============================================================================

#[test]
fn test_water_over_lava_reacts_on_the_next_tick() {
    // Lava on the floor and lava hanging in the air
    for height in [7, 12] {
        for seed in 0..200 {
            let mut grid = grid_with(11, height, Arc::new(Materials::new()), SimConfig::seeded(seed));
            grid.paint(5, 5, MaterialId::WATER, 0).unwrap();
            grid.paint(5, 6, MaterialId::LAVA, 0).unwrap();

            let stats = grid.tick();

            let pair = [grid.material_at(5, 5), grid.material_at(5, 6)];
            let context = format!("height {height}, seed {seed}: {pair:?}");
            assert!(pair.contains(&Some(MaterialId::STONE)), "{context}");
            assert!(pair.contains(&Some(MaterialId::STEAM)), "{context}");
            assert_eq!(grid.non_air_count(), 2, "{context}");
            assert_eq!(stats.reactions, 1, "{context}");
        }
    }
}

#[test]
fn test_water_poured_on_a_lava_pool_quenches_it() {
    let mut grid = grid_with(11, 7, Arc::new(Materials::new()), SimConfig::seeded(5));
    grid.fill_rect(glam::IVec2::new(4, 6), glam::IVec2::new(6, 6), MaterialId::LAVA)
        .unwrap();
    grid.paint(5, 5, MaterialId::WATER, 0).unwrap();

    let stats = grid.tick();

    assert_eq!(grid.count(MaterialId::WATER), 0);
    assert_eq!(grid.count(MaterialId::STONE), 1);
    assert_eq!(grid.count(MaterialId::STEAM), 1);
    assert_eq!(grid.count(MaterialId::LAVA), 2);
    assert_eq!(stats.reactions, 1);
}

#[test]
fn test_steam_is_gone_after_61_ticks() {
    // Wall ceiling so the steam cannot reach the grid edge and decay early
    let mut grid = grid_with(3, 3, Arc::new(Materials::new()), SimConfig::seeded(9));
    grid.fill_rect(glam::IVec2::new(0, 0), glam::IVec2::new(2, 0), MaterialId::WALL)
        .unwrap();
    grid.paint(1, 1, MaterialId::STEAM, 0).unwrap();

    for tick in 1..=60 {
        grid.tick();
        assert_eq!(grid.count(MaterialId::STEAM), 1, "tick {tick}");
    }
    assert_eq!(grid.cell(1, 1), Some(Cell::with_age(MaterialId::STEAM, 60)));

    let stats = grid.tick();
    assert_eq!(grid.count(MaterialId::STEAM), 0);
    assert_eq!(stats.expirations, 1);
}

#[test]
fn test_sand_touching_water_makes_mud() {
    let mut grid = grid_with(1, 4, Arc::new(Materials::new()), SimConfig::seeded(6));
    grid.paint(0, 2, MaterialId::SAND, 0).unwrap();
    grid.paint(0, 3, MaterialId::WATER, 0).unwrap();

    // The water is scanned first and soaks into the sand above it
    grid.tick();
    assert_eq!(grid.material_at(0, 2), Some(MaterialId::MUD));
    assert_eq!(grid.material_at(0, 3), Some(MaterialId::AIR));
    assert_eq!(grid.non_air_count(), 1);

    grid.tick();
    assert_eq!(grid.material_at(0, 3), Some(MaterialId::MUD));
}

/// Default materials plus a light powder that water cannot sink into
fn ash_materials() -> Arc<Materials> {
    let mut table = Materials::new().to_table();
    table.materials.push(MaterialDef {
        id: 8,
        name: "ash".to_string(),
        material_type: MaterialType::Powder,
        density: 0.5,
        ..Default::default()
    });
    for material in &mut table.materials {
        if material.id == MaterialId::WATER {
            material.viscosity = 0.0;
        }
    }
    Arc::new(Materials::from_table(table).unwrap())
}

#[test]
fn test_blocked_water_spreads_across_a_light_floor() {
    for seed in 0..100 {
        let mut grid = grid_with(11, 2, ash_materials(), SimConfig::seeded(seed));
        grid.fill_rect(glam::IVec2::new(1, 1), glam::IVec2::new(9, 1), 8).unwrap();
        grid.paint(5, 0, MaterialId::WATER, 0).unwrap();

        // Lighter than the water below it, but a powder, so every fall is blocked
        grid.tick();

        assert_ne!(grid.material_at(5, 0), Some(MaterialId::WATER), "seed {seed}");
        assert_eq!(grid.count(MaterialId::WATER), 1, "seed {seed}");
        assert_eq!(grid.count(8), 9, "seed {seed}");
    }
}

// ============================================================================
// Scheduling
// ============================================================================

#[test]
fn test_parallel_ticks_never_double_write() {
    let config = SimConfig::seeded(77).with_parallel(true).with_audit(true);
    let mut grid = grid_with(96, 64, inert_materials(), config);
    scatter(&mut grid, 19);
    let before = grid.histogram();

    let mut total = TickStats::default();
    for _ in 0..50 {
        let stats = grid.tick();
        assert!(stats.max_writers <= 1, "max writers {}", stats.max_writers);
        total.merge(&stats);
    }

    assert_eq!(grid.histogram(), before);
    assert!(total.moves > 0);
    assert_eq!(total.max_writers, 1);
}

#[test]
fn test_sequential_runs_are_reproducible() {
    let run = || {
        let mut grid = grid_with(32, 24, Arc::new(Materials::new()), SimConfig::seeded(1234));
        scatter(&mut grid, 5);
        grid.paint(16, 20, MaterialId::STEAM, 2).unwrap();
        for _ in 0..40 {
            grid.tick();
        }
        grid.cells().clone()
    };

    assert_eq!(run(), run());
}
