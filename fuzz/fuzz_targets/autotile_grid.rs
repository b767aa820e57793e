#![no_main]

use autotile::{Autotiler, Rule, RuleSet, TerrainType, TileRef};
use libfuzzer_sys::fuzz_target;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let width = usize::from(data[0] % 48);
    let height = usize::from(data[1] % 48);
    let text = String::from_utf8_lossy(&data[2..]);

    let Ok(rules) = RuleSet::new().with_terrain(
        TerrainType::new('1', "dirt")
            .with_ignores(['2'])
            .with_center(Rule::new([TileRef::new(0, 0)]))
            .with_padded(Rule::new([TileRef::new(1, 0)])),
    ) else {
        return;
    };
    let tiler = Autotiler::new(rules);
    if let Ok(grid) = tiler.generate_with_rng(width, height, &text, &mut SmallRng::seed_from_u64(0)) {
        assert_eq!(grid.cells.len(), width * height);
    }
});
