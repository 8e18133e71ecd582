//! Engine source file to asset type mapping.

use std::collections::HashMap;
use std::sync::LazyLock;

/// The asset type a source file describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetTypeInfo {
    pub name: &'static str,
    pub extension: &'static str,
    pub description: &'static str,
    pub base_path: &'static str,
}

const fn info(
    name: &'static str,
    extension: &'static str,
    description: &'static str,
    base_path: &'static str,
) -> AssetTypeInfo {
    AssetTypeInfo {
        name,
        extension,
        description,
        base_path,
    }
}

static SOURCE_FILES: LazyLock<HashMap<&'static str, AssetTypeInfo>> = LazyLock::new(|| {
    let object = info("object", ".object", "Placeable world objects", "/objects/");
    let monster = info("monster", ".monstertype", "Monster type definitions", "/monsters/");
    let projectile = info("projectile", ".projectile", "Projectile definitions", "/projectiles/");
    let npc = info("npc", ".npctype", "NPC type definitions", "/npcs/");
    let item = info("item", ".item", "Generic item definitions", "/items/");
    let tech = info("tech", ".tech", "Tech abilities", "/tech/");
    let biome = info("biome", ".biome", "Biome definitions", "/biomes/");
    let liquid = info("liquid", ".liquid", "Liquid definitions", "/liquids/");
    let material = info("material", ".material", "Tile materials", "/tiles/materials/");
    let quest = info("questtemplate", ".questtemplate", "Quest templates", "/quests/");
    let treasure = info("treasurepool", ".treasurepools", "Treasure pools", "/treasure/");
    let codex = info("codex", ".codex", "Lore codex entries", "/codex/");
    let vehicle = info("vehicle", ".vehicle", "Vehicle definitions", "/vehicles/");
    let species = info("species", ".species", "Playable species", "/species/");
    let particle = info("particle", ".particle", "Particle definitions", "/particles/");
    let stagehand = info("stagehand", ".stagehand", "Stagehand entities", "/stagehands/");
    let effect = info("statuseffect", ".statuseffect", "Status effects", "/stats/effects/");
    let dungeon = info("dungeon", ".dungeon", "Dungeon definitions", "/dungeons/");

    HashMap::from([
        ("StarObjectDatabase.cpp", object),
        ("StarObject.cpp", object),
        ("StarMonsterDatabase.cpp", monster),
        ("StarMonster.cpp", monster),
        ("StarProjectileDatabase.cpp", projectile),
        ("StarProjectile.cpp", projectile),
        ("StarNpcDatabase.cpp", npc),
        ("StarNpc.cpp", npc),
        ("StarItemDatabase.cpp", item),
        ("StarTechDatabase.cpp", tech),
        ("StarBiomeDatabase.cpp", biome),
        ("StarLiquidsDatabase.cpp", liquid),
        ("StarMaterialDatabase.cpp", material),
        ("StarQuestTemplateDatabase.cpp", quest),
        ("StarTreasureDatabase.cpp", treasure),
        ("StarCodexDatabase.cpp", codex),
        ("StarVehicleDatabase.cpp", vehicle),
        ("StarSpeciesDatabase.cpp", species),
        ("StarParticleDatabase.cpp", particle),
        ("StarStagehandDatabase.cpp", stagehand),
        ("StarStatusEffectDatabase.cpp", effect),
        ("StarDungeonGenerator.cpp", dungeon),
    ])
});

/// Look up the asset type of an engine source file by its file name.
pub fn asset_type_for(file_name: &str) -> Option<AssetTypeInfo> {
    SOURCE_FILES.get(file_name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_and_unknown_files() {
        let object = asset_type_for("StarObjectDatabase.cpp").unwrap();
        assert_eq!(object.name, "object");
        assert_eq!(object.extension, ".object");
        assert_eq!(asset_type_for("StarObject.cpp"), Some(object));

        assert!(asset_type_for("StarRoot.cpp").is_none());
    }
}
