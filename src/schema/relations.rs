//! Raw relation schemas for the three Pokédex source tables

use super::types::*;

/// Join key shared by every raw relation
pub const RAW_KEY: &str = "ID";

pub static POKEMON_BASE: RelationSchema = RelationSchema {
    name: "stg_pokemon_base",
    raw_table: "RAW_POKEMON_BASE",
    source_file: "raw_pokemon_base.jsonl",
    columns: &[
        Column::required("ID", ColumnType::Integer),
        Column::required("NAME", ColumnType::Text),
        Column::new("HEIGHT_INCHES", ColumnType::Real),
        Column::new("HEIGHT_METERS", ColumnType::Real),
        Column::new("WEIGHT_POUNDS", ColumnType::Real),
        Column::new("WEIGHT_KILOGRAMS", ColumnType::Real),
        Column::new("CLASSIFICATION", ColumnType::Text),
        Column::new("ALTERNATE_FORM_NAME", ColumnType::Text),
        Column::required("GEN", ColumnType::Integer),
        Column::new("LEGENDARY", ColumnType::Boolean),
        Column::new("MYTHICAL", ColumnType::Boolean),
    ],
};

pub static POKEMON_BATTLE: RelationSchema = RelationSchema {
    name: "stg_pokemon_battle",
    raw_table: "RAW_POKEMON_BATTLE",
    source_file: "raw_pokemon_battle.jsonl",
    columns: &[
        Column::required("ID", ColumnType::Integer),
        Column::required("Type 1", ColumnType::Text),
        Column::new("Type 2", ColumnType::Text),
        Column::new("ABILITIES", ColumnType::Text),
        Column::required("HP", ColumnType::Integer),
        Column::required("ATTACK", ColumnType::Integer),
        Column::required("DEFENSE", ColumnType::Integer),
        Column::required("Sp. Attack", ColumnType::Integer),
        Column::required("Sp. Defense", ColumnType::Integer),
        Column::required("SPEED", ColumnType::Integer),
        Column::new("NORMAL_WEAKNESS", ColumnType::Real),
        Column::new("FIRE_WEAKNESS", ColumnType::Real),
        Column::new("WATER_WEAKNESS", ColumnType::Real),
        Column::new("ELECTRIC_WEAKNESS", ColumnType::Real),
        Column::new("GRASS_WEAKNESS", ColumnType::Real),
        Column::new("ICE_WEAKNESS", ColumnType::Real),
        Column::new("FIGHTING_WEAKNESS", ColumnType::Real),
        Column::new("POISON_WEAKNESS", ColumnType::Real),
        Column::new("GROUND_WEAKNESS", ColumnType::Real),
        Column::new("FLYING_WEAKNESS", ColumnType::Real),
        Column::new("PSYCHIC_WEAKNESS", ColumnType::Real),
        Column::new("BUG_WEAKNESS", ColumnType::Real),
        Column::new("ROCK_WEAKNESS", ColumnType::Real),
        Column::new("GHOST_WEAKNESS", ColumnType::Real),
        Column::new("DRAGON_WEAKNESS", ColumnType::Real),
        Column::new("DARK_WEAKNESS", ColumnType::Real),
        Column::new("STEEL_WEAKNESS", ColumnType::Real),
        Column::new("FAIRY_WEAKNESS", ColumnType::Real),
    ],
};

pub static POKEMON_REPRODUCTION: RelationSchema = RelationSchema {
    name: "stg_pokemon_reproduction",
    raw_table: "RAW_POKEMON_REPRODUCTION",
    source_file: "raw_pokemon_reproduction.jsonl",
    columns: &[
        Column::required("ID", ColumnType::Integer),
        Column::new("CAPTURE_RATE", ColumnType::Integer),
        // null for genderless species
        Column::new("PERCENT_MALE", ColumnType::Real),
        Column::required("EGG_STEPS", ColumnType::Integer),
        Column::new("EGG_CYCLES", ColumnType::Integer),
    ],
};

/// All raw relations in load order
pub static RAW_RELATIONS: &[&RelationSchema] =
    &[&POKEMON_BASE, &POKEMON_BATTLE, &POKEMON_REPRODUCTION];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_relation_carries_the_key() {
        for schema in RAW_RELATIONS {
            let key = schema.column(RAW_KEY).expect("key column");
            assert!(!key.nullable, "{} key must be required", schema.name);
            assert_eq!(key.col_type, ColumnType::Integer);
        }
    }

    #[test]
    fn test_battle_has_eighteen_weaknesses() {
        let count = POKEMON_BATTLE
            .columns
            .iter()
            .filter(|c| c.name.ends_with("_WEAKNESS"))
            .count();
        assert_eq!(count, 18);
    }
}
