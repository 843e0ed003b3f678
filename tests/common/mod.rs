//! Shared fixtures: a small Pokédex in the raw source shape, writable as JSONL
//! files or as raw tables in a SQLite database.

#![allow(dead_code)]

use rusqlite::{params_from_iter, Connection};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

use pokedex_etl::parser::{parse_record, RawRelationBuilder};
use pokedex_etl::schema::{RelationSchema, POKEMON_BASE, POKEMON_BATTLE, POKEMON_REPRODUCTION};
use pokedex_etl::source::MemorySource;

pub const WEAKNESSES: [&str; 18] = [
    "NORMAL", "FIRE", "WATER", "ELECTRIC", "GRASS", "ICE", "FIGHTING", "POISON", "GROUND",
    "FLYING", "PSYCHIC", "BUG", "ROCK", "GHOST", "DRAGON", "DARK", "STEEL", "FAIRY",
];

/// One species across the three raw tables
#[derive(Debug, Clone)]
pub struct Species {
    pub id: i64,
    pub name: &'static str,
    pub height_m: f64,
    pub weight_kg: f64,
    pub gen: i64,
    pub type_1: &'static str,
    pub type_2: Option<&'static str>,
    pub stats: [i64; 6],
    pub egg_steps: i64,
    pub percent_male: Option<f64>,
}

impl Species {
    pub fn base_record(&self) -> Value {
        json!({
            "ID": self.id,
            "NAME": self.name,
            "HEIGHT_INCHES": (self.height_m * 39.37 * 10.0).round() / 10.0,
            "HEIGHT_METERS": self.height_m,
            "WEIGHT_POUNDS": (self.weight_kg * 2.2046 * 10.0).round() / 10.0,
            "WEIGHT_KILOGRAMS": self.weight_kg,
            "CLASSIFICATION": format!("{} Pokémon", self.name),
            "ALTERNATE_FORM_NAME": null,
            "GEN": self.gen,
            "LEGENDARY": false,
            "MYTHICAL": false,
        })
    }

    pub fn battle_record(&self) -> Value {
        let mut record = Map::new();
        record.insert("ID".into(), json!(self.id));
        record.insert("Type 1".into(), json!(self.type_1));
        record.insert("Type 2".into(), json!(self.type_2));
        record.insert("ABILITIES".into(), json!(["Static"]));
        let names = ["HP", "ATTACK", "DEFENSE", "Sp. Attack", "Sp. Defense", "SPEED"];
        for (name, value) in names.iter().zip(self.stats) {
            record.insert((*name).into(), json!(value));
        }
        for w in WEAKNESSES {
            record.insert(format!("{}_WEAKNESS", w), json!(1.0));
        }
        Value::Object(record)
    }

    pub fn repro_record(&self) -> Value {
        json!({
            "ID": self.id,
            "CAPTURE_RATE": 45,
            "PERCENT_MALE": self.percent_male,
            "EGG_STEPS": self.egg_steps,
            "EGG_CYCLES": self.egg_steps / 256,
        })
    }

    pub fn base_stats(&self) -> i64 {
        self.stats.iter().sum()
    }

    pub fn bmi(&self) -> f64 {
        self.weight_kg / (self.height_m * self.height_m)
    }
}

/// Raw records for the three tables, in source shape
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub base: Vec<Value>,
    pub battle: Vec<Value>,
    pub repro: Vec<Value>,
}

impl Dataset {
    pub fn from_species(species: &[Species]) -> Self {
        Self {
            base: species.iter().map(Species::base_record).collect(),
            battle: species.iter().map(Species::battle_record).collect(),
            repro: species.iter().map(Species::repro_record).collect(),
        }
    }

    fn tables(&self) -> [(&'static RelationSchema, &Vec<Value>); 3] {
        [
            (&POKEMON_BASE, &self.base),
            (&POKEMON_BATTLE, &self.battle),
            (&POKEMON_REPRODUCTION, &self.repro),
        ]
    }

    /// Write raw_pokemon_*.jsonl into `dir`
    pub fn write_jsonl(&self, dir: &Path) {
        for (schema, records) in self.tables() {
            let text: String = records.iter().map(|r| format!("{}\n", r)).collect();
            fs::write(dir.join(schema.source_file), text).unwrap();
        }
    }

    /// Create RAW_POKEMON_* tables in a SQLite database. A table without
    /// records still gets the schema's columns.
    pub fn write_sqlite(&self, path: &Path) {
        let conn = Connection::open(path).unwrap();
        for (schema, records) in self.tables() {
            let names: Vec<String> = match records.first() {
                Some(Value::Object(first)) => first.keys().cloned().collect(),
                _ => schema.columns.iter().map(|c| c.name.to_string()).collect(),
            };
            let columns: Vec<String> = names.iter().map(|k| format!("\"{}\"", k)).collect();
            conn.execute(
                &format!("CREATE TABLE \"{}\" ({})", schema.raw_table, columns.join(", ")),
                [],
            )
            .unwrap();

            let placeholders = vec!["?"; columns.len()].join(", ");
            let sql = format!(
                "INSERT INTO \"{}\" ({}) VALUES ({})",
                schema.raw_table,
                columns.join(", "),
                placeholders
            );
            for record in records {
                let values: Vec<rusqlite::types::Value> = names
                    .iter()
                    .map(|k| to_sql(record.get(k).unwrap_or(&Value::Null)))
                    .collect();
                conn.execute(&sql, params_from_iter(values)).unwrap();
            }
        }
    }

    pub fn memory_source(&self) -> MemorySource {
        self.tables()
            .into_iter()
            .fold(MemorySource::new(), |source, (schema, records)| {
                let mut builder = RawRelationBuilder::new(schema.raw_table);
                for record in records {
                    builder.push(parse_record(&record.to_string()).unwrap());
                }
                source.with(schema, builder.finish())
            })
    }
}

fn to_sql(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Sql::Integer(i),
            None => Sql::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Sql::Text(s.clone()),
        other => Sql::Text(other.to_string()),
    }
}

pub fn kanto() -> Vec<Species> {
    vec![
        Species {
            id: 1,
            name: "Bulbasaur",
            height_m: 0.7,
            weight_kg: 6.9,
            gen: 1,
            type_1: "Grass",
            type_2: Some("Poison"),
            stats: [45, 49, 49, 65, 65, 45],
            egg_steps: 5120,
            percent_male: Some(88.1),
        },
        Species {
            id: 4,
            name: "Charmander",
            height_m: 0.6,
            weight_kg: 8.5,
            gen: 1,
            type_1: "Fire",
            type_2: None,
            stats: [39, 52, 43, 60, 50, 65],
            egg_steps: 5120,
            percent_male: Some(88.1),
        },
        Species {
            id: 7,
            name: "Squirtle",
            height_m: 0.5,
            weight_kg: 9.0,
            gen: 1,
            type_1: "Water",
            type_2: None,
            stats: [44, 48, 65, 50, 64, 43],
            egg_steps: 5120,
            percent_male: Some(88.1),
        },
        Species {
            id: 25,
            name: "Pikachu",
            height_m: 0.4,
            weight_kg: 6.0,
            gen: 1,
            type_1: "Electric",
            type_2: None,
            stats: [35, 55, 40, 50, 50, 90],
            egg_steps: 2560,
            percent_male: Some(50.0),
        },
        Species {
            id: 81,
            name: "Magnemite",
            height_m: 0.3,
            weight_kg: 6.0,
            gen: 1,
            type_1: "Electric",
            type_2: Some("Steel"),
            stats: [25, 35, 70, 95, 55, 45],
            egg_steps: 5120,
            percent_male: None,
        },
        Species {
            id: 152,
            name: "Chikorita",
            height_m: 0.9,
            weight_kg: 6.4,
            gen: 2,
            type_1: "Grass",
            type_2: None,
            stats: [45, 49, 65, 49, 65, 45],
            egg_steps: 5120,
            percent_male: Some(88.1),
        },
    ]
}
